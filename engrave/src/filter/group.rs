use crate::command::Command;
use std::collections::VecDeque;

/// Bundles every draw command with the state changes pending for it into
/// one [`Command::Group`], so backends can apply them as a single
/// state-transition unit before emitting the draw operator.
///
/// Scope markers are never absorbed: they flush pending state changes as
/// bare commands and pass through, keeping state application inside the
/// correct scope boundaries.
pub struct GroupStateChanges<I> {
    input: I,
    buffer: Vec<Command>,
    pending: VecDeque<Command>,
}

impl<I> GroupStateChanges<I>
where
    I: Iterator<Item = Command>,
{
    pub fn new(input: I) -> Self {
        Self {
            input,
            buffer: Vec::new(),
            pending: VecDeque::new(),
        }
    }
}

impl<I> Iterator for GroupStateChanges<I>
where
    I: Iterator<Item = Command>,
{
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        loop {
            if let Some(ready) = self.pending.pop_front() {
                return Some(ready);
            }
            match self.input.next() {
                Some(command) if command.is_state_change() => self.buffer.push(command),
                Some(command) if command.is_draw() => {
                    let mut group = std::mem::take(&mut self.buffer);
                    group.push(command);
                    return Some(Command::Group(group));
                }
                Some(command) => {
                    self.pending.extend(self.buffer.drain(..));
                    self.pending.push_back(command);
                }
                None => {
                    if self.buffer.is_empty() {
                        return None;
                    }
                    self.pending.extend(self.buffer.drain(..));
                }
            }
        }
    }
}
