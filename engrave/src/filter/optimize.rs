use crate::command::Command;
use std::{collections::VecDeque, mem::discriminant};

/// Dead-state-change elimination: inside the window bounded by the next
/// non-state command, only the last write of each attribute kind
/// survives. Transform commands compose rather than overwrite, and hints
/// target different keys, so both are passed through the window intact.
pub struct OptimizeCommands<I> {
    input: I,
    window: VecDeque<Command>,
    pending: VecDeque<Command>,
}

impl<I> OptimizeCommands<I>
where
    I: Iterator<Item = Command>,
{
    pub fn new(input: I) -> Self {
        Self {
            input,
            window: VecDeque::new(),
            pending: VecDeque::new(),
        }
    }
}

fn supersedes(command: &Command) -> bool {
    command.is_state_change()
        && command.relative_transform().is_none()
        && !matches!(command, Command::SetHint(..))
}

impl<I> Iterator for OptimizeCommands<I>
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
                Some(command) if supersedes(&command) => {
                    let kind = discriminant(&command);
                    self.window.retain(|buffered| discriminant(buffered) != kind);
                    self.window.push_back(command);
                }
                Some(command) if command.is_state_change() => {
                    // Composing command: keep it in window order.
                    self.window.push_back(command);
                }
                Some(command) => {
                    // Window boundary: flush buffered state first.
                    self.pending.extend(self.window.drain(..));
                    self.pending.push_back(command);
                }
                None => {
                    if self.window.is_empty() {
                        return None;
                    }
                    self.pending.extend(self.window.drain(..));
                }
            }
        }
    }
}
