use crate::{
    command::Command,
    graphics::{concat, Transform},
};
use log::error;

/// Rewrites absolute `SetTransform` commands into relative `Concat`
/// commands, for backends that can only post-multiply onto their current
/// transform (PDF content streams).
///
/// A per-scope stack tracks the cumulative transform: scope creation
/// pushes a copy, disposal pops, and every transform command updates the
/// top entry.
pub struct AbsoluteToRelativeTransforms<I> {
    input: I,
    transforms: Vec<Transform>,
}

impl<I> AbsoluteToRelativeTransforms<I>
where
    I: Iterator<Item = Command>,
{
    pub fn new(input: I) -> Self {
        Self {
            input,
            transforms: Vec::new(),
        }
    }

    fn current(&self) -> Transform {
        self.transforms
            .last()
            .copied()
            .unwrap_or_else(Transform::identity)
    }
}

impl<I> Iterator for AbsoluteToRelativeTransforms<I>
where
    I: Iterator<Item = Command>,
{
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        let command = self.input.next()?;

        let out = match command {
            Command::SetTransform(absolute) => {
                let relative = match self.current().inverse() {
                    Some(inverse) => absolute.then(&inverse),
                    None => {
                        error!("cumulative transform is singular; emitting absolute value");
                        absolute
                    }
                };
                Command::Concat(relative)
            }
            other => other,
        };

        match &out {
            Command::CreateScope => {
                let top = self.current();
                self.transforms.push(top);
            }
            Command::DisposeScope => {
                self.transforms.pop();
            }
            command => {
                if let Some(relative) = command.relative_transform() {
                    let combined = concat(&self.current(), &relative);
                    match self.transforms.last_mut() {
                        Some(top) => *top = combined,
                        None => self.transforms.push(combined),
                    }
                }
            }
        }

        Some(out)
    }
}
