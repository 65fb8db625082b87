//! The intermediate representation: immutable draw-call records and the
//! replayable sequence they are collected into.

use crate::{
    graphics::{concat, Color, Composite, FontSpec, Paint, Stroke, Transform},
    raster::ImageData,
    shape::Shape,
    state::{HintKey, HintValue},
};
use euclid::Angle;
use std::sync::Arc;

/// Axis-aligned placement of a raster in user space.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub image: Arc<ImageData>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One recorded operation. Every variant carries exactly one payload
/// value; two commands of the same kind and payload compare equal.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateScope,
    DisposeScope,
    SetBackground(Color),
    SetColor(Color),
    SetPaint(Paint),
    SetStroke(Stroke),
    SetFont(FontSpec),
    SetClip(Option<Shape>),
    SetComposite(Composite),
    SetXorMode(Color),
    SetHint(HintKey, HintValue),
    /// Replaces the transform outright. Backends that can only
    /// post-multiply must never see this; the relative-transform filter
    /// rewrites it into [`Command::Concat`].
    SetTransform(Transform),
    Translate {
        dx: f64,
        dy: f64,
    },
    Scale {
        sx: f64,
        sy: f64,
    },
    Rotate {
        theta: f64,
        cx: f64,
        cy: f64,
    },
    Shear {
        shx: f64,
        shy: f64,
    },
    Concat(Transform),
    DrawShape(Shape),
    FillShape(Shape),
    DrawString {
        text: String,
        x: f64,
        y: f64,
    },
    DrawImage(ImagePlacement),
    /// State changes bundled with the one draw command they apply to,
    /// produced only by the grouping filter.
    Group(Vec<Command>),
}

impl Command {
    /// True for commands that mutate graphics state (including transform
    /// changes), false for scope markers, draws and groups.
    pub fn is_state_change(&self) -> bool {
        use Command::*;
        matches!(
            self,
            SetBackground(_)
                | SetColor(_)
                | SetPaint(_)
                | SetStroke(_)
                | SetFont(_)
                | SetClip(_)
                | SetComposite(_)
                | SetXorMode(_)
                | SetHint(..)
                | SetTransform(_)
                | Translate { .. }
                | Scale { .. }
                | Rotate { .. }
                | Shear { .. }
                | Concat(_)
        )
    }

    pub fn is_draw(&self) -> bool {
        use Command::*;
        matches!(
            self,
            DrawShape(_) | FillShape(_) | DrawString { .. } | DrawImage(_)
        )
    }

    /// The matrix of a transform-composing command; `None` for everything
    /// else, including the absolute [`Command::SetTransform`].
    pub fn relative_transform(&self) -> Option<Transform> {
        match *self {
            Command::Translate { dx, dy } => Some(Transform::translation(dx, dy)),
            Command::Scale { sx, sy } => Some(Transform::scale(sx, sy)),
            Command::Rotate { theta, cx, cy } => {
                let rotation = Transform::rotation(Angle::radians(theta));
                if cx == 0.0 && cy == 0.0 {
                    Some(rotation)
                } else {
                    Some(
                        Transform::translation(-cx, -cy)
                            .then(&rotation)
                            .then(&Transform::translation(cx, cy)),
                    )
                }
            }
            Command::Shear { shx, shy } => {
                Some(Transform::new(1.0, shy, shx, 1.0, 0.0, 0.0))
            }
            Command::Concat(tx) => Some(tx),
            _ => None,
        }
    }

    /// Applies a transform-affecting command onto `current`, returning the
    /// new cumulative transform.
    pub fn apply_transform(&self, current: &Transform) -> Option<Transform> {
        if let Command::SetTransform(tx) = self {
            return Some(*tx);
        }
        self.relative_transform()
            .map(|rel| concat(current, &rel))
    }
}

/// Ordered, replayable list of commands: append-only while recording,
/// read-only once handed to filters and backends. Iterating borrows, so a
/// sequence can be replayed any number of times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandSequence {
    commands: Vec<Command>,
}

impl CommandSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn as_slice(&self) -> &[Command] {
        &self.commands
    }
}

impl From<Vec<Command>> for CommandSequence {
    fn from(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}

impl IntoIterator for CommandSequence {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

impl<'a> IntoIterator for &'a CommandSequence {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests;
