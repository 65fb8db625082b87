//! Snapshot of the drawing attributes at one point in a command sequence.

use crate::{
    graphics::{Color, Composite, FontSpec, Paint, Stroke, Transform},
    shape::Shape,
};
use ahash::AHashMap;
use once_cell::sync::Lazy;

/// Keys of the export hint table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HintKey {
    /// What the export should optimize for.
    Export,
    /// How text should be rendered.
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintValue {
    ExportReadability,
    ExportQuality,
    ExportSize,
    TextDefault,
    TextVector,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    hints: AHashMap<HintKey, HintValue>,
    background: Color,
    color: Color,
    /// Stored in device space; see [`GraphicsState::set_clip`].
    clip: Option<Shape>,
    composite: Composite,
    font: FontSpec,
    paint: Option<Paint>,
    stroke: Stroke,
    transform: Transform,
    xor_mode: Color,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            hints: AHashMap::new(),
            background: Color::BLACK,
            color: Color::WHITE,
            clip: None,
            composite: Composite::default(),
            font: FontSpec::default(),
            paint: None,
            stroke: Stroke::default(),
            transform: Transform::identity(),
            xor_mode: Color::BLACK,
        }
    }
}

static DEFAULT: Lazy<GraphicsState> = Lazy::new(GraphicsState::default);

impl GraphicsState {
    /// Shared default snapshot, for backends that diff against it per draw.
    pub fn default_ref() -> &'static GraphicsState {
        &DEFAULT
    }

    pub fn is_default(&self) -> bool {
        self == Self::default_ref()
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn composite(&self) -> Composite {
        self.composite
    }

    pub fn set_composite(&mut self, composite: Composite) {
        self.composite = composite;
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn set_font(&mut self, font: FontSpec) {
        self.font = font;
    }

    pub fn paint(&self) -> Option<&Paint> {
        self.paint.as_ref()
    }

    pub fn set_paint(&mut self, paint: Option<Paint>) {
        self.paint = paint;
    }

    pub fn stroke(&self) -> &Stroke {
        &self.stroke
    }

    pub fn set_stroke(&mut self, stroke: Stroke) {
        self.stroke = stroke;
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn xor_mode(&self) -> Color {
        self.xor_mode
    }

    pub fn set_xor_mode(&mut self, xor_mode: Color) {
        self.xor_mode = xor_mode;
    }

    pub fn hint(&self, key: HintKey) -> Option<HintValue> {
        self.hints.get(&key).copied()
    }

    pub fn set_hint(&mut self, key: HintKey, value: HintValue) {
        self.hints.insert(key, value);
    }

    pub fn has_hints(&self) -> bool {
        !self.hints.is_empty()
    }

    /// The clip shape in the current user space, or `None` for unclipped.
    /// Returns `None` as well when the current transform is singular and
    /// the stored device-space clip cannot be mapped back.
    pub fn clip(&self) -> Option<Shape> {
        let clip = self.clip.as_ref()?;
        let inverse = self.transform.inverse()?;
        Some(clip.transform(&inverse))
    }

    /// Stores `clip` transformed into device space, so that later
    /// transform changes do not move an already-established clip region.
    pub fn set_clip(&mut self, clip: Option<Shape>) {
        self.clip = clip.map(|shape| shape.transform(&self.transform));
    }

    pub(crate) fn clip_in_device_space(&self) -> Option<&Shape> {
        self.clip.as_ref()
    }
}

#[cfg(test)]
mod tests;
