//! The recording surface: an immediate-mode 2D drawing interface that
//! appends commands to a sequence instead of painting pixels.

use crate::{
    command::{Command, CommandSequence, ImagePlacement},
    graphics::{concat, Color, Composite, FontSpec, LineCap, Paint, Stroke, Transform},
    raster::{self, ImageData},
    shape::{Path, Rect, Shape},
    state::{GraphicsState, HintKey, HintValue},
};
use log::debug;
use std::sync::Arc;

/// Records draw calls as a [`CommandSequence`] while tracking a stack of
/// graphics-state snapshots. Setters are idempotent: setting an attribute
/// to its current value emits nothing.
pub struct Recorder {
    commands: CommandSequence,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    disposed: bool,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    pub fn new() -> Self {
        let mut recorder = Self {
            commands: CommandSequence::new(),
            state: GraphicsState::default(),
            stack: Vec::new(),
            disposed: false,
        };
        recorder.emit(Command::CreateScope);
        // Bring the recorded state in line with the conventional drawing
        // default (black pen, butt caps); the snapshot default is the
        // platform's white/square-cap state.
        recorder.set_color(Color::BLACK);
        recorder.set_stroke(Stroke::default().cap(LineCap::Butt));
        recorder
    }

    fn emit(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Marks this recorder disposed and closes the root scope. Idempotent:
    /// repeated calls, and any calls after disposal, are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.emit(Command::DisposeScope);
        self.disposed = true;
    }

    /// The sequence recorded so far. Readable while recording continues.
    pub fn commands(&self) -> &CommandSequence {
        &self.commands
    }

    pub fn into_commands(self) -> CommandSequence {
        self.commands
    }

    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    // ----- scopes -----

    /// Opens a nested scope; state changes inside it are reverted by
    /// [`Recorder::dispose_scope`].
    pub fn create_scope(&mut self) {
        if self.disposed {
            return;
        }
        self.stack.push(self.state.clone());
        self.emit(Command::CreateScope);
    }

    /// Closes the innermost scope. Panics when no scope is open: disposing
    /// more scopes than were created is a programmer error in the caller.
    pub fn dispose_scope(&mut self) {
        if self.disposed {
            return;
        }
        let restored = self
            .stack
            .pop()
            .expect("dispose_scope without matching create_scope");
        self.state = restored;
        self.emit(Command::DisposeScope);
    }

    // ----- attribute setters -----

    pub fn set_color(&mut self, color: Color) {
        if self.disposed || self.state.color() == color {
            return;
        }
        self.emit(Command::SetColor(color));
        self.state.set_color(color);
        // A solid color replaces any active paint.
        self.state.set_paint(None);
    }

    pub fn set_paint(&mut self, paint: Paint) {
        if self.disposed || self.state.paint() == Some(&paint) {
            return;
        }
        self.emit(Command::SetPaint(paint.clone()));
        self.state.set_paint(Some(paint));
    }

    pub fn set_stroke(&mut self, stroke: Stroke) {
        if self.disposed || *self.state.stroke() == stroke {
            return;
        }
        self.emit(Command::SetStroke(stroke.clone()));
        self.state.set_stroke(stroke);
    }

    pub fn set_font(&mut self, font: FontSpec) {
        if self.disposed || *self.state.font() == font {
            return;
        }
        self.emit(Command::SetFont(font.clone()));
        self.state.set_font(font);
    }

    pub fn set_background(&mut self, background: Color) {
        if self.disposed || self.state.background() == background {
            return;
        }
        self.emit(Command::SetBackground(background));
        self.state.set_background(background);
    }

    pub fn set_composite(&mut self, composite: Composite) {
        if self.disposed || self.state.composite() == composite {
            return;
        }
        self.emit(Command::SetComposite(composite));
        self.state.set_composite(composite);
    }

    pub fn set_xor_mode(&mut self, color: Color) {
        if self.disposed || self.state.xor_mode() == color {
            return;
        }
        self.emit(Command::SetXorMode(color));
        self.state.set_xor_mode(color);
    }

    pub fn set_hint(&mut self, key: HintKey, value: HintValue) {
        if self.disposed || self.state.hint(key) == Some(value) {
            return;
        }
        self.emit(Command::SetHint(key, value));
        self.state.set_hint(key, value);
    }

    /// Replaces the clip region. `None` removes clipping.
    pub fn set_clip(&mut self, clip: Option<Shape>) {
        if self.disposed {
            return;
        }
        let device = clip
            .as_ref()
            .map(|shape| shape.transform(self.state.transform()));
        if self.state.clip_in_device_space() == device.as_ref() {
            return;
        }
        self.emit(Command::SetClip(clip.clone()));
        self.state.set_clip(clip);
    }

    /// Intersects the clip with a rectangle. Only a rectangle-with-
    /// rectangle intersection is computed exactly; a non-rectangular
    /// current clip is replaced.
    pub fn clip_rect(&mut self, rect: Rect) {
        if self.disposed {
            return;
        }
        let clip = match self.state.clip() {
            None => rect,
            Some(Shape::Rect(current)) => current.intersection(&rect),
            Some(_) => {
                debug!("intersecting a non-rectangular clip is not supported; replacing it");
                rect
            }
        };
        self.set_clip(Some(Shape::Rect(clip)));
    }

    // ----- transforms -----

    pub fn set_transform(&mut self, tx: Transform) {
        if self.disposed || *self.state.transform() == tx {
            return;
        }
        self.emit(Command::SetTransform(tx));
        self.state.set_transform(tx);
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        if self.disposed || (dx == 0.0 && dy == 0.0) {
            return;
        }
        self.apply(Command::Translate { dx, dy });
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        if self.disposed || (sx == 1.0 && sy == 1.0) {
            return;
        }
        self.apply(Command::Scale { sx, sy });
    }

    pub fn rotate(&mut self, theta: f64) {
        self.rotate_about(theta, 0.0, 0.0);
    }

    pub fn rotate_about(&mut self, theta: f64, cx: f64, cy: f64) {
        if self.disposed || theta == 0.0 {
            return;
        }
        self.apply(Command::Rotate { theta, cx, cy });
    }

    pub fn shear(&mut self, shx: f64, shy: f64) {
        if self.disposed || (shx == 0.0 && shy == 0.0) {
            return;
        }
        self.apply(Command::Shear { shx, shy });
    }

    pub fn concat(&mut self, tx: Transform) {
        if self.disposed || tx == Transform::identity() {
            return;
        }
        self.apply(Command::Concat(tx));
    }

    fn apply(&mut self, command: Command) {
        let rel = command
            .relative_transform()
            .expect("apply called with a non-transform command");
        let combined = concat(self.state.transform(), &rel);
        self.emit(command);
        self.state.set_transform(combined);
    }

    // ----- draw operations -----

    pub fn draw(&mut self, shape: Shape) {
        if self.disposed {
            return;
        }
        self.emit(Command::DrawShape(shape));
    }

    pub fn fill(&mut self, shape: Shape) {
        if self.disposed {
            return;
        }
        self.emit(Command::FillShape(shape));
    }

    pub fn draw_string(&mut self, text: impl Into<String>, x: f64, y: f64) {
        if self.disposed {
            return;
        }
        let text = text.into();
        if text.trim().is_empty() {
            return;
        }
        self.emit(Command::DrawString { text, x, y });
    }

    pub fn draw_image(
        &mut self,
        image: Arc<ImageData>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) {
        if self.disposed {
            return;
        }
        self.emit(Command::DrawImage(ImagePlacement {
            image,
            x,
            y,
            width,
            height,
        }));
    }

    /// Draws an image under an arbitrary affine transform by resampling it
    /// into an axis-aligned placement first. A transform too degenerate to
    /// resample drops the image (logged), not the document.
    pub fn draw_image_transformed(&mut self, image: Arc<ImageData>, tx: &Transform) {
        if self.disposed {
            return;
        }
        if tx.m12 == 0.0 && tx.m21 == 0.0 && tx.m11 > 0.0 && tx.m22 > 0.0 {
            // Pure scale + translation: no resampling needed.
            let width = f64::from(image.width()) * tx.m11;
            let height = f64::from(image.height()) * tx.m22;
            self.draw_image(image, tx.m31, tx.m32, width, height);
            return;
        }
        match raster::transform_image(&image, tx) {
            Some((resampled, rect)) => {
                self.draw_image(Arc::new(resampled), rect.x, rect.y, rect.width, rect.height);
            }
            None => log::error!("image transform is degenerate; image dropped"),
        }
    }

    // ----- convenience wrappers -----

    pub fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.draw(Shape::line(x1, y1, x2, y2));
    }

    pub fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.draw(Shape::rect(x, y, width, height));
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.fill(Shape::rect(x, y, width, height));
    }

    pub fn draw_round_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        arc_width: f64,
        arc_height: f64,
    ) {
        self.draw(Shape::round_rect(x, y, width, height, arc_width, arc_height));
    }

    pub fn fill_round_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        arc_width: f64,
        arc_height: f64,
    ) {
        self.fill(Shape::round_rect(x, y, width, height, arc_width, arc_height));
    }

    pub fn draw_oval(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.draw(Shape::ellipse(x, y, width, height));
    }

    pub fn fill_oval(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.fill(Shape::ellipse(x, y, width, height));
    }

    pub fn draw_arc(&mut self, x: f64, y: f64, width: f64, height: f64, start: f64, extent: f64) {
        self.draw(Shape::Arc(crate::shape::Arc {
            rect: Rect::new(x, y, width, height),
            start,
            extent,
            kind: crate::shape::ArcKind::Open,
        }));
    }

    pub fn fill_arc(&mut self, x: f64, y: f64, width: f64, height: f64, start: f64, extent: f64) {
        self.fill(Shape::Arc(crate::shape::Arc {
            rect: Rect::new(x, y, width, height),
            start,
            extent,
            kind: crate::shape::ArcKind::Pie,
        }));
    }

    pub fn draw_polyline(&mut self, points: &[(f64, f64)]) {
        if let Some(path) = poly_path(points, false) {
            self.draw(Shape::Path(path));
        }
    }

    pub fn draw_polygon(&mut self, points: &[(f64, f64)]) {
        if let Some(path) = poly_path(points, true) {
            self.draw(Shape::Path(path));
        }
    }

    pub fn fill_polygon(&mut self, points: &[(f64, f64)]) {
        if let Some(path) = poly_path(points, true) {
            self.fill(Shape::Path(path));
        }
    }

    /// Fills a rectangle with the background color, restoring the current
    /// color afterwards.
    pub fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if self.disposed {
            return;
        }
        let color = self.state.color();
        let background = self.state.background();
        self.set_color(background);
        self.fill_rect(x, y, width, height);
        self.set_color(color);
    }
}

fn poly_path(points: &[(f64, f64)], closed: bool) -> Option<Path> {
    let (&(x, y), rest) = points.split_first()?;
    let mut path = Path::default().move_to(x, y);
    for &(x, y) in rest {
        path = path.line_to(x, y);
    }
    if closed {
        path = path.close();
    }
    Some(path)
}

#[cfg(test)]
mod tests;
