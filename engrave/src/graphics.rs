//! Attribute value types captured into commands: colors, strokes, fonts,
//! paints, composites and affine transforms.
//!
//! Everything here is plain owned data. Capturing a value into a command
//! moves or clones it, so later mutation by the caller cannot reach a
//! recorded command.

use euclid::default::{Point2D, Transform2D};

pub type Point = Point2D<f64>;
pub type Transform = Transform2D<f64>;

/// Compose `tx` onto `base` so that `tx` applies first. This is the
/// composition order of the PDF `cm` operator and PostScript `concat`.
pub fn concat(base: &Transform, tx: &Transform) -> Transform {
    tx.then(base)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn alpha(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    Butt,
    Round,
    #[default]
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Pen description for outline drawing. The default matches the stock
/// platform stroke the recorded state starts from: width 1, square cap,
/// miter join with limit 10, no dash.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
    pub dash: Vec<f64>,
    pub dash_phase: f64,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::default(),
            join: LineJoin::default(),
            miter_limit: 10.0,
            dash: Vec::new(),
            dash_phase: 0.0,
        }
    }
}

impl Stroke {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub fn cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    pub fn miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = limit;
        self
    }

    pub fn dash(mut self, dash: Vec<f64>, phase: f64) -> Self {
        self.dash = dash;
        self.dash_phase = phase;
        self
    }
}

/// Font request recorded with text commands. Layout is not resolved at
/// record time; backends map the request to their own font machinery.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new("Dialog", 12.0)
    }
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// PostScript name for the requested font. Logical families map onto
    /// the base-14 fonts every PDF and PostScript consumer ships.
    pub fn ps_name(&self) -> String {
        enum Base {
            Times,
            Helvetica,
            Courier,
            Other(String),
        }

        let base = match self.family.to_ascii_lowercase().as_str() {
            "serif" | "times" | "times new roman" | "timesroman" => Base::Times,
            "monospaced" | "courier" | "courier new" => Base::Courier,
            "dialog" | "dialoginput" | "sansserif" | "helvetica" | "arial" => Base::Helvetica,
            _ => Base::Other(self.family.split_whitespace().collect()),
        };

        let oblique = |name: &str| match (self.bold, self.italic) {
            (false, false) => name.to_owned(),
            (true, false) => format!("{name}-Bold"),
            (false, true) => format!("{name}-Oblique"),
            (true, true) => format!("{name}-BoldOblique"),
        };

        match base {
            Base::Times => {
                let suffix = match (self.bold, self.italic) {
                    (false, false) => "Roman",
                    (true, false) => "Bold",
                    (false, true) => "Italic",
                    (true, true) => "BoldItalic",
                };
                format!("Times-{suffix}")
            }
            Base::Helvetica => oblique("Helvetica"),
            Base::Courier => oblique("Courier"),
            Base::Other(name) => match (self.bold, self.italic) {
                (false, false) => name,
                (true, false) => format!("{name}-Bold"),
                (false, true) => format!("{name}-Italic"),
                (true, true) => format!("{name}-BoldItalic"),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<GradientStop>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Point,
    pub radius: f64,
    pub stops: Vec<GradientStop>,
}

/// Non-solid paint. Solid colors travel as `SetColor`; no backend renders
/// gradients natively, they are rasterized by the paint fallback filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Linear(LinearGradient),
    Radial(RadialGradient),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum CompositeRule {
    #[default]
    SrcOver,
    Src,
    DstOver,
    SrcIn,
    DstIn,
    SrcOut,
    DstOut,
    Clear,
    Xor,
}

/// Compositing request. Only carried through the pipeline; backends that
/// cannot express it degrade to a comment or ignore it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Composite {
    pub rule: CompositeRule,
    pub alpha: f64,
}

impl Default for Composite {
    fn default() -> Self {
        Self {
            rule: CompositeRule::SrcOver,
            alpha: 1.0,
        }
    }
}

impl Composite {
    pub fn new(rule: CompositeRule, alpha: f64) -> Self {
        Self { rule, alpha }
    }
}

#[cfg(test)]
mod tests;
