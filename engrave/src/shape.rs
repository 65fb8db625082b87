//! Shape geometry captured into draw commands.
//!
//! A closed sum type instead of an open shape interface: backends match on
//! the variant to emit specialized output (SVG `<line>`, EPS `rect`) and
//! fall back to the generic path form everywhere else.

use crate::graphics::{Point, Transform};

/// Control-point factor of a quarter-circle cubic approximation.
const KAPPA: f64 = 0.552_284_749_830_793_4;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two corner points, normalized to non-negative
    /// extents.
    pub fn from_points(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.max_x().max(other.max_x()) - x,
            height: self.max_y().max(other.max_y()) - y,
        }
    }

    /// Intersection, or an empty rectangle at the origin when disjoint.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.max_x().min(other.max_x());
        let y2 = self.max_y().min(other.max_y());
        if x2 < x1 || y2 < y1 {
            Rect::default()
        } else {
            Rect::new(x1, y1, x2 - x1, y2 - y1)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Line {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundRect {
    pub rect: Rect,
    pub arc_width: f64,
    pub arc_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub rect: Rect,
}

impl Ellipse {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcKind {
    Open,
    Chord,
    Pie,
}

/// Elliptical arc inside a frame rectangle. Angles are in degrees,
/// measured counterclockwise on screen (the y-down convention: the point
/// at angle t is `(cx + rx cos t, cy - ry sin t)`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub rect: Rect,
    pub start: f64,
    pub extent: f64,
    pub kind: ArcKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Winding {
    #[default]
    NonZero,
    EvenOdd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Seg {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub segments: Vec<Seg>,
    pub winding: Winding,
}

impl Path {
    pub fn new(winding: Winding) -> Self {
        Self {
            segments: Vec::new(),
            winding,
        }
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        self.segments.push(Seg::MoveTo(Point::new(x, y)));
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        self.segments.push(Seg::LineTo(Point::new(x, y)));
        self
    }

    pub fn quad_to(mut self, cx: f64, cy: f64, x: f64, y: f64) -> Self {
        self.segments
            .push(Seg::QuadTo(Point::new(cx, cy), Point::new(x, y)));
        self
    }

    pub fn cubic_to(mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) -> Self {
        self.segments.push(Seg::CubicTo(
            Point::new(c1x, c1y),
            Point::new(c2x, c2y),
            Point::new(x, y),
        ));
        self
    }

    pub fn close(mut self) -> Self {
        self.segments.push(Seg::Close);
        self
    }

    pub fn bounds(&self) -> Rect {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut extend = |p: &Point| {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        };
        for seg in &self.segments {
            match seg {
                Seg::MoveTo(p) | Seg::LineTo(p) => extend(p),
                Seg::QuadTo(c, p) => {
                    extend(c);
                    extend(p);
                }
                Seg::CubicTo(c1, c2, p) => {
                    extend(c1);
                    extend(c2);
                    extend(p);
                }
                Seg::Close => {}
            }
        }
        if min.x > max.x || min.y > max.y {
            return Rect::default();
        }
        Rect::from_points(min, max)
    }

    pub fn transform(&self, tx: &Transform) -> Path {
        let segments = self
            .segments
            .iter()
            .map(|seg| match seg {
                Seg::MoveTo(p) => Seg::MoveTo(tx.transform_point(*p)),
                Seg::LineTo(p) => Seg::LineTo(tx.transform_point(*p)),
                Seg::QuadTo(c, p) => {
                    Seg::QuadTo(tx.transform_point(*c), tx.transform_point(*p))
                }
                Seg::CubicTo(c1, c2, p) => Seg::CubicTo(
                    tx.transform_point(*c1),
                    tx.transform_point(*c2),
                    tx.transform_point(*p),
                ),
                Seg::Close => Seg::Close,
            })
            .collect();
        Path {
            segments,
            winding: self.winding,
        }
    }
}

/// Raise a quadratic segment to the cubic the PDF and PostScript operator
/// sets require. `prev` is the current point before the segment.
pub fn quad_to_cubic(prev: Point, control: Point, end: Point) -> (Point, Point, Point) {
    let c1 = Point::new(
        prev.x + 2.0 / 3.0 * (control.x - prev.x),
        prev.y + 2.0 / 3.0 * (control.y - prev.y),
    );
    let c2 = Point::new(
        end.x + 2.0 / 3.0 * (control.x - end.x),
        end.y + 2.0 / 3.0 * (control.y - end.y),
    );
    (c1, c2, end)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line(Line),
    Rect(Rect),
    RoundRect(RoundRect),
    Ellipse(Ellipse),
    Arc(Arc),
    Path(Path),
}

impl Shape {
    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Shape::Line(Line::new(x1, y1, x2, y2))
    }

    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Shape::Rect(Rect::new(x, y, width, height))
    }

    pub fn round_rect(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        arc_width: f64,
        arc_height: f64,
    ) -> Self {
        Shape::RoundRect(RoundRect {
            rect: Rect::new(x, y, width, height),
            arc_width,
            arc_height,
        })
    }

    pub fn ellipse(x: f64, y: f64, width: f64, height: f64) -> Self {
        Shape::Ellipse(Ellipse::new(x, y, width, height))
    }

    pub fn winding(&self) -> Winding {
        match self {
            Shape::Path(path) => path.winding,
            _ => Winding::NonZero,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Line(l) => {
                Rect::from_points(Point::new(l.x1, l.y1), Point::new(l.x2, l.y2))
            }
            Shape::Rect(r) => *r,
            Shape::RoundRect(r) => r.rect,
            Shape::Ellipse(e) => e.rect,
            Shape::Arc(a) => a.rect,
            Shape::Path(p) => p.bounds(),
        }
    }

    /// Generic path form; curved shapes are converted to cubic segments.
    pub fn to_path(&self) -> Path {
        match self {
            Shape::Line(l) => Path::default().move_to(l.x1, l.y1).line_to(l.x2, l.y2),
            Shape::Rect(r) => Path::default()
                .move_to(r.x, r.y)
                .line_to(r.max_x(), r.y)
                .line_to(r.max_x(), r.max_y())
                .line_to(r.x, r.max_y())
                .close(),
            Shape::RoundRect(r) => round_rect_path(r),
            Shape::Ellipse(e) => {
                let mut path = Path::default().move_to(e.rect.max_x(), e.rect.center_y());
                append_arc_segments(&mut path, &e.rect, 0.0, 360.0);
                path.close()
            }
            Shape::Arc(a) => arc_path(a),
            Shape::Path(p) => p.clone(),
        }
    }

    /// Transformed copy. Rectangles stay rectangles under rectilinear
    /// transforms; everything else goes through the path form.
    pub fn transform(&self, tx: &Transform) -> Shape {
        if *tx == Transform::identity() {
            return self.clone();
        }
        let rectilinear = tx.m12 == 0.0 && tx.m21 == 0.0;
        match self {
            Shape::Line(l) => {
                let a = tx.transform_point(Point::new(l.x1, l.y1));
                let b = tx.transform_point(Point::new(l.x2, l.y2));
                Shape::Line(Line::new(a.x, a.y, b.x, b.y))
            }
            Shape::Rect(r) if rectilinear => {
                let a = tx.transform_point(Point::new(r.x, r.y));
                let b = tx.transform_point(Point::new(r.max_x(), r.max_y()));
                Shape::Rect(Rect::from_points(a, b))
            }
            _ => Shape::Path(self.to_path().transform(tx)),
        }
    }
}

fn round_rect_path(r: &RoundRect) -> Path {
    let rect = r.rect;
    let aw = (r.arc_width / 2.0).min(rect.width / 2.0).max(0.0);
    let ah = (r.arc_height / 2.0).min(rect.height / 2.0).max(0.0);
    if aw == 0.0 || ah == 0.0 {
        return Shape::Rect(rect).to_path();
    }
    let (x, y) = (rect.x, rect.y);
    let (mx, my) = (rect.max_x(), rect.max_y());
    let k = KAPPA;
    Path::default()
        .move_to(x + aw, y)
        .line_to(mx - aw, y)
        .cubic_to(mx - aw + k * aw, y, mx, y + ah - k * ah, mx, y + ah)
        .line_to(mx, my - ah)
        .cubic_to(mx, my - ah + k * ah, mx - aw + k * aw, my, mx - aw, my)
        .line_to(x + aw, my)
        .cubic_to(x + aw - k * aw, my, x, my - ah + k * ah, x, my - ah)
        .line_to(x, y + ah)
        .cubic_to(x, y + ah - k * ah, x + aw - k * aw, y, x + aw, y)
        .close()
}

fn arc_path(a: &Arc) -> Path {
    let start_point = arc_point(&a.rect, a.start.to_radians());
    let mut path = Path::default().move_to(start_point.x, start_point.y);
    append_arc_segments(&mut path, &a.rect, a.start, a.extent);
    match a.kind {
        ArcKind::Open => path,
        ArcKind::Chord => path.close(),
        ArcKind::Pie => path
            .line_to(a.rect.center_x(), a.rect.center_y())
            .close(),
    }
}

fn arc_point(rect: &Rect, theta: f64) -> Point {
    Point::new(
        rect.center_x() + rect.width / 2.0 * theta.cos(),
        rect.center_y() - rect.height / 2.0 * theta.sin(),
    )
}

/// Appends cubic segments approximating an elliptical arc; the sweep is
/// split so no segment spans more than a quarter turn. The current point
/// must already be at the arc's start.
fn append_arc_segments(path: &mut Path, rect: &Rect, start_deg: f64, extent_deg: f64) {
    if extent_deg == 0.0 {
        return;
    }
    let rx = rect.width / 2.0;
    let ry = rect.height / 2.0;
    let segment_count = (extent_deg.abs() / 90.0).ceil().max(1.0) as usize;
    let step = extent_deg.to_radians() / segment_count as f64;
    let mut angle = start_deg.to_radians();
    for _ in 0..segment_count {
        let next = angle + step;
        let k = 4.0 / 3.0 * (step / 4.0).tan();
        let p0 = arc_point(rect, angle);
        let p3 = arc_point(rect, next);
        // Tangent of (rx cos t, -ry sin t) is (-rx sin t, -ry cos t).
        let c1 = Point::new(
            p0.x - k * rx * angle.sin(),
            p0.y - k * ry * angle.cos(),
        );
        let c2 = Point::new(
            p3.x + k * rx * next.sin(),
            p3.y + k * ry * next.cos(),
        );
        path.segments.push(Seg::CubicTo(c1, c2, p3));
        angle = next;
    }
}
