//! SVG 1.1 backend: builds an element tree with deduplicated clip paths
//! in `<defs>`, then writes it as an XML document.

mod xml;

use crate::{
    command::{Command, CommandSequence, ImagePlacement},
    filter::GroupStateChanges,
    fmt,
    graphics::{concat, Color, FontSpec, LineCap, LineJoin, Transform},
    page::PageSize,
    processor::{Document, Processor, ProcessorError},
    raster::ImageData,
    shape::{Seg, Shape, Winding},
    state::{GraphicsState, HintKey, HintValue},
};
use ahash::AHasher;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::error;
use std::{
    hash::{Hash, Hasher},
    io::{self, Write},
};
use xml::Element;

const DOCTYPE: &str = "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
                       \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">";

pub struct SvgProcessor;

impl Processor for SvgProcessor {
    fn process(
        &self,
        commands: &CommandSequence,
        page_size: PageSize,
    ) -> Result<Box<dyn Document>, ProcessorError> {
        let filtered = GroupStateChanges::new(commands.iter().cloned());
        Ok(Box::new(SvgDocument::new(filtered, page_size)))
    }
}

pub struct SvgDocument {
    root: Element,
}

impl SvgDocument {
    pub fn new(commands: impl Iterator<Item = Command>, page_size: PageSize) -> Self {
        let mut builder = Builder::new(page_size);
        for command in commands {
            builder.handle(command);
        }
        Self {
            root: builder.finish(),
        }
    }
}

impl Document for SvgDocument {
    fn write(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>"
        )?;
        writeln!(out, "{DOCTYPE}")?;
        self.root.write(out, 0)
    }

    fn is_compressed(&self) -> bool {
        false
    }
}

/// Identity of a `<g>` container: interned clip key and transform.
type Signature = (Option<u64>, Transform);

struct Builder {
    root: Element,
    defs: Option<Element>,
    clip_ids: Vec<(u64, String)>,
    group: Option<Element>,
    group_signature: Signature,
    states: Vec<GraphicsState>,
}

impl Builder {
    fn new(page_size: PageSize) -> Self {
        let mut root = Element::new("svg");
        root.set("xmlns", "http://www.w3.org/2000/svg");
        root.set("xmlns:xlink", "http://www.w3.org/1999/xlink");
        root.set("version", "1.1");
        root.set("x", format!("{}px", fmt::num(page_size.x)));
        root.set("y", format!("{}px", fmt::num(page_size.y)));
        root.set("width", format!("{}px", fmt::num(page_size.width)));
        root.set("height", format!("{}px", fmt::num(page_size.height)));
        root.set(
            "viewBox",
            fmt::join(
                [page_size.x, page_size.y, page_size.width, page_size.height],
                " ",
            ),
        );
        Self {
            root,
            defs: None,
            clip_ids: Vec::new(),
            group: None,
            group_signature: (None, Transform::identity()),
            states: vec![GraphicsState::default()],
        }
    }

    fn current(&self) -> &GraphicsState {
        self.states.last().expect("state stack is never empty")
    }

    fn current_mut(&mut self) -> &mut GraphicsState {
        self.states.last_mut().expect("state stack is never empty")
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Group(mut commands) => {
                let draw = if commands.last().is_some_and(Command::is_draw) {
                    commands.pop()
                } else {
                    None
                };
                self.apply_states(&commands);
                if let Some(draw) = draw {
                    self.handle_draw(&draw);
                }
            }
            Command::CreateScope => {
                let top = self.current().clone();
                self.states.push(top);
            }
            Command::DisposeScope => {
                assert!(self.states.len() > 1, "scope underflow in command sequence");
                self.states.pop();
            }
            command if command.is_state_change() => {
                self.apply_states(std::slice::from_ref(&command));
            }
            command if command.is_draw() => self.handle_draw(&command),
            _ => {}
        }
    }

    fn apply_states(&mut self, commands: &[Command]) {
        for command in commands {
            match command {
                Command::SetBackground(color) => self.current_mut().set_background(*color),
                Command::SetColor(color) => self.current_mut().set_color(*color),
                Command::SetPaint(paint) => {
                    self.current_mut().set_paint(Some(paint.clone()));
                }
                Command::SetStroke(stroke) => self.current_mut().set_stroke(stroke.clone()),
                Command::SetFont(font) => self.current_mut().set_font(font.clone()),
                Command::SetClip(clip) => self.current_mut().set_clip(clip.clone()),
                Command::SetComposite(composite) => {
                    self.current_mut().set_composite(*composite);
                }
                Command::SetXorMode(color) => self.current_mut().set_xor_mode(*color),
                Command::SetHint(key, value) => self.current_mut().set_hint(*key, *value),
                Command::SetTransform(tx) => self.current_mut().set_transform(*tx),
                Command::CreateScope => {
                    let top = self.current().clone();
                    self.states.push(top);
                }
                Command::DisposeScope => {
                    assert!(self.states.len() > 1, "scope underflow in command sequence");
                    self.states.pop();
                }
                command => {
                    if let Some(relative) = command.relative_transform() {
                        let combined = concat(self.current().transform(), &relative);
                        self.current_mut().set_transform(combined);
                    }
                }
            }
        }
    }

    /// Makes the open container match the current clip and transform:
    /// draws land in the root when both are default, in the already-open
    /// `<g>` when it matches, and in a fresh `<g>` otherwise.
    fn ensure_container(&mut self) {
        let clip = self.current().clip();
        let transform = *self.current().transform();
        let signature = (clip.as_ref().map(content_key), transform);

        if signature == (None, Transform::identity()) {
            self.flush_group();
            return;
        }
        if self.group.is_some() && self.group_signature == signature {
            return;
        }
        self.flush_group();
        let mut group = Element::new("g");
        if let Some(shape) = &clip {
            let id = self.clip_reference(shape);
            group.set("clip-path", format!("url(#{id})"));
        }
        if transform != Transform::identity() {
            group.set("transform", transform_output(&transform));
        }
        self.group = Some(group);
        self.group_signature = signature;
    }

    fn flush_group(&mut self) {
        if let Some(group) = self.group.take() {
            if group.has_children() {
                self.root.push(group);
            }
        }
    }

    /// Interns a clip path in `<defs>`, keyed by a content hash of the
    /// shape, and returns its id.
    fn clip_reference(&mut self, shape: &Shape) -> String {
        let key = content_key(shape);
        if let Some((_, id)) = self.clip_ids.iter().find(|(known, _)| *known == key) {
            return id.clone();
        }
        let id = format!("clip{}", self.clip_ids.len());
        let mut clip_path = Element::new("clipPath");
        clip_path.set("id", id.clone());
        clip_path.push(shape_element(shape));
        self.defs
            .get_or_insert_with(|| Element::new("defs"))
            .push(clip_path);
        self.clip_ids.push((key, id.clone()));
        id
    }

    fn add_element(&mut self, element: Element) {
        match &mut self.group {
            Some(group) => group.push(element),
            None => self.root.push(element),
        }
    }

    fn handle_draw(&mut self, command: &Command) {
        self.ensure_container();
        match command {
            Command::DrawShape(shape) => {
                let mut element = shape_element(shape);
                element.set("style", self.style(false, true));
                self.add_element(element);
            }
            Command::FillShape(shape) => {
                let mut element = shape_element(shape);
                let non_zero = shape.winding() == Winding::NonZero;
                element.set("style", self.style(true, non_zero));
                self.add_element(element);
            }
            Command::DrawString { text, x, y } => {
                let mut element = Element::new("text");
                element.set("x", fmt::num(*x));
                element.set("y", fmt::num(*y));
                element.push_text(text.clone());
                let mut style = self.style(true, true);
                style.push_str(&font_style(self.current().font()));
                element.set("style", style);
                self.add_element(element);
            }
            Command::DrawImage(placement) => {
                let element = self.image_element(placement);
                self.add_element(element);
            }
            _ => {}
        }
    }

    fn image_element(&self, placement: &ImagePlacement) -> Element {
        let mut element = Element::new("image");
        element.set("x", fmt::num(placement.x));
        element.set("y", fmt::num(placement.y));
        element.set("width", fmt::num(placement.width));
        element.set("height", fmt::num(placement.height));
        element.set("preserveAspectRatio", "none");
        let lossy_allowed =
            self.current().hint(HintKey::Export) == Some(HintValue::ExportSize);
        element.set("xlink:href", image_href(&placement.image, lossy_allowed));
        element
    }

    /// Style string for the current state; only non-default attributes
    /// are emitted.
    fn style(&self, filled: bool, non_zero: bool) -> String {
        let state = self.current();
        let color = state.color();
        let color_value = color_output(color);
        let mut style = String::new();
        let mut append = |name: &str, value: &str| {
            style.push_str(name);
            style.push(':');
            style.push_str(value);
            style.push(';');
        };

        if filled {
            append("fill", &color_value);
            if !color.is_opaque() {
                append("fill-opacity", &fmt::num(color.alpha()));
            }
            if !non_zero {
                // nonzero is the SVG default fill rule.
                append("fill-rule", "evenodd");
            }
            append("stroke", "none");
        } else {
            append("fill", "none");
            append("stroke", &color_value);
            if !color.is_opaque() {
                append("stroke-opacity", &fmt::num(color.alpha()));
            }
            let stroke = state.stroke();
            if stroke.width != 1.0 {
                append("stroke-width", &fmt::num(stroke.width));
            }
            if stroke.miter_limit != 4.0 {
                append("stroke-miterlimit", &fmt::num(stroke.miter_limit));
            }
            if stroke.cap != LineCap::Butt {
                let cap = match stroke.cap {
                    LineCap::Butt => "butt",
                    LineCap::Round => "round",
                    LineCap::Square => "square",
                };
                append("stroke-linecap", cap);
            }
            if stroke.join != LineJoin::Miter {
                let join = match stroke.join {
                    LineJoin::Miter => "miter",
                    LineJoin::Round => "round",
                    LineJoin::Bevel => "bevel",
                };
                append("stroke-linejoin", join);
            }
            if !stroke.dash.is_empty() {
                append(
                    "stroke-dasharray",
                    &fmt::join(stroke.dash.iter().copied(), ","),
                );
                if stroke.dash_phase != 0.0 {
                    append("stroke-dashoffset", &fmt::num(stroke.dash_phase));
                }
            }
        }
        style
    }

    fn finish(mut self) -> Element {
        self.flush_group();
        if let Some(defs) = self.defs.take() {
            self.root.push_front(defs);
        }
        self.root
    }
}

fn content_key(shape: &Shape) -> u64 {
    let mut hasher = AHasher::default();
    format!("{shape:?}").hash(&mut hasher);
    hasher.finish()
}

fn transform_output(tx: &Transform) -> String {
    if *tx == Transform::translation(tx.m31, tx.m32) {
        format!("translate({} {})", fmt::num(tx.m31), fmt::num(tx.m32))
    } else {
        format!(
            "matrix({})",
            fmt::join([tx.m11, tx.m12, tx.m21, tx.m22, tx.m31, tx.m32], " ")
        )
    }
}

fn color_output(color: Color) -> String {
    format!("rgb({},{},{})", color.r, color.g, color.b)
}

fn font_style(font: &FontSpec) -> String {
    let default = FontSpec::default();
    let mut out = String::new();
    if font.family != default.family {
        out.push_str(&format!("font-family:\"{}\";", font.family));
    }
    if font.size != default.size {
        out.push_str(&format!("font-size:{}px;", fmt::num(font.size)));
    }
    if font.italic {
        out.push_str("font-style:italic;");
    }
    if font.bold {
        out.push_str("font-weight:bold;");
    }
    out
}

fn shape_element(shape: &Shape) -> Element {
    match shape {
        Shape::Line(line) => {
            let mut element = Element::new("line");
            element.set("x1", fmt::num(line.x1));
            element.set("y1", fmt::num(line.y1));
            element.set("x2", fmt::num(line.x2));
            element.set("y2", fmt::num(line.y2));
            element
        }
        Shape::Rect(rect) => {
            let mut element = Element::new("rect");
            element.set("x", fmt::num(rect.x));
            element.set("y", fmt::num(rect.y));
            element.set("width", fmt::num(rect.width));
            element.set("height", fmt::num(rect.height));
            element
        }
        Shape::RoundRect(round) => {
            let mut element = Element::new("rect");
            element.set("x", fmt::num(round.rect.x));
            element.set("y", fmt::num(round.rect.y));
            element.set("width", fmt::num(round.rect.width));
            element.set("height", fmt::num(round.rect.height));
            element.set("rx", fmt::num(round.arc_width / 2.0));
            element.set("ry", fmt::num(round.arc_height / 2.0));
            element
        }
        Shape::Ellipse(ellipse) => {
            let mut element = Element::new("ellipse");
            element.set("cx", fmt::num(ellipse.rect.center_x()));
            element.set("cy", fmt::num(ellipse.rect.center_y()));
            element.set("rx", fmt::num(ellipse.rect.width / 2.0));
            element.set("ry", fmt::num(ellipse.rect.height / 2.0));
            element
        }
        shape => {
            let mut element = Element::new("path");
            element.set("d", path_data(shape));
            element
        }
    }
}

fn path_data(shape: &Shape) -> String {
    let path = shape.to_path();
    let mut out = String::new();
    for (i, seg) in path.segments.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match seg {
            Seg::MoveTo(p) => {
                out.push_str(&format!("M{},{}", fmt::num(p.x), fmt::num(p.y)));
            }
            Seg::LineTo(p) => {
                out.push_str(&format!("L{},{}", fmt::num(p.x), fmt::num(p.y)));
            }
            Seg::QuadTo(c, p) => {
                out.push_str(&format!(
                    "Q{},{} {},{}",
                    fmt::num(c.x),
                    fmt::num(c.y),
                    fmt::num(p.x),
                    fmt::num(p.y)
                ));
            }
            Seg::CubicTo(c1, c2, p) => {
                out.push_str(&format!(
                    "C{},{} {},{} {},{}",
                    fmt::num(c1.x),
                    fmt::num(c1.y),
                    fmt::num(c2.x),
                    fmt::num(c2.y),
                    fmt::num(p.x),
                    fmt::num(p.y)
                ));
            }
            Seg::Close => out.push('Z'),
        }
    }
    out
}

/// PNG data URI; a JPEG re-encode is substituted when the caller allows
/// lossy output, no pixel is transparent, and it is strictly smaller.
fn image_href(image: &ImageData, lossy_allowed: bool) -> String {
    let png = match image.encode_png() {
        Ok(data) => data,
        Err(err) => {
            error!("image omitted from SVG output: {err}");
            return String::new();
        }
    };
    if lossy_allowed && !image.uses_alpha() {
        match image.encode_jpeg() {
            Ok(jpeg) if jpeg.len() < png.len() => {
                return format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg));
            }
            Ok(_) => {}
            Err(err) => error!("lossy re-encode failed, keeping PNG: {err}"),
        }
    }
    format!("data:image/png;base64,{}", STANDARD.encode(&png))
}

#[cfg(test)]
mod tests;
