//! PDF 1.4 backend: consumes a filtered command sequence and builds a
//! flat object list (catalog, page tree, page, resources, content stream,
//! image XObjects) serialized with a classic cross-reference table.

mod object;
mod resources;

pub(crate) use object::{ObjId, PdfDict, PdfObject, PdfValue};

use crate::{
    command::{Command, ImagePlacement},
    filter::{AbsoluteToRelativeTransforms, FillPaintedShapeAsImage, GroupStateChanges},
    fmt::{self, CountingWriter},
    graphics::{concat, Color, LineCap, LineJoin, Stroke},
    page::PageSize,
    processor::{Document, Processor, ProcessorError},
    raster::{ImageData, Interleaving},
    shape::{quad_to_cubic, Seg, Shape, Winding},
    state::GraphicsState,
};
use flate2::{write::ZlibEncoder, Compression};
use resources::Resources;
use std::{
    io::{self, Write},
    sync::Arc,
};

/// Conversion factor from millimeters to PDF units (1/72 inch).
const UNITS_PER_MM: f64 = 72.0 / 25.4;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// An absolute transform reached the backend. PDF content streams can
    /// only concatenate onto the CTM, so this means the pipeline was
    /// assembled without the relative-transform filter.
    #[error(
        "absolute transform cannot be applied inside a PDF content stream; \
         run the relative-transform filter first"
    )]
    AbsoluteTransform,
}

pub struct PdfProcessor {
    compressed: bool,
}

impl PdfProcessor {
    pub fn new(compressed: bool) -> Self {
        Self { compressed }
    }
}

impl Processor for PdfProcessor {
    fn process(
        &self,
        commands: &crate::command::CommandSequence,
        page_size: PageSize,
    ) -> Result<Box<dyn Document>, ProcessorError> {
        let filtered = GroupStateChanges::new(FillPaintedShapeAsImage::new(
            AbsoluteToRelativeTransforms::new(commands.iter().cloned()),
        ));
        let document = PdfDocument::new(filtered, page_size, self.compressed)?;
        Ok(Box::new(document))
    }
}

pub struct PdfDocument {
    compressed: bool,
    objects: Vec<PdfObject>,
    root: ObjId,
}

impl PdfDocument {
    pub fn new(
        commands: impl Iterator<Item = Command>,
        page_size: PageSize,
        compressed: bool,
    ) -> Result<Self, PdfError> {
        let mut builder = Builder::new(page_size, compressed);
        for command in commands {
            builder.handle(command)?;
        }
        Ok(builder.finish())
    }
}

impl Document for PdfDocument {
    fn write(&self, out: &mut dyn Write) -> io::Result<()> {
        let mut out = CountingWriter::new(out);
        out.write_all(b"%PDF-1.4\n")?;

        let mut offsets = Vec::with_capacity(self.objects.len());
        for (index, object) in self.objects.iter().enumerate() {
            offsets.push(out.position());
            writeln!(out, "{} 0 obj", index + 1)?;
            object.write(&mut out)?;
            out.write_all(b"endobj\n")?;
        }

        let xref_position = out.position();
        writeln!(out, "xref")?;
        writeln!(out, "0 {}", self.objects.len() + 1)?;
        writeln!(out, "0000000000 65535 f ")?;
        for offset in offsets {
            writeln!(out, "{offset:010} 00000 n ")?;
        }

        writeln!(out, "trailer")?;
        writeln!(out, "<<")?;
        writeln!(out, "/Size {}", self.objects.len() + 1)?;
        writeln!(out, "/Root {} 0 R", self.root.number())?;
        writeln!(out, ">>")?;
        writeln!(out, "startxref")?;
        writeln!(out, "{xref_position}")?;
        out.write_all(b"%%EOF\n")?;
        Ok(())
    }

    fn is_compressed(&self) -> bool {
        self.compressed
    }
}

struct Builder {
    page_size: PageSize,
    compressed: bool,
    objects: Vec<PdfObject>,
    catalog: ObjId,
    contents_slot: ObjId,
    resources_slot: ObjId,
    resources: Resources,
    content: String,
    states: Vec<GraphicsState>,
    bracket_open: bool,
}

impl Builder {
    fn new(page_size: PageSize, compressed: bool) -> Self {
        let mut objects = Vec::new();
        let mut add = |object: PdfObject| {
            objects.push(object);
            ObjId(objects.len())
        };

        let mut catalog_dict = PdfDict::new();
        catalog_dict.set("Type", PdfValue::name("Catalog"));
        catalog_dict.set("Pages", PdfValue::Ref(ObjId(2)));
        let catalog = add(PdfObject::Dict(catalog_dict));

        let mut pages_dict = PdfDict::new();
        pages_dict.set("Type", PdfValue::name("Pages"));
        pages_dict.set("Kids", PdfValue::Array(vec![PdfValue::Ref(ObjId(3))]));
        pages_dict.set("Count", PdfValue::Int(1));
        add(PdfObject::Dict(pages_dict));

        let mut page_dict = PdfDict::new();
        page_dict.set("Type", PdfValue::name("Page"));
        page_dict.set("Parent", PdfValue::Ref(ObjId(2)));
        page_dict.set(
            "MediaBox",
            PdfValue::Array(vec![
                PdfValue::Real(0.0),
                PdfValue::Real(0.0),
                PdfValue::Real(page_size.width * UNITS_PER_MM),
                PdfValue::Real(page_size.height * UNITS_PER_MM),
            ]),
        );
        page_dict.set("Contents", PdfValue::Ref(ObjId(4)));
        page_dict.set("Resources", PdfValue::Ref(ObjId(5)));
        add(PdfObject::Dict(page_dict));

        // Placeholder slots, filled in finish().
        let contents_slot = add(PdfObject::Dict(PdfDict::new()));
        let resources_slot = add(PdfObject::Dict(PdfDict::new()));

        let mut builder = Self {
            page_size,
            compressed,
            objects,
            catalog,
            contents_slot,
            resources_slot,
            resources: Resources::new(),
            content: String::new(),
            states: vec![GraphicsState::default()],
            bracket_open: false,
        };
        builder.write_preamble();
        builder
    }

    /// Opens the base bracket: default color, then the matrix mapping
    /// millimeter coordinates (y down) onto PDF points (y up).
    fn write_preamble(&mut self) {
        let scale = UNITS_PER_MM;
        let tx = -self.page_size.x * UNITS_PER_MM;
        let ty = (self.page_size.y + self.page_size.height) * UNITS_PER_MM;

        self.content.push_str("q\n");
        let color_ops = color_output(self.current().color());
        self.content.push_str(&color_ops);
        self.content.push('\n');
        self.content.push_str(&format!(
            "{} 0 0 {} {} {} cm\n",
            fmt::num(scale),
            fmt::num(-scale),
            fmt::num(tx),
            fmt::num(ty)
        ));

        let font = self.current().font().clone();
        let font_id = self.resources.font_id(&font);
        self.content
            .push_str(&format!("/{font_id} {} Tf\n", fmt::num(font.size)));
    }

    fn current(&self) -> &GraphicsState {
        self.states.last().expect("state stack is never empty")
    }

    fn current_mut(&mut self) -> &mut GraphicsState {
        self.states.last_mut().expect("state stack is never empty")
    }

    fn handle(&mut self, command: Command) -> Result<(), PdfError> {
        match command {
            Command::Group(mut commands) => {
                let draw = if commands.last().is_some_and(Command::is_draw) {
                    commands.pop()
                } else {
                    None
                };
                self.apply_states(&commands)?;
                if self.bracket_open {
                    self.content.push_str("Q\n");
                }
                self.content.push_str("q\n");
                self.bracket_open = true;
                self.write_state_diff();
                if let Some(draw) = draw {
                    self.emit_draw(&draw);
                }
                Ok(())
            }
            Command::CreateScope => {
                let top = self.current().clone();
                self.states.push(top);
                Ok(())
            }
            Command::DisposeScope => {
                assert!(self.states.len() > 1, "scope underflow in command sequence");
                self.states.pop();
                Ok(())
            }
            command if command.is_state_change() => {
                self.apply_states(std::slice::from_ref(&command))
            }
            command if command.is_draw() => {
                self.emit_draw(&command);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn apply_states(&mut self, commands: &[Command]) -> Result<(), PdfError> {
        for command in commands {
            match command {
                Command::SetTransform(_) => return Err(PdfError::AbsoluteTransform),
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
        Ok(())
    }

    /// Emits operators for every attribute of the current state that
    /// differs from the default, inside the bracket just opened.
    fn write_state_diff(&mut self) {
        let state = self.current().clone();
        let default = GraphicsState::default_ref();

        if state.color() != default.color() {
            if state.color().a != default.color().a {
                let id = self.resources.transparency_id(state.color().alpha());
                self.content.push_str(&format!("/{id} gs\n"));
            }
            self.content.push_str(&color_output(state.color()));
            self.content.push('\n');
        }
        if state.transform() != default.transform() {
            let m = state.transform();
            self.content.push_str(&format!(
                "{} cm\n",
                fmt::join([m.m11, m.m12, m.m21, m.m22, m.m31, m.m32], " ")
            ));
        }
        if state.stroke() != default.stroke() {
            self.content
                .push_str(&stroke_output(state.stroke(), default.stroke()));
        }
        if let Some(clip) = state.clip() {
            self.content.push_str(&path_output(&clip));
            self.content.push_str(" W n\n");
        }
        if state.font() != default.font() {
            let font = state.font().clone();
            let id = self.resources.font_id(&font);
            self.content
                .push_str(&format!("/{id} {} Tf\n", fmt::num(font.size)));
        }
    }

    fn emit_draw(&mut self, command: &Command) {
        match command {
            Command::DrawShape(shape) => {
                self.content.push_str(&path_output(shape));
                self.content.push_str(" S\n");
            }
            Command::FillShape(shape) => {
                self.content.push_str(&path_output(shape));
                self.content.push_str(match shape.winding() {
                    Winding::NonZero => " f\n",
                    Winding::EvenOdd => " f*\n",
                });
            }
            Command::DrawString { text, x, y } => {
                // Undo the y-flip locally so text is not mirrored.
                self.content.push_str(&format!(
                    "q 1 0 0 -1 {} {} cm BT ({}) Tj ET Q\n",
                    fmt::num(*x),
                    fmt::num(*y),
                    escape_string(text)
                ));
            }
            Command::DrawImage(placement) => {
                let id = self.image_resource(placement);
                self.content.push_str(&format!(
                    "q {} 0 0 {} {} {} cm 1 0 0 -1 0 1 cm /{id} Do Q\n",
                    fmt::num(placement.width),
                    fmt::num(placement.height),
                    fmt::num(placement.x),
                    fmt::num(placement.y)
                ));
            }
            _ => {}
        }
    }

    /// Interns the placement's raster, building the XObject on first use.
    fn image_resource(&mut self, placement: &ImagePlacement) -> String {
        let key = Arc::as_ptr(&placement.image) as usize;
        if let Some(id) = self.resources.image_id(key) {
            return id;
        }
        let object = self.add_image(&placement.image);
        self.resources.register_image(key, object)
    }

    fn add_image(&mut self, image: &ImageData) -> ObjId {
        let object = self.add_image_channel(image, Interleaving::WithoutAlpha, "DeviceRGB");
        if image.uses_alpha() {
            let mask = self.add_image_channel(image, Interleaving::AlphaOnly, "DeviceGray");
            if let PdfObject::Stream { dict, .. } = &mut self.objects[object.0 - 1] {
                dict.set("SMask", PdfValue::Ref(mask));
            }
        }
        object
    }

    fn add_image_channel(
        &mut self,
        image: &ImageData,
        interleaving: Interleaving,
        color_space: &str,
    ) -> ObjId {
        let samples: Vec<u8> = image.samples(interleaving).collect();
        let data = if self.compressed {
            deflate(&samples)
        } else {
            samples
        };

        let mut dict = PdfDict::new();
        dict.set("Type", PdfValue::name("XObject"));
        dict.set("Subtype", PdfValue::name("Image"));
        dict.set("Width", PdfValue::Int(i64::from(image.width())));
        dict.set("Height", PdfValue::Int(i64::from(image.height())));
        dict.set("ColorSpace", PdfValue::name(color_space));
        dict.set("BitsPerComponent", PdfValue::Int(8));

        self.objects.push(PdfObject::Stream {
            dict,
            data,
            flate: self.compressed,
        });
        ObjId(self.objects.len())
    }

    fn finish(mut self) -> PdfDocument {
        self.content.push_str("Q\n");
        if self.bracket_open {
            self.content.push_str("Q\n");
        }

        let data = if self.compressed {
            deflate(self.content.as_bytes())
        } else {
            self.content.into_bytes()
        };
        self.objects[self.contents_slot.0 - 1] = PdfObject::Stream {
            dict: PdfDict::new(),
            data,
            flate: self.compressed,
        };
        self.objects[self.resources_slot.0 - 1] = PdfObject::Dict(self.resources.to_dict());

        PdfDocument {
            compressed: self.compressed,
            objects: self.objects,
            root: self.catalog,
        }
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("writing to a Vec cannot fail");
    encoder.finish().expect("writing to a Vec cannot fail")
}

/// Fill and stroke color operators on one line.
fn color_output(color: Color) -> String {
    let rgb = fmt::join(
        [
            f64::from(color.r) / 255.0,
            f64::from(color.g) / 255.0,
            f64::from(color.b) / 255.0,
        ],
        " ",
    );
    format!("{rgb} rg {rgb} RG")
}

fn stroke_output(stroke: &Stroke, default: &Stroke) -> String {
    let mut out = String::new();
    if stroke.width != default.width {
        out.push_str(&format!("{} w\n", fmt::num(stroke.width)));
    }
    if stroke.join == LineJoin::Miter && stroke.miter_limit != default.miter_limit {
        out.push_str(&format!("{} M\n", fmt::num(stroke.miter_limit)));
    }
    if stroke.join != default.join {
        let join = match stroke.join {
            LineJoin::Miter => 0,
            LineJoin::Round => 1,
            LineJoin::Bevel => 2,
        };
        out.push_str(&format!("{join} j\n"));
    }
    if stroke.cap != default.cap {
        let cap = match stroke.cap {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Square => 2,
        };
        out.push_str(&format!("{cap} J\n"));
    }
    if stroke.dash != default.dash {
        if stroke.dash.is_empty() {
            out.push_str("[] 0 d\n");
        } else {
            out.push_str(&format!(
                "[{}] {} d\n",
                fmt::join(stroke.dash.iter().copied(), " "),
                fmt::num(stroke.dash_phase)
            ));
        }
    }
    out
}

/// Path construction operators for a shape, quadratics raised to cubics.
fn path_output(shape: &Shape) -> String {
    let path = shape.to_path();
    let mut out = String::new();
    let mut current = crate::graphics::Point::new(0.0, 0.0);
    for (i, seg) in path.segments.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match seg {
            Seg::MoveTo(p) => {
                out.push_str(&format!("{} {} m", fmt::num(p.x), fmt::num(p.y)));
                current = *p;
            }
            Seg::LineTo(p) => {
                out.push_str(&format!("{} {} l", fmt::num(p.x), fmt::num(p.y)));
                current = *p;
            }
            Seg::CubicTo(c1, c2, p) => {
                out.push_str(&format!(
                    "{} c",
                    fmt::join([c1.x, c1.y, c2.x, c2.y, p.x, p.y], " ")
                ));
                current = *p;
            }
            Seg::QuadTo(control, p) => {
                let (c1, c2, end) = quad_to_cubic(current, *control, *p);
                out.push_str(&format!(
                    "{} c",
                    fmt::join([c1.x, c1.y, c2.x, c2.y, end.x, end.y], " ")
                ));
                current = *p;
            }
            Seg::Close => out.push('h'),
        }
    }
    out
}

/// Escapes a string for a PDF literal string: backslash, parentheses and
/// control characters; embedded line breaks are dropped.
fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\r' | '\n' => {}
            c => out.push(c),
        }
    }
    out
}
