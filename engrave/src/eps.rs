//! Encapsulated PostScript backend: maps each command onto statement
//! strings collected in order, then writes them re-wrapped to the 255
//! character PostScript line limit.

use crate::{
    ascii85::Ascii85Writer,
    command::{Command, CommandSequence, ImagePlacement},
    filter::FillPaintedShapeAsImage,
    fmt,
    graphics::{Color, FontSpec, LineCap, LineJoin, Stroke},
    linewrap::LineWrapWriter,
    page::PageSize,
    processor::{Document, Processor, ProcessorError},
    raster::Interleaving,
    shape::{quad_to_cubic, ArcKind, Seg, Shape, Winding},
};
use flate2::{write::ZlibEncoder, Compression};
use log::error;
use std::io::{self, Write};

/// Conversion factor from millimeters to PostScript units (1/72 inch).
const UNITS_PER_MM: f64 = 72.0 / 25.4;
/// Hard PostScript limit on interpreter line length.
const MAX_LINE_WIDTH: usize = 255;
/// Width of the ASCII85 blocks carrying inline image data.
const IMAGE_DATA_WIDTH: usize = 80;

pub struct EpsProcessor;

impl Processor for EpsProcessor {
    fn process(
        &self,
        commands: &CommandSequence,
        page_size: PageSize,
    ) -> Result<Box<dyn Document>, ProcessorError> {
        let filtered = FillPaintedShapeAsImage::new(commands.iter().cloned());
        Ok(Box::new(EpsDocument::new(filtered, page_size)))
    }
}

pub struct EpsDocument {
    elements: Vec<String>,
}

impl EpsDocument {
    pub fn new(commands: impl Iterator<Item = Command>, page_size: PageSize) -> Self {
        let mut document = Self {
            elements: Vec::new(),
        };
        document.add_header(page_size);
        for command in commands {
            document.handle(&command);
        }
        document
    }

    fn add_header(&mut self, page: PageSize) {
        let x = page.x * UNITS_PER_MM;
        let y = page.y * UNITS_PER_MM;
        let width = page.width * UNITS_PER_MM;
        let height = page.height * UNITS_PER_MM;

        self.elements.extend([
            "%!PS-Adobe-3.0 EPSF-3.0".to_owned(),
            format!(
                "%%BoundingBox: {} {} {} {}",
                x.floor() as i64,
                y.floor() as i64,
                (x + width).ceil() as i64,
                (y + height).ceil() as i64
            ),
            format!(
                "%%HiResBoundingBox: {} {} {} {}",
                fmt::num(x),
                fmt::num(y),
                fmt::num(x + width),
                fmt::num(y + height)
            ),
            "%%LanguageLevel: 3".to_owned(),
            "%%Pages: 1".to_owned(),
            "%%EndComments".to_owned(),
            "%%Page: 1 1".to_owned(),
            "/M /moveto load def".to_owned(),
            "/L /lineto load def".to_owned(),
            "/C /curveto load def".to_owned(),
            "/Z /closepath load def".to_owned(),
            "/RL /rlineto load def".to_owned(),
            "/rgb /setrgbcolor load def".to_owned(),
            "/rect { /height exch def /width exch def /y exch def /x exch def \
             x y M width 0 RL 0 height RL width neg 0 RL } bind def"
                .to_owned(),
            "/ellipse { /endangle exch def /startangle exch def /ry exch def \
             /rx exch def /y exch def /x exch def /savematrix matrix currentmatrix def \
             x y translate rx ry scale 0 0 1 startangle endangle arcn \
             savematrix setmatrix } bind def"
                .to_owned(),
            "/imgdict { /datastream exch def /hasdata exch def /decodeScale exch def \
             /bits exch def /bands exch def /imgheight exch def /imgwidth exch def \
             << /ImageType 1 /Width imgwidth /Height imgheight /BitsPerComponent bits \
             /Decode [bands {0 decodeScale} repeat] \
             /ImageMatrix [imgwidth 0 0 imgheight 0 0] \
             hasdata { /DataSource datastream } if >> } bind def"
                .to_owned(),
            "/latinize { /fontName exch def /fontNameNew exch def fontName findfont \
             0 dict copy begin /Encoding ISOLatin1Encoding def fontNameNew /FontName def \
             currentdict end dup /FID undef fontNameNew exch definefont pop } bind def"
                .to_owned(),
            font_output(&FontSpec::default()),
            "gsave".to_owned(),
            "clipsave".to_owned(),
            "/DeviceRGB setcolorspace".to_owned(),
            format!("0 {} translate", fmt::num(height)),
            format!("{} {} scale", fmt::num(UNITS_PER_MM), fmt::num(-UNITS_PER_MM)),
            "/basematrix matrix currentmatrix def".to_owned(),
        ]);
    }

    fn handle(&mut self, command: &Command) {
        match command {
            Command::CreateScope => self.elements.push("gsave".to_owned()),
            Command::DisposeScope => self.elements.push("grestore".to_owned()),
            Command::SetClip(clip) => {
                self.elements.push("cliprestore".to_owned());
                if let Some(shape) = clip {
                    self.elements.push(format!("{} clip", shape_output(shape)));
                }
            }
            Command::SetColor(color) => self.elements.push(color_output(*color)),
            Command::SetStroke(stroke) => self.elements.push(stroke_output(stroke)),
            Command::SetFont(font) => self.elements.push(font_output(font)),
            Command::SetComposite(composite) => {
                // No PostScript equivalent; degrade to a comment.
                self.elements
                    .push(format!("% composite not supported: {}", composite.rule));
            }
            Command::SetPaint(_) => {
                self.elements
                    .push("% paint is rasterized at fill time".to_owned());
            }
            Command::SetBackground(_) | Command::SetXorMode(_) | Command::SetHint(..) => {}
            Command::SetTransform(tx) => {
                self.elements.push(format!(
                    "basematrix setmatrix [{}] concat",
                    fmt::join([tx.m11, tx.m12, tx.m21, tx.m22, tx.m31, tx.m32], " ")
                ));
            }
            Command::Translate { dx, dy } => {
                self.elements
                    .push(format!("{} {} translate", fmt::num(*dx), fmt::num(*dy)));
            }
            Command::Scale { sx, sy } => {
                self.elements
                    .push(format!("{} {} scale", fmt::num(*sx), fmt::num(*sy)));
            }
            Command::Rotate { theta, cx, cy } => {
                let mut statement = String::new();
                let translated = *cx != 0.0 || *cy != 0.0;
                if translated {
                    statement.push_str(&format!(
                        "{} {} translate ",
                        fmt::num(*cx),
                        fmt::num(*cy)
                    ));
                }
                statement.push_str(&format!("{} rotate", fmt::num(theta.to_degrees())));
                if translated {
                    statement.push_str(&format!(
                        " {} {} translate",
                        fmt::num(-cx),
                        fmt::num(-cy)
                    ));
                }
                self.elements.push(statement);
            }
            Command::Shear { shx, shy } => {
                self.elements.push(format!(
                    "[1 {} {} 1 0 0] concat",
                    fmt::num(*shy),
                    fmt::num(*shx)
                ));
            }
            Command::Concat(tx) => {
                self.elements.push(format!(
                    "[{}] concat",
                    fmt::join([tx.m11, tx.m12, tx.m21, tx.m22, tx.m31, tx.m32], " ")
                ));
            }
            Command::DrawShape(shape) => {
                self.elements.push(format!("{} stroke", shape_output(shape)));
            }
            Command::FillShape(shape) => {
                let fill = match shape.winding() {
                    Winding::NonZero => "fill",
                    Winding::EvenOdd => "eofill",
                };
                self.elements.push(format!("{} {fill}", shape_output(shape)));
            }
            Command::DrawString { text, x, y } => {
                self.elements.push(format!(
                    "gsave 1 -1 scale {} {} M ({}) show grestore",
                    fmt::num(*x),
                    fmt::num(-y),
                    escape_string(text)
                ));
            }
            Command::DrawImage(placement) => self.elements.push(image_output(placement)),
            // A group reaching this backend is just replayed in order.
            Command::Group(commands) => {
                for command in commands {
                    self.handle(command);
                }
            }
        }
    }
}

impl Document for EpsDocument {
    fn write(&self, out: &mut dyn Write) -> io::Result<()> {
        for element in &self.elements {
            for line in element.split('\n') {
                write_wrapped(out, line)?;
            }
        }
        out.write_all(b"%%EOF")?;
        Ok(())
    }

    fn is_compressed(&self) -> bool {
        // Inline image data is always Flate-compressed.
        true
    }
}

/// Writes one logical line in chunks of at most 255 characters, breaking
/// only at whitespace so numeric tokens are never split.
fn write_wrapped(out: &mut dyn Write, line: &str) -> io::Result<()> {
    if line.len() <= MAX_LINE_WIDTH {
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        return Ok(());
    }
    let mut current = String::with_capacity(MAX_LINE_WIDTH);
    for token in line.split(' ') {
        if token.len() > MAX_LINE_WIDTH {
            error!("EPS token exceeds the PostScript line limit and cannot be wrapped");
        }
        if !current.is_empty() && current.len() + 1 + token.len() > MAX_LINE_WIDTH {
            out.write_all(current.as_bytes())?;
            out.write_all(b"\n")?;
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(token);
    }
    if !current.is_empty() {
        out.write_all(current.as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn color_output(color: Color) -> String {
    format!(
        "{} rgb",
        fmt::join(
            [
                f64::from(color.r) / 255.0,
                f64::from(color.g) / 255.0,
                f64::from(color.b) / 255.0,
            ],
            " "
        )
    )
}

fn stroke_output(stroke: &Stroke) -> String {
    let join = match stroke.join {
        LineJoin::Miter => 0,
        LineJoin::Round => 1,
        LineJoin::Bevel => 2,
    };
    let cap = match stroke.cap {
        LineCap::Butt => 0,
        LineCap::Round => 1,
        LineCap::Square => 2,
    };
    format!(
        "{} setlinewidth {join} setlinejoin {cap} setlinecap [{}] {} setdash",
        fmt::num(stroke.width),
        fmt::join(stroke.dash.iter().copied(), " "),
        fmt::num(stroke.dash_phase)
    )
}

fn font_output(font: &FontSpec) -> String {
    let name = font.ps_name();
    // Re-encode to ISO Latin 1 so show strings map onto printable bytes.
    format!(
        "/{name}Lat /{name} latinize /{name}Lat {} selectfont",
        fmt::num(font.size)
    )
}

fn shape_output(shape: &Shape) -> String {
    let mut out = String::from("newpath ");
    match shape {
        Shape::Line(line) => {
            out.push_str(&format!(
                "{} {} M {} {} L",
                fmt::num(line.x1),
                fmt::num(line.y1),
                fmt::num(line.x2),
                fmt::num(line.y2)
            ));
        }
        Shape::Rect(rect) => {
            out.push_str(&format!(
                "{} {} {} {} rect Z",
                fmt::num(rect.x),
                fmt::num(rect.y),
                fmt::num(rect.width),
                fmt::num(rect.height)
            ));
        }
        Shape::Ellipse(ellipse) => {
            let rect = ellipse.rect;
            out.push_str(&format!(
                "{} {} {} {} 360 0 ellipse Z",
                fmt::num(rect.center_x()),
                fmt::num(rect.center_y()),
                fmt::num(rect.width / 2.0),
                fmt::num(rect.height / 2.0)
            ));
        }
        Shape::Arc(arc) => {
            let rect = arc.rect;
            // The ellipse alias sweeps with arcn, so angles are negated.
            let start = -arc.start;
            let end = -(arc.start + arc.extent);
            out.push_str(&format!(
                "{} {} {} {} {} {} ellipse",
                fmt::num(rect.center_x()),
                fmt::num(rect.center_y()),
                fmt::num(rect.width / 2.0),
                fmt::num(rect.height / 2.0),
                fmt::num(start),
                fmt::num(end)
            ));
            match arc.kind {
                ArcKind::Open => {}
                ArcKind::Chord => out.push_str(" Z"),
                ArcKind::Pie => out.push_str(&format!(
                    " {} {} L Z",
                    fmt::num(rect.center_x()),
                    fmt::num(rect.center_y())
                )),
            }
        }
        shape => {
            let path = shape.to_path();
            let mut current = crate::graphics::Point::new(0.0, 0.0);
            for (i, seg) in path.segments.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                match seg {
                    Seg::MoveTo(p) => {
                        out.push_str(&format!("{} {} M", fmt::num(p.x), fmt::num(p.y)));
                        current = *p;
                    }
                    Seg::LineTo(p) => {
                        out.push_str(&format!("{} {} L", fmt::num(p.x), fmt::num(p.y)));
                        current = *p;
                    }
                    Seg::CubicTo(c1, c2, p) => {
                        out.push_str(&format!(
                            "{} C",
                            fmt::join([c1.x, c1.y, c2.x, c2.y, p.x, p.y], " ")
                        ));
                        current = *p;
                    }
                    Seg::QuadTo(control, p) => {
                        let (c1, c2, end) = quad_to_cubic(current, *control, *p);
                        out.push_str(&format!(
                            "{} C",
                            fmt::join([c1.x, c1.y, c2.x, c2.y, end.x, end.y], " ")
                        ));
                        current = *p;
                    }
                    Seg::Close => out.push('Z'),
                }
            }
        }
    }
    out
}

fn image_output(placement: &ImagePlacement) -> String {
    let image = &placement.image;
    let width = image.width();
    let height = image.height();
    let mut out = String::new();

    out.push_str("gsave\n");
    if placement.x != 0.0 || placement.y != 0.0 {
        out.push_str(&format!(
            "{} {} translate\n",
            fmt::num(placement.x),
            fmt::num(placement.y)
        ));
    }
    if placement.width != 1.0 || placement.height != 1.0 {
        // The image dictionary matrix maps pixel space onto the unit
        // square, so the placement extent is a plain scale.
        out.push_str(&format!(
            "{} {} scale\n",
            fmt::num(placement.width),
            fmt::num(placement.height)
        ));
    }

    if image.uses_alpha() {
        // Alpha becomes a binary mask interleaved per sample.
        out.push_str(&format!(
            "<< /ImageType 3 /InterleaveType 1 \
             /MaskDict {width} {height} 1 8 1 false 0 imgdict \
             /DataDict {width} {height} 3 8 1 true \
             currentfile /ASCII85Decode filter \
             << /BitsPerComponent 8 >> /FlateDecode filter imgdict \
             >> image\n"
        ));
        let masked = image.alpha_to_mask(true);
        match encode_image_data(masked.samples(Interleaving::Sample)) {
            Ok(data) => {
                out.push_str(&data);
                out.push('\n');
            }
            Err(err) => error!("inline image data dropped: {err}"),
        }
    } else {
        out.push_str(&format!(
            "{width} {height} 3 8 1 true \
             currentfile /ASCII85Decode filter \
             << /BitsPerComponent 8 >> /FlateDecode filter imgdict image\n"
        ));
        match encode_image_data(image.samples(Interleaving::WithoutAlpha)) {
            Ok(data) => {
                out.push_str(&data);
                out.push('\n');
            }
            Err(err) => error!("inline image data dropped: {err}"),
        }
    }

    out.push_str("grestore");
    out
}

/// Flate-compresses sample bytes and ASCII85-encodes them in 80 column
/// lines, ready for `currentfile` filters to consume.
fn encode_image_data(samples: impl Iterator<Item = u8>) -> io::Result<String> {
    let mut buffer = Vec::new();
    {
        let wrap = LineWrapWriter::new(&mut buffer, IMAGE_DATA_WIDTH);
        let ascii85 = Ascii85Writer::new(wrap);
        let mut flate = ZlibEncoder::new(ascii85, Compression::default());
        for byte in samples {
            flate.write_all(&[byte])?;
        }
        let ascii85 = flate.finish()?;
        ascii85.finish()?;
    }
    Ok(String::from_utf8(buffer).expect("ASCII85 output is always ASCII"))
}

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

#[cfg(test)]
mod tests;
