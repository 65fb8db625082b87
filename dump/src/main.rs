use anyhow::Result;
use clap::{arg, value_parser, Command};
use engrave::{
    graphics::{Color, FontSpec, GradientStop, LinearGradient, Paint, Point, Stroke},
    page::PageSize,
    processor::processor,
    raster::ImageData,
    record::Recorder,
    shape::Shape,
    state::{HintKey, HintValue},
};
use std::{fs::File, io::BufWriter, path::PathBuf, sync::Arc};

fn cli() -> Command {
    Command::new("engrave-dump")
        .about("Record a demo drawing and encode it as pdf, eps or svg")
        .arg(arg!(<format> "output format: pdf, eps or svg"))
        .arg(
            arg!(-o --output <file> "output file, defaults to demo.<format>")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--width [mm] "page width in millimeters, default 210")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            arg!(--height [mm] "page height in millimeters, default 297")
                .value_parser(value_parser!(f64)),
        )
}

/// A scene touching every recorder feature: plain shapes, scoped
/// transforms, clipping, gradient fills, text and raster images.
fn demo_scene() -> Recorder {
    let mut g = Recorder::new();

    g.set_color(Color::rgb(40, 40, 40));
    g.draw_rect(10.0, 10.0, 190.0, 277.0);

    g.create_scope();
    g.translate(20.0, 20.0);
    g.set_stroke(Stroke::new(2.0));
    g.set_color(Color::rgb(180, 40, 40));
    g.draw_oval(0.0, 0.0, 60.0, 40.0);
    g.set_color(Color::rgba(40, 40, 180, 128));
    g.fill_round_rect(70.0, 0.0, 60.0, 40.0, 12.0, 12.0);
    g.dispose_scope();

    g.set_paint(Paint::Linear(LinearGradient {
        start: Point::new(20.0, 80.0),
        end: Point::new(170.0, 80.0),
        stops: vec![
            GradientStop::new(0.0, Color::rgb(250, 200, 60)),
            GradientStop::new(1.0, Color::rgb(200, 60, 120)),
        ],
    }));
    g.fill_rect(20.0, 80.0, 150.0, 40.0);

    g.set_color(Color::BLACK);
    g.set_font(FontSpec::new("Serif", 10.0).italic());
    g.draw_string("engrave demo page", 20.0, 140.0);

    g.set_clip(Some(Shape::rect(20.0, 150.0, 100.0, 60.0)));
    g.set_hint(HintKey::Export, HintValue::ExportSize);
    let mut raster = ImageData::new(32, 32);
    for y in 0..32u32 {
        for x in 0..32u32 {
            let v = ((x * 8) as u8).wrapping_add((y * 8) as u8);
            raster.set_pixel(x, y, [v, 255 - v, 128, 255]);
        }
    }
    g.draw_image(Arc::new(raster), 20.0, 150.0, 120.0, 80.0);
    g.set_clip(None);

    g.draw_polyline(&[(20.0, 230.0), (60.0, 250.0), (100.0, 230.0), (140.0, 250.0)]);

    g.dispose();
    g
}

fn main() -> Result<()> {
    env_logger::init();
    let matches = cli().get_matches();

    let format: &String = matches.get_one("format").expect("required");
    let width = matches.get_one::<f64>("width").copied().unwrap_or(210.0);
    let height = matches.get_one::<f64>("height").copied().unwrap_or(297.0);
    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(format!("demo.{format}")));

    let recorder = demo_scene();
    let document = processor(format)?.process(recorder.commands(), PageSize::new(width, height))?;

    let mut out = BufWriter::new(File::create(&output)?);
    document.write(&mut out)?;
    println!("wrote {}", output.display());
    Ok(())
}
