use super::*;
use crate::record::Recorder;
use std::sync::Arc;

fn render(commands: crate::command::CommandSequence) -> String {
    let document = EpsProcessor
        .process(&commands, PageSize::new(100.0, 100.0))
        .unwrap();
    let mut out = Vec::new();
    document.write(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn header_carries_bounding_box_and_aliases() {
    let text = render(Recorder::new().into_commands());
    assert!(text.starts_with("%!PS-Adobe-3.0 EPSF-3.0\n"));
    assert!(text.contains("%%BoundingBox: 0 0 284 284"));
    assert!(text.contains("%%HiResBoundingBox: 0 0 283.464567 283.464567"));
    assert!(text.contains("/M /moveto load def"));
    assert!(text.contains("/basematrix matrix currentmatrix def"));
    assert!(text.contains("2.834646 -2.834646 scale"));
    assert!(text.trim_end().ends_with("%%EOF"));
}

#[test]
fn line_draw_uses_alias_operators() {
    let mut recorder = Recorder::new();
    recorder.draw_line(0.0, 0.0, 10.0, 10.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("newpath 0 0 M 10 10 L stroke"));
    assert!(text.contains("0 0 0 rgb"));
}

#[test]
fn rect_and_ellipse_use_shorthand_procedures() {
    let mut recorder = Recorder::new();
    recorder.fill_rect(1.0, 2.0, 3.0, 4.0);
    recorder.draw_oval(0.0, 0.0, 10.0, 20.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("newpath 1 2 3 4 rect Z fill"));
    assert!(text.contains("newpath 5 10 5 10 360 0 ellipse Z stroke"));
}

#[test]
fn even_odd_fill_uses_eofill() {
    use crate::shape::{Path, Winding};
    let mut recorder = Recorder::new();
    recorder.fill(Shape::Path(
        Path::new(Winding::EvenOdd)
            .move_to(0.0, 0.0)
            .line_to(4.0, 0.0)
            .line_to(4.0, 4.0)
            .close(),
    ));
    let text = render(recorder.into_commands());
    assert!(text.contains(" eofill"));
}

#[test]
fn scopes_map_to_gsave_grestore() {
    let mut recorder = Recorder::new();
    recorder.create_scope();
    recorder.translate(5.0, 6.0);
    recorder.dispose_scope();
    let text = render(recorder.into_commands());
    assert!(text.contains("5 6 translate"));
    // Header gsave plus the recorded scope.
    assert!(text.matches("gsave").count() >= 2);
    assert!(text.contains("grestore"));
}

#[test]
fn set_transform_rehomes_on_the_base_matrix() {
    let mut commands = crate::command::CommandSequence::new();
    commands.push(Command::SetTransform(crate::graphics::Transform::new(
        1.0, 0.0, 0.0, 1.0, 7.0, 8.0,
    )));
    let text = render(commands);
    assert!(text.contains("basematrix setmatrix [1 0 0 1 7 8] concat"));
}

#[test]
fn clip_restores_before_clipping() {
    let mut recorder = Recorder::new();
    recorder.set_clip(Some(Shape::rect(0.0, 0.0, 50.0, 50.0)));
    let text = render(recorder.into_commands());
    let restore = text.find("cliprestore").unwrap();
    let clip = text.find("rect Z clip").unwrap();
    assert!(restore < clip);
}

#[test]
fn text_is_escaped_and_y_flipped() {
    let mut recorder = Recorder::new();
    recorder.draw_string("a (b) \\", 3.0, 4.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("gsave 1 -1 scale 3 -4 M (a \\(b\\) \\\\) show grestore"));
}

#[test]
fn unsupported_composite_degrades_to_comment() {
    use crate::graphics::{Composite, CompositeRule};
    let mut recorder = Recorder::new();
    recorder.set_composite(Composite::new(CompositeRule::Xor, 1.0));
    let text = render(recorder.into_commands());
    assert!(text.contains("% composite not supported: Xor"));
}

#[test]
fn opaque_image_embeds_ascii85_flate_block() {
    let mut image = crate::raster::ImageData::new(2, 2);
    for y in 0..2 {
        for x in 0..2 {
            image.set_pixel(x, y, [200, 100, 50, 255]);
        }
    }
    let mut recorder = Recorder::new();
    recorder.draw_image(Arc::new(image), 10.0, 20.0, 4.0, 4.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("10 20 translate"));
    assert!(text.contains("4 4 scale"));
    assert!(text.contains("2 2 3 8 1 true currentfile /ASCII85Decode filter"));
    assert!(text.contains("/FlateDecode filter imgdict image"));
    assert!(text.contains("~>"));
    assert!(!text.contains("/ImageType 3"));
}

#[test]
fn translucent_image_carries_a_mask_dictionary() {
    let mut image = crate::raster::ImageData::new(2, 1);
    image.set_pixel(0, 0, [1, 2, 3, 255]);
    image.set_pixel(1, 0, [1, 2, 3, 0]);
    let mut recorder = Recorder::new();
    recorder.draw_image(Arc::new(image), 0.0, 0.0, 2.0, 1.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("/ImageType 3 /InterleaveType 1"));
    assert!(text.contains("/MaskDict 2 1 1 8 1 false 0 imgdict"));
    assert!(text.contains("/DataDict 2 1 3 8 1 true"));
}

#[test]
fn no_output_line_exceeds_the_postscript_limit() {
    let mut recorder = Recorder::new();
    // A long polyline forces statement wrapping.
    let points: Vec<(f64, f64)> = (0..200)
        .map(|i| (f64::from(i) * 1.5, f64::from(i % 7) * 2.25))
        .collect();
    recorder.draw_polyline(&points);
    let text = render(recorder.into_commands());
    for line in text.lines() {
        assert!(line.len() <= MAX_LINE_WIDTH, "line too long: {line}");
    }
    // Tokens survive wrapping: re-joining restores the original element.
    assert!(text.contains("298.5"));
}

#[test]
fn wrapping_breaks_only_at_whitespace() {
    let element: String = (0..100)
        .map(|i| format!("{} token", i * 11))
        .collect::<Vec<_>>()
        .join(" ");
    let mut out = Vec::new();
    write_wrapped(&mut out, &element).unwrap();
    let wrapped = String::from_utf8(out).unwrap();
    for line in wrapped.lines() {
        assert!(line.len() <= MAX_LINE_WIDTH);
    }
    assert_eq!(wrapped.replace('\n', " ").trim_end(), element);
}
