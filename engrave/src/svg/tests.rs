use super::*;
use crate::{graphics::Stroke, record::Recorder};
use std::sync::Arc;

fn render(commands: crate::command::CommandSequence) -> String {
    let document = SvgProcessor
        .process(&commands, PageSize::new(100.0, 100.0))
        .unwrap();
    let mut out = Vec::new();
    document.write(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn document_shell_has_doctype_and_view_box() {
    let text = render(Recorder::new().into_commands());
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>"));
    assert!(text.contains("<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\""));
    assert!(text.contains("viewBox=\"0 0 100 100\""));
    assert!(text.contains("width=\"100px\""));
    assert!(text.contains("xmlns:xlink=\"http://www.w3.org/1999/xlink\""));
}

#[test]
fn line_becomes_a_line_element_with_stroke_style() {
    let mut recorder = Recorder::new();
    recorder.draw_line(0.0, 0.0, 10.0, 10.0);
    let text = render(recorder.into_commands());
    assert!(
        text.contains("<line x1=\"0\" y1=\"0\" x2=\"10\" y2=\"10\""),
        "missing line: {text}"
    );
    assert!(text.contains("fill:none;stroke:rgb(0,0,0);"));
}

#[test]
fn fill_emits_fill_style_without_stroke() {
    let mut recorder = Recorder::new();
    recorder.set_color(Color::rgba(255, 0, 0, 128));
    recorder.fill_rect(1.0, 2.0, 3.0, 4.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("<rect x=\"1\" y=\"2\" width=\"3\" height=\"4\""));
    assert!(text.contains("fill:rgb(255,0,0);"));
    assert!(text.contains("fill-opacity:0.501961;"));
    assert!(text.contains("stroke:none;"));
}

#[test]
fn even_odd_fill_sets_the_fill_rule() {
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
    assert!(text.contains("fill-rule:evenodd;"));
    assert!(text.contains("<path d=\"M0,0 L4,0 L4,4 Z\""));
}

#[test]
fn round_rect_and_ellipse_are_specialized() {
    let mut recorder = Recorder::new();
    recorder.fill_round_rect(0.0, 0.0, 10.0, 10.0, 4.0, 2.0);
    recorder.fill_oval(0.0, 0.0, 10.0, 20.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("rx=\"2\" ry=\"1\""));
    assert!(text.contains("<ellipse cx=\"5\" cy=\"10\" rx=\"5\" ry=\"10\""));
}

#[test]
fn transform_opens_a_group() {
    let mut recorder = Recorder::new();
    recorder.translate(5.0, 6.0);
    recorder.draw_line(0.0, 0.0, 1.0, 1.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("<g transform=\"translate(5 6)\">"));
}

#[test]
fn non_translation_transform_uses_matrix_form() {
    let mut recorder = Recorder::new();
    recorder.scale(2.0, 3.0);
    recorder.draw_line(0.0, 0.0, 1.0, 1.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("transform=\"matrix(2 0 0 3 0 0)\""));
}

#[test]
fn clip_paths_are_interned_in_defs() {
    let mut recorder = Recorder::new();
    let clip = Shape::rect(0.0, 0.0, 50.0, 50.0);
    recorder.set_clip(Some(clip.clone()));
    recorder.draw_line(0.0, 0.0, 1.0, 1.0);
    recorder.set_clip(None);
    recorder.draw_line(1.0, 1.0, 2.0, 2.0);
    recorder.set_clip(Some(clip));
    recorder.draw_line(2.0, 2.0, 3.0, 3.0);
    let text = render(recorder.into_commands());

    // One stored definition, two references.
    assert_eq!(text.matches("<clipPath id=\"clip0\">").count(), 1);
    assert!(!text.contains("clip1"));
    assert_eq!(text.matches("clip-path=\"url(#clip0)\"").count(), 2);
    // Defs come before the drawing body.
    assert!(text.find("<defs>").unwrap() < text.find("<line").unwrap());
}

#[test]
fn text_is_escaped() {
    let mut recorder = Recorder::new();
    recorder.draw_string("a < b & c", 5.0, 10.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("<text x=\"5\" y=\"10\""));
    assert!(text.contains("a &lt; b &amp; c"));
}

#[test]
fn font_attributes_are_emitted_for_non_default_fonts() {
    let mut recorder = Recorder::new();
    recorder.set_font(FontSpec::new("Serif", 18.0).bold());
    recorder.draw_string("hello", 0.0, 0.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("font-family:\"Serif\";"));
    assert!(text.contains("font-size:18px;"));
    assert!(text.contains("font-weight:bold;"));
}

#[test]
fn stroke_attributes_only_when_non_default() {
    use crate::graphics::LineCap;
    let mut recorder = Recorder::new();
    recorder.set_stroke(
        Stroke::new(3.0)
            .cap(LineCap::Butt)
            .dash(vec![4.0, 2.0], 1.0),
    );
    recorder.draw_line(0.0, 0.0, 1.0, 1.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("stroke-width:3;"));
    assert!(text.contains("stroke-dasharray:4,2;"));
    assert!(text.contains("stroke-dashoffset:1;"));
    // A butt cap is the SVG default, so no linecap attribute is emitted.
    assert!(!text.contains("stroke-linecap"));
}

#[test]
fn image_embeds_a_png_data_uri() {
    let mut image = crate::raster::ImageData::new(2, 2);
    image.set_pixel(0, 0, [255, 0, 0, 255]);
    let mut recorder = Recorder::new();
    recorder.draw_image(Arc::new(image), 1.0, 2.0, 3.0, 4.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("<image x=\"1\" y=\"2\" width=\"3\" height=\"4\""));
    assert!(text.contains("preserveAspectRatio=\"none\""));
    assert!(text.contains("xlink:href=\"data:image/png;base64,iVBOR"));
}

#[test]
fn size_hint_allows_lossy_image_encoding() {
    use crate::state::{HintKey, HintValue};
    // Incompressible noise: PNG stays near raw size while the lossy
    // JPEG re-encode quantizes it well below that.
    let mut image = crate::raster::ImageData::new(64, 64);
    let mut state = 0x9e3779b9u32;
    for y in 0..64u32 {
        for x in 0..64u32 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let [r, g, b, _] = state.to_le_bytes();
            image.set_pixel(x, y, [r, g, b, 255]);
        }
    }
    let mut recorder = Recorder::new();
    recorder.set_hint(HintKey::Export, HintValue::ExportSize);
    recorder.draw_image(Arc::new(image), 0.0, 0.0, 64.0, 64.0);
    let text = render(recorder.into_commands());
    assert!(text.contains("data:image/jpeg;base64,"));
}

#[test]
fn scopes_restore_grouping_state() {
    let mut recorder = Recorder::new();
    recorder.create_scope();
    recorder.translate(5.0, 5.0);
    recorder.draw_line(0.0, 0.0, 1.0, 1.0);
    recorder.dispose_scope();
    recorder.draw_line(2.0, 2.0, 3.0, 3.0);
    let text = render(recorder.into_commands());
    // The second line draws outside the transformed group.
    let group_end = text.find("</g>").unwrap();
    let second_line = text.find("<line x1=\"2\"").unwrap();
    assert!(group_end < second_line);
}
