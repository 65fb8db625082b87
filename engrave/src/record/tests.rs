use super::*;
use crate::command::Command;

fn recorded(recorder: &Recorder) -> &[Command] {
    recorder.commands().as_slice()
}

/// Commands emitted after the initial scope/color/stroke seeding.
fn recorded_tail(recorder: &Recorder) -> &[Command] {
    &recorded(recorder)[3..]
}

#[test]
fn seeds_scope_color_and_stroke() {
    let recorder = Recorder::new();
    let commands = recorded(&recorder);
    assert_eq!(commands[0], Command::CreateScope);
    assert_eq!(commands[1], Command::SetColor(Color::BLACK));
    assert_eq!(
        commands[2],
        Command::SetStroke(Stroke::default().cap(LineCap::Butt))
    );
    assert_eq!(commands.len(), 3);
}

#[test]
fn repeated_set_color_records_once() {
    let mut recorder = Recorder::new();
    recorder.set_color(Color::RED);
    recorder.set_color(Color::RED);
    let sets: Vec<&Command> = recorded_tail(&recorder)
        .iter()
        .filter(|c| matches!(c, Command::SetColor(_)))
        .collect();
    assert_eq!(sets, vec![&Command::SetColor(Color::RED)]);
}

#[test]
fn identity_transform_calls_are_elided() {
    let mut recorder = Recorder::new();
    recorder.translate(0.0, 0.0);
    recorder.scale(1.0, 1.0);
    recorder.rotate(0.0);
    recorder.shear(0.0, 0.0);
    recorder.concat(Transform::identity());
    assert!(recorded_tail(&recorder).is_empty());
}

#[test]
fn transform_calls_compose_into_state() {
    let mut recorder = Recorder::new();
    recorder.translate(10.0, 0.0);
    recorder.scale(2.0, 2.0);
    // Scale applied after translate: translate offset is not scaled.
    let p = recorder
        .state()
        .transform()
        .transform_point(crate::graphics::Point::new(1.0, 0.0));
    assert_eq!(p, crate::graphics::Point::new(12.0, 0.0));
}

#[test]
fn set_transform_records_absolute_value() {
    let mut recorder = Recorder::new();
    let tx = Transform::translation(5.0, 6.0);
    recorder.set_transform(tx);
    recorder.set_transform(tx); // second call is a no-op
    assert_eq!(recorded_tail(&recorder), &[Command::SetTransform(tx)]);
}

#[test]
fn scopes_restore_state() {
    let mut recorder = Recorder::new();
    recorder.set_color(Color::RED);
    recorder.create_scope();
    recorder.set_color(Color::BLUE);
    recorder.translate(3.0, 3.0);
    recorder.dispose_scope();
    assert_eq!(recorder.state().color(), Color::RED);
    assert_eq!(*recorder.state().transform(), Transform::identity());
    // Setting red again after restore emits nothing.
    let before = recorded(&recorder).len();
    recorder.set_color(Color::RED);
    assert_eq!(recorded(&recorder).len(), before);
}

#[test]
#[should_panic(expected = "dispose_scope without matching create_scope")]
fn scope_underflow_panics() {
    let mut recorder = Recorder::new();
    recorder.dispose_scope();
}

#[test]
fn dispose_is_idempotent_and_silences_calls() {
    let mut recorder = Recorder::new();
    recorder.dispose();
    let len = recorded(&recorder).len();
    recorder.dispose();
    recorder.set_color(Color::RED);
    recorder.draw_line(0.0, 0.0, 1.0, 1.0);
    recorder.create_scope();
    recorder.dispose_scope(); // must not panic after disposal
    assert_eq!(recorded(&recorder).len(), len);
    assert_eq!(recorded(&recorder).last(), Some(&Command::DisposeScope));
}

#[test]
fn set_color_resets_paint() {
    use crate::graphics::{GradientStop, LinearGradient, Paint};
    let mut recorder = Recorder::new();
    let paint = Paint::Linear(LinearGradient {
        start: crate::graphics::Point::new(0.0, 0.0),
        end: crate::graphics::Point::new(1.0, 0.0),
        stops: vec![
            GradientStop::new(0.0, Color::BLACK),
            GradientStop::new(1.0, Color::WHITE),
        ],
    });
    recorder.set_paint(paint.clone());
    assert_eq!(recorder.state().paint(), Some(&paint));
    recorder.set_color(Color::RED);
    assert_eq!(recorder.state().paint(), None);
    // The same paint set again is a change and records again.
    recorder.set_paint(paint.clone());
    let sets = recorded(&recorder)
        .iter()
        .filter(|c| matches!(c, Command::SetPaint(_)))
        .count();
    assert_eq!(sets, 2);
}

#[test]
fn empty_text_is_not_recorded() {
    let mut recorder = Recorder::new();
    recorder.draw_string("   ", 0.0, 0.0);
    recorder.draw_string("", 1.0, 1.0);
    assert!(recorded_tail(&recorder).is_empty());
}

#[test]
fn clip_rect_intersects_rectangular_clip() {
    let mut recorder = Recorder::new();
    recorder.set_clip(Some(Shape::rect(0.0, 0.0, 10.0, 10.0)));
    recorder.clip_rect(Rect::new(5.0, 5.0, 10.0, 10.0));
    assert_eq!(
        recorder.state().clip(),
        Some(Shape::rect(5.0, 5.0, 5.0, 5.0))
    );
}

#[test]
fn redundant_clip_is_elided() {
    let mut recorder = Recorder::new();
    recorder.set_clip(Some(Shape::rect(0.0, 0.0, 10.0, 10.0)));
    let before = recorded(&recorder).len();
    recorder.set_clip(Some(Shape::rect(0.0, 0.0, 10.0, 10.0)));
    assert_eq!(recorded(&recorder).len(), before);
}

#[test]
fn clear_rect_uses_background_and_restores_color() {
    let mut recorder = Recorder::new();
    recorder.set_background(Color::WHITE);
    recorder.clear_rect(0.0, 0.0, 5.0, 5.0);
    let tail = recorded_tail(&recorder);
    assert!(tail.contains(&Command::SetColor(Color::WHITE)));
    assert!(tail.contains(&Command::FillShape(Shape::rect(0.0, 0.0, 5.0, 5.0))));
    assert_eq!(recorder.state().color(), Color::BLACK);
}

#[test]
fn axis_aligned_image_transform_avoids_resampling() {
    let image = Arc::new(crate::raster::ImageData::new(4, 2));
    let mut recorder = Recorder::new();
    let tx = Transform::scale(2.0, 3.0).then(&Transform::translation(1.0, 1.0));
    recorder.draw_image_transformed(image.clone(), &tx);
    match recorded_tail(&recorder) {
        [Command::DrawImage(placement)] => {
            assert!(Arc::ptr_eq(&placement.image, &image));
            assert_eq!(
                (placement.x, placement.y, placement.width, placement.height),
                (1.0, 1.0, 8.0, 6.0)
            );
        }
        other => panic!("unexpected commands: {other:?}"),
    }
}

#[test]
fn polygon_paths_are_closed() {
    let mut recorder = Recorder::new();
    recorder.fill_polygon(&[(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)]);
    match recorded_tail(&recorder) {
        [Command::FillShape(Shape::Path(path))] => {
            assert_eq!(path.segments.last(), Some(&crate::shape::Seg::Close));
        }
        other => panic!("unexpected commands: {other:?}"),
    }
}
