use super::*;
use crate::graphics::LineCap;

#[test]
fn fresh_state_is_default() {
    let state = GraphicsState::default();
    assert!(state.is_default());
}

#[test]
fn any_change_leaves_default() {
    let mut state = GraphicsState::default();
    state.set_color(Color::BLACK);
    assert!(!state.is_default());

    let mut state = GraphicsState::default();
    state.set_hint(HintKey::Export, HintValue::ExportSize);
    assert!(!state.is_default());

    let mut state = GraphicsState::default();
    state.set_stroke(Stroke::default().cap(LineCap::Butt));
    assert!(!state.is_default());
}

#[test]
fn clone_is_structural() {
    let mut state = GraphicsState::default();
    state.set_clip(Some(Shape::rect(0.0, 0.0, 10.0, 10.0)));
    let copy = state.clone();
    state.set_clip(None);
    // The copy keeps its own clip.
    assert!(copy.clip().is_some());
    assert!(state.clip().is_none());
}

#[test]
fn clip_is_stored_in_device_space() {
    let mut state = GraphicsState::default();
    state.set_transform(Transform::translation(5.0, 5.0));
    state.set_clip(Some(Shape::rect(0.0, 0.0, 10.0, 10.0)));

    // Device-space copy is shifted by the transform active at set time.
    assert_eq!(
        state.clip_in_device_space(),
        Some(&Shape::rect(5.0, 5.0, 10.0, 10.0))
    );
    // Reading it back through the same transform restores user space.
    assert_eq!(state.clip(), Some(Shape::rect(0.0, 0.0, 10.0, 10.0)));

    // A later transform change moves the user-space view, not the region.
    state.set_transform(Transform::translation(1.0, 1.0));
    assert_eq!(state.clip(), Some(Shape::rect(4.0, 4.0, 10.0, 10.0)));
}

#[test]
fn singular_transform_hides_clip() {
    let mut state = GraphicsState::default();
    state.set_clip(Some(Shape::rect(0.0, 0.0, 10.0, 10.0)));
    state.set_transform(Transform::scale(0.0, 0.0));
    assert!(state.clip().is_none());
}
