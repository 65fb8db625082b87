use super::*;
use assert_approx_eq::assert_approx_eq;
use euclid::approxeq::ApproxEq;
use std::f64::consts::FRAC_PI_2;

#[test]
fn equal_payloads_compare_equal() {
    assert_eq!(
        Command::SetColor(Color::rgb(1, 2, 3)),
        Command::SetColor(Color::rgb(1, 2, 3))
    );
    assert_ne!(
        Command::SetColor(Color::rgb(1, 2, 3)),
        Command::SetColor(Color::rgb(1, 2, 4))
    );
    assert_ne!(
        Command::DrawShape(Shape::rect(0.0, 0.0, 1.0, 1.0)),
        Command::FillShape(Shape::rect(0.0, 0.0, 1.0, 1.0))
    );
}

#[test]
fn classification() {
    assert!(Command::SetColor(Color::BLACK).is_state_change());
    assert!(Command::Translate { dx: 1.0, dy: 0.0 }.is_state_change());
    assert!(Command::SetTransform(Transform::identity()).is_state_change());
    assert!(!Command::CreateScope.is_state_change());
    assert!(!Command::DrawShape(Shape::line(0.0, 0.0, 1.0, 1.0)).is_state_change());

    assert!(Command::DrawString {
        text: "x".into(),
        x: 0.0,
        y: 0.0
    }
    .is_draw());
    assert!(!Command::DisposeScope.is_draw());
}

#[test]
fn relative_transform_of_rotate_about_center() {
    let cmd = Command::Rotate {
        theta: FRAC_PI_2,
        cx: 10.0,
        cy: 0.0,
    };
    let tx = cmd.relative_transform().unwrap();
    // Rotating a quarter turn about (10, 0) maps the origin to (10, -10).
    let p = tx.transform_point(crate::graphics::Point::new(0.0, 0.0));
    assert_approx_eq!(p.x, 10.0);
    assert_approx_eq!(p.y, -10.0);
}

#[test]
fn set_transform_is_not_relative() {
    assert!(Command::SetTransform(Transform::scale(2.0, 2.0))
        .relative_transform()
        .is_none());
}

#[test]
fn apply_transform_matches_operator_semantics() {
    let current = Transform::scale(2.0, 2.0);

    // Absolute set replaces.
    let set = Command::SetTransform(Transform::translation(1.0, 1.0));
    assert_eq!(
        set.apply_transform(&current).unwrap(),
        Transform::translation(1.0, 1.0)
    );

    // Relative translate applies before the current transform.
    let translate = Command::Translate { dx: 3.0, dy: 0.0 };
    let combined = translate.apply_transform(&current).unwrap();
    let p = combined.transform_point(crate::graphics::Point::new(0.0, 0.0));
    assert_approx_eq!(p.x, 6.0);
    assert_approx_eq!(p.y, 0.0);
}

#[test]
fn shear_matrix_matches_definition() {
    let tx = Command::Shear { shx: 2.0, shy: 0.0 }
        .relative_transform()
        .unwrap();
    let p = tx.transform_point(crate::graphics::Point::new(0.0, 1.0));
    assert!(p.approx_eq(&crate::graphics::Point::new(2.0, 1.0)));
}

#[test]
fn sequence_supports_repeated_iteration() {
    let mut seq = CommandSequence::new();
    seq.push(Command::CreateScope);
    seq.push(Command::DisposeScope);
    assert_eq!(seq.iter().count(), 2);
    assert_eq!(seq.iter().count(), 2);
    assert_eq!(seq.len(), 2);
}
