use super::*;
use assert_approx_eq::assert_approx_eq;
use test_case::test_case;

#[test]
fn concat_applies_argument_first() {
    let scale = Transform::scale(2.0, 3.0);
    let translate = Transform::translation(10.0, 20.0);
    // Translate first, then scale: the offset is scaled.
    let m = concat(&scale, &translate);
    let p = m.transform_point(Point::new(0.0, 0.0));
    assert_approx_eq!(p.x, 20.0);
    assert_approx_eq!(p.y, 60.0);
}

#[test]
fn concat_matches_operator_matrix_order() {
    let a = Transform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
    let b = Transform::new(7.0, 8.0, 9.0, 10.0, 11.0, 12.0);
    assert_eq!(concat(&a, &b), b.then(&a));
}

#[test_case(FontSpec::new("Dialog", 12.0) => "Helvetica")]
#[test_case(FontSpec::new("SansSerif", 12.0).bold() => "Helvetica-Bold")]
#[test_case(FontSpec::new("Serif", 12.0) => "Times-Roman")]
#[test_case(FontSpec::new("Serif", 12.0).italic() => "Times-Italic")]
#[test_case(FontSpec::new("Serif", 12.0).bold().italic() => "Times-BoldItalic")]
#[test_case(FontSpec::new("Monospaced", 10.0) => "Courier")]
#[test_case(FontSpec::new("Courier New", 10.0).italic() => "Courier-Oblique")]
#[test_case(FontSpec::new("DejaVu Sans Mono", 10.0).bold() => "DejaVuSansMono-Bold")]
fn ps_names(font: FontSpec) -> String {
    font.ps_name()
}

#[test]
fn color_alpha() {
    assert!(Color::BLACK.is_opaque());
    assert!(!Color::rgba(0, 0, 0, 127).is_opaque());
    assert_approx_eq!(Color::rgba(0, 0, 0, 51).alpha(), 0.2);
}

#[test]
fn stroke_default_matches_platform_stock_pen() {
    let stroke = Stroke::default();
    assert_eq!(stroke.width, 1.0);
    assert_eq!(stroke.cap, LineCap::Square);
    assert_eq!(stroke.join, LineJoin::Miter);
    assert_eq!(stroke.miter_limit, 10.0);
    assert!(stroke.dash.is_empty());
}
