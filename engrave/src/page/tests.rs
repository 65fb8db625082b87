use super::*;

#[test]
fn orientation_helpers_swap_extents() {
    assert_eq!(PageSize::A4.landscape(), PageSize::new(297.0, 210.0));
    assert_eq!(PageSize::A4.landscape().portrait(), PageSize::A4);
    assert_eq!(PageSize::A4.portrait(), PageSize::A4);
    assert_eq!(PageSize::LEDGER, PageSize::TABLOID.landscape());
}

#[test]
fn origin_is_preserved() {
    let page = PageSize::with_origin(10.0, 20.0, 100.0, 50.0);
    assert_eq!(page.portrait(), PageSize::with_origin(10.0, 20.0, 50.0, 100.0));
}
