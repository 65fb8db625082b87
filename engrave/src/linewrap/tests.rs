use super::*;

fn wrap(data: &[u8], width: usize) -> String {
    let mut writer = LineWrapWriter::new(Vec::new(), width);
    writer.write_all(data).unwrap();
    String::from_utf8(writer.finish()).unwrap()
}

#[test]
fn wraps_every_width_bytes() {
    assert_eq!(wrap(b"abcdefgh", 3), "abc\ndef\ngh");
}

#[test]
fn exact_multiple_has_no_trailing_eol() {
    assert_eq!(wrap(b"abcdef", 3), "abc\ndef");
}

#[test]
fn no_line_exceeds_width() {
    let out = wrap(&[b'x'; 1000], 80);
    let lines: Vec<&str> = out.split('\n').collect();
    assert!(lines.iter().all(|line| line.len() <= 80));
    // Every line but the last is full.
    assert!(lines[..lines.len() - 1].iter().all(|line| line.len() == 80));
}

#[test]
#[should_panic(expected = "width must be positive")]
fn zero_width_is_rejected() {
    let _ = LineWrapWriter::new(Vec::new(), 0);
}
