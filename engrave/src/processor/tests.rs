use super::*;
use crate::record::Recorder;
use test_case::test_case;

#[test_case("pdf", true)]
#[test_case("eps", true)]
#[test_case("svg", false)]
fn factory_resolves_known_formats(format: &str, compressed: bool) {
    let commands = Recorder::new().into_commands();
    let document = processor(format)
        .unwrap()
        .process(&commands, PageSize::A4)
        .unwrap();
    assert_eq!(document.is_compressed(), compressed);

    let mut out = Vec::new();
    document.write(&mut out).unwrap();
    assert!(!out.is_empty());
}

#[test]
fn unknown_format_is_rejected() {
    match processor("gif") {
        Err(ProcessorError::UnknownFormat(name)) => assert_eq!(name, "gif"),
        other => panic!("expected UnknownFormat, got {:?}", other.err()),
    }
}

#[test]
fn write_propagates_io_errors() {
    struct Failing;
    impl std::io::Write for Failing {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let commands = Recorder::new().into_commands();
    let document = processor("eps")
        .unwrap()
        .process(&commands, PageSize::A4)
        .unwrap();
    let err = document.write(&mut Failing).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}
