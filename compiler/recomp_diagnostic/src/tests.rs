use pretty_assertions::assert_eq;

use super::*;

#[test]
fn collecting_sink_buffers_and_drains() {
    let sink = CollectingSink::new();
    assert!(sink.is_empty());

    sink.report(Diagnostic::corrupt_state("dependencies: unexpected end of input"));
    sink.report(Diagnostic::missing_record("app/Widget"));

    assert_eq!(sink.len(), 2);
    assert!(sink.has(DiagnosticKind::MissingRecord));
    assert!(!sink.has(DiagnosticKind::WriteFailed));

    let drained = sink.take();
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].kind, DiagnosticKind::CorruptState);
    assert!(sink.is_empty());
}

#[test]
fn sink_is_shareable_across_threads() {
    let sink = CollectingSink::new();
    std::thread::scope(|scope| {
        for i in 0..4 {
            let sink = &sink;
            scope.spawn(move || sink.report(Diagnostic::missing_record(format!("unit {i}"))));
        }
    });
    assert_eq!(sink.len(), 4);
}

#[test]
fn display_includes_code() {
    let d = Diagnostic::write_failed("disk full");
    assert_eq!(d.to_string(), "[R0003] disk full");
}

#[test]
fn reference_forwards_to_sink() {
    fn report_via<S: DiagnosticSink>(sink: S) {
        sink.report(Diagnostic::corrupt_state("bad"));
    }

    let sink = CollectingSink::new();
    report_via(&sink);
    assert_eq!(sink.len(), 1);
}
