use super::*;

#[test]
fn newer_is_strict() {
    let recorded = Timestamp::from_millis(100);
    assert!(!Timestamp::from_millis(100).is_newer_than(recorded));
    assert!(!Timestamp::from_millis(99).is_newer_than(recorded));
    assert!(Timestamp::from_millis(101).is_newer_than(recorded));
}

#[test]
fn of_file_reads_mtime() {
    let path = std::env::temp_dir().join(format!(
        "recomp_ir_timestamp_{}",
        std::process::id()
    ));
    std::fs::write(&path, "class A {}").unwrap();

    let ts = Timestamp::of_file(&path).unwrap();
    assert!(ts.as_millis() > 0);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn of_file_missing_is_error() {
    let missing = std::env::temp_dir().join("recomp_ir_definitely_missing_source");
    assert!(Timestamp::of_file(&missing).is_err());
}

#[test]
fn source_id_display() {
    let id = SourceId::new("src/app/Widget.java");
    assert_eq!(id.to_string(), "src/app/Widget.java");
    assert_eq!(id.as_str(), "src/app/Widget.java");
}
