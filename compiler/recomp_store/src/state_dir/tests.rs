use pretty_assertions::assert_eq;
use recomp_diagnostic::{CollectingSink, DiagnosticKind};
use recomp_ir::{ClassRef, DependencyItem};

use super::*;

fn class(name: &str) -> ClassRef {
    ClassRef::new("app", name)
}

fn populated() -> PersistentContext {
    let mut ctx = PersistentContext::new();
    ctx.set_versions(Versions::new("0.1.0", "rt-21"));
    ctx.record_timestamp(&SourceId::new("src/A.java"), Timestamp::from_millis(100));
    ctx.record_timestamp(&SourceId::new("C:\\src\\B.java"), Timestamp::from_millis(250));
    ctx.record_module_version("base", "sha256:0f0f");
    ctx.begin_unit(&class("A"));
    ctx.record_dependency(&class("A"), DependencyItem::class(class("B")));
    ctx.record_dependency(
        &class("A"),
        DependencyItem::method(ClassRef::new("base", "Shape"), "area", "()D"),
    );
    ctx.begin_unit(&class("B"));
    ctx
}

#[test]
fn missing_root_is_no_prior_state() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::new(dir.path().join("never-created"));
    assert!(state.load().unwrap().is_none());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::new(dir.path().join("state"));
    let ctx = populated();

    state.save(&ctx).unwrap();
    let loaded = state.load().unwrap().unwrap();

    assert_eq!(loaded, ctx);
    assert!(loaded.compatible("0.1.0", "rt-21"));
    assert!(!loaded.compatible("0.2.0", "rt-21"));
}

#[test]
fn layout_matches_documented_files() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::new(dir.path());
    state.save(&populated()).unwrap();

    for name in [
        RUNTIME_VERSION_FILE,
        TIMESTAMPS_FILE,
        MODULE_VERSIONS_FILE,
        STRING_TABLE_FILE,
        DEPENDENCIES_FILE,
    ] {
        assert!(dir.path().join(name).is_file(), "{name} missing");
        assert!(!dir.path().join(format!("{name}.tmp")).exists());
    }

    let versions = fs::read_to_string(dir.path().join(RUNTIME_VERSION_FILE)).unwrap();
    assert_eq!(versions, "rt-21\n0.1.0\n");
    let modules = fs::read_to_string(dir.path().join(MODULE_VERSIONS_FILE)).unwrap();
    assert_eq!(modules, "base:sha256:0f0f\n");
}

#[test]
fn saving_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::new(dir.path());
    state.save(&populated()).unwrap();
    let first = fs::read(dir.path().join(DEPENDENCIES_FILE)).unwrap();
    state.save(&populated()).unwrap();
    let second = fs::read(dir.path().join(DEPENDENCIES_FILE)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn context_without_versions_loads_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::new(dir.path());
    state.save(&populated()).unwrap();

    let mut unversioned = PersistentContext::new();
    unversioned.begin_unit(&class("A"));
    state.save(&unversioned).unwrap();

    assert!(state.load().unwrap().is_none());
}

#[test]
fn interrupted_save_loads_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::new(dir.path());
    state.save(&populated()).unwrap();

    // A save that died after removing the version file.
    fs::remove_file(dir.path().join(RUNTIME_VERSION_FILE)).unwrap();
    assert!(state.load().unwrap().is_none());
}

#[test]
fn truncated_dependencies_report_corrupt_state() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::new(dir.path());
    state.save(&populated()).unwrap();

    let path = dir.path().join(DEPENDENCIES_FILE);
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();

    assert!(matches!(
        state.load(),
        Err(StoreError::Decode {
            source: DecodeError::UnexpectedEof,
            ..
        })
    ));

    let sink = CollectingSink::new();
    let ctx = state.load_or_empty(&sink);
    assert!(ctx.is_empty());
    assert!(!ctx.compatible("0.1.0", "rt-21"));
    assert!(sink.has(DiagnosticKind::CorruptState));
}

#[test]
fn unparsable_timestamp_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::new(dir.path());
    state.save(&populated()).unwrap();
    fs::write(dir.path().join(TIMESTAMPS_FILE), "src/A.java:yesterday\n").unwrap();

    assert!(matches!(
        state.load(),
        Err(StoreError::Decode {
            source: DecodeError::MalformedLine { .. },
            ..
        })
    ));
}

#[test]
fn single_line_version_file_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::new(dir.path());
    state.save(&populated()).unwrap();
    fs::write(dir.path().join(RUNTIME_VERSION_FILE), "rt-21\n").unwrap();

    assert!(matches!(
        state.load(),
        Err(StoreError::MissingVersionLine { .. })
    ));
}

#[test]
fn missing_data_file_is_corrupt_not_absent() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::new(dir.path());
    state.save(&populated()).unwrap();
    fs::remove_file(dir.path().join(STRING_TABLE_FILE)).unwrap();

    let sink = CollectingSink::new();
    assert!(state.load_or_empty(&sink).is_empty());
    assert_eq!(sink.len(), 1);
}

#[test]
fn non_utf8_text_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let state = StateDir::new(dir.path());
    state.save(&populated()).unwrap();
    fs::write(dir.path().join(MODULE_VERSIONS_FILE), [0xff, 0xfe, b'\n']).unwrap();

    assert!(matches!(
        state.load(),
        Err(StoreError::Decode {
            source: DecodeError::InvalidUtf8,
            ..
        })
    ));
}
