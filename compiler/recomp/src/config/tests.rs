use pretty_assertions::assert_eq;

use super::*;

#[test]
fn defaults() {
    let config = SessionConfig::new("/tmp/state");
    assert_eq!(config.state_root, PathBuf::from("/tmp/state"));
    assert_eq!(config.tool_version, env!("CARGO_PKG_VERSION"));
    assert_eq!(config.runtime_version, "unknown");
    assert_eq!(config.jobs, 0);
    assert!(config.parallel().effective_jobs() >= 1);
}

#[test]
fn builder_overrides() {
    let config = SessionConfig::new("state")
        .with_tool_version("2.1")
        .with_runtime_version("21.0.2")
        .with_jobs(3);
    assert_eq!(config.tool_version, "2.1");
    assert_eq!(config.runtime_version, "21.0.2");
    assert_eq!(config.parallel().effective_jobs(), 3);
}
