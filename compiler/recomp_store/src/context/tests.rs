use pretty_assertions::assert_eq;

use super::*;

fn class(name: &str) -> ClassRef {
    ClassRef::new("app", name)
}

fn src(name: &str) -> SourceId {
    SourceId::new(format!("src/{name}.java"))
}

fn ts(ms: u64) -> Timestamp {
    Timestamp::from_millis(ms)
}

fn loaded() -> PersistentContext {
    let mut timestamps = FxHashMap::default();
    timestamps.insert(src("A"), ts(100));
    let mut module_versions = FxHashMap::default();
    module_versions.insert(Arc::from("base"), Arc::from("v1"));
    let mut dependencies = DependencyMap::default();
    let mut deps = FxHashSet::default();
    deps.insert(DependencyItem::class(class("B")));
    dependencies.insert(class("A"), deps);
    PersistentContext::from_parts(
        Versions::new("1.0", "rt-17"),
        timestamps,
        module_versions,
        dependencies,
    )
}

#[test]
fn fresh_context_is_never_compatible() {
    let ctx = PersistentContext::new();
    assert!(!ctx.compatible("1.0", "rt-17"));
    assert!(ctx.is_empty());
}

#[test]
fn compatible_requires_exact_match() {
    let ctx = loaded();
    assert!(ctx.compatible("1.0", "rt-17"));
    assert!(!ctx.compatible("1.1", "rt-17"));
    assert!(!ctx.compatible("1.0", "rt-18"));
}

#[test]
fn first_timestamp_in_session_replaces_loaded_value() {
    let mut ctx = loaded();
    assert!(ctx.record_timestamp(&src("A"), ts(150)));
    assert_eq!(ctx.timestamp(&src("A")), Some(ts(150)));

    // Later observations in the same session are ignored.
    assert!(!ctx.record_timestamp(&src("A"), ts(200)));
    assert_eq!(ctx.timestamp(&src("A")), Some(ts(150)));
}

#[test]
fn module_version_first_write_wins() {
    let mut ctx = loaded();
    assert!(ctx.record_module_version("base", "v2"));
    assert!(!ctx.record_module_version("base", "v3"));
    assert_eq!(ctx.module_version("base"), Some("v2"));
}

#[test]
fn begin_unit_discards_stale_dependencies_once() {
    let mut ctx = loaded();
    assert!(ctx.begin_unit(&class("A")));
    assert_eq!(ctx.dependencies_of(&class("A")).map(|d| d.len()), Some(0));

    ctx.record_dependency(&class("A"), DependencyItem::class(class("C")));
    assert!(!ctx.begin_unit(&class("A")));
    ctx.record_dependency(&class("A"), DependencyItem::module("base"));

    let deps = ctx.dependencies_of(&class("A")).unwrap();
    assert_eq!(deps.len(), 2);
    assert!(!deps.contains(&DependencyItem::class(class("B"))));
}

#[test]
fn begin_unit_leaves_empty_record_for_leaf_units() {
    let mut ctx = PersistentContext::new();
    ctx.begin_unit(&class("Leaf"));
    assert!(ctx.dependencies_of(&class("Leaf")).is_some());
    assert_eq!(ctx.unit_count(), 1);
}

#[test]
fn record_dependency_unions() {
    let mut ctx = PersistentContext::new();
    let item = DependencyItem::method(class("B"), "run", "()V");
    ctx.record_dependency(&class("A"), item.clone());
    ctx.record_dependency(&class("A"), item);
    assert_eq!(ctx.dependencies_of(&class("A")).unwrap().len(), 1);
}

#[test]
fn clear_empties_everything() {
    let mut ctx = loaded();
    ctx.record_timestamp(&src("B"), ts(1));
    ctx.clear();
    assert!(ctx.is_empty());
    assert_eq!(ctx.versions(), None);
    assert!(!ctx.compatible("1.0", "rt-17"));
    // Session marks are gone too, so recording works again.
    assert!(ctx.record_timestamp(&src("B"), ts(2)));
}

#[test]
fn equality_ignores_session_marks() {
    let mut a = loaded();
    let b = loaded();
    a.record_timestamp(&src("A"), ts(100));
    assert_eq!(a, b);
}

#[test]
fn forget_drops_carried_over_timestamp() {
    let mut ctx = loaded();
    assert!(ctx.forget_timestamp(&src("A")));
    assert_eq!(ctx.timestamp(&src("A")), None);
    assert!(!ctx.forget_timestamp(&src("A")));
}

#[test]
fn forget_keeps_timestamp_recorded_this_session() {
    let mut ctx = loaded();
    ctx.record_timestamp(&src("A"), ts(150));
    assert!(!ctx.forget_timestamp(&src("A")));
    assert_eq!(ctx.timestamp(&src("A")), Some(ts(150)));
}

#[test]
fn prune_drops_units_outside_the_build() {
    let mut ctx = loaded();
    ctx.record_dependency(&class("Gone"), DependencyItem::module("base"));
    ctx.timestamps.insert(src("Gone"), ts(100));

    let units: FxHashSet<ClassRef> = [class("A")].into_iter().collect();
    let sources: FxHashSet<SourceId> = [src("A")].into_iter().collect();
    assert_eq!(ctx.prune(&units, &sources), 1);

    assert!(ctx.dependencies_of(&class("Gone")).is_none());
    assert_eq!(ctx.timestamp(&src("Gone")), None);
    assert!(ctx.dependencies_of(&class("A")).is_some());
    assert_eq!(ctx.timestamp(&src("A")), Some(ts(100)));
    // Only `Gone` referred to `base`.
    assert_eq!(ctx.module_version("base"), None);
}

#[test]
fn prune_keeps_what_this_session_recorded() {
    let mut ctx = loaded();
    ctx.begin_unit(&class("New"));
    ctx.record_timestamp(&src("New"), ts(5));
    ctx.record_module_version("extra", "v9");

    let none = FxHashSet::default();
    assert_eq!(ctx.prune(&none, &FxHashSet::default()), 1);

    assert!(ctx.dependencies_of(&class("New")).is_some());
    assert_eq!(ctx.timestamp(&src("New")), Some(ts(5)));
    assert_eq!(ctx.module_version("extra"), Some("v9"));
    assert!(ctx.dependencies_of(&class("A")).is_none());
}
