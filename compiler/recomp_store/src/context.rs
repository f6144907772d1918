//! The persistent build context.
//!
//! Holds everything the previous session learned about the build:
//! - the tool/runtime versions it was written with
//! - the last known modification time of every unit source
//! - the version token of every external module a unit relied on
//! - the dependency set each unit recorded the last time it was compiled
//!
//! One context exists per build session. It is loaded (or created empty),
//! mutated in place by the recorder while units compile, handed read-only
//! to the invalidation graph, and written back once the build succeeds.
//!
//! # First-Write-Wins
//!
//! Timestamps and module versions are recorded once per *session*: the
//! first observation in a session replaces whatever was loaded from disk,
//! later observations in the same session are ignored. The same applies to
//! a unit's dependency set, which is reset on first entry and merged after.
//! The per-session bookkeeping is never persisted.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use recomp_ir::{ClassRef, DependencyItem, SourceId, Timestamp};

/// Recorded dependency sets, keyed by owning unit.
pub type DependencyMap = FxHashMap<ClassRef, FxHashSet<DependencyItem>>;

/// Tool and runtime versions a context was saved with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versions {
    pub tool: String,
    pub runtime: String,
}

impl Versions {
    pub fn new(tool: impl Into<String>, runtime: impl Into<String>) -> Self {
        Versions {
            tool: tool.into(),
            runtime: runtime.into(),
        }
    }
}

/// What has already been recorded during the current session.
#[derive(Clone, Debug, Default)]
struct SessionMarks {
    sources: FxHashSet<SourceId>,
    modules: FxHashSet<Arc<str>>,
    units: FxHashSet<ClassRef>,
}

#[derive(Clone, Debug, Default)]
pub struct PersistentContext {
    versions: Option<Versions>,
    timestamps: FxHashMap<SourceId, Timestamp>,
    module_versions: FxHashMap<Arc<str>, Arc<str>>,
    dependencies: DependencyMap,
    session: SessionMarks,
}

impl PersistentContext {
    /// An empty context, as on a first run.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        versions: Versions,
        timestamps: FxHashMap<SourceId, Timestamp>,
        module_versions: FxHashMap<Arc<str>, Arc<str>>,
        dependencies: DependencyMap,
    ) -> Self {
        PersistentContext {
            versions: Some(versions),
            timestamps,
            module_versions,
            dependencies,
            session: SessionMarks::default(),
        }
    }

    /// True only if both versions exactly match those recorded at the last
    /// save. A context that was never saved is never compatible.
    pub fn compatible(&self, tool_version: &str, runtime_version: &str) -> bool {
        self.versions
            .as_ref()
            .is_some_and(|v| v.tool == tool_version && v.runtime == runtime_version)
    }

    pub fn versions(&self) -> Option<&Versions> {
        self.versions.as_ref()
    }

    /// Stamp the versions the context will be saved with.
    pub fn set_versions(&mut self, versions: Versions) {
        self.versions = Some(versions);
    }

    /// Record a source's modification time, once per session.
    ///
    /// Returns `true` if the value was stored.
    pub fn record_timestamp(&mut self, source: &SourceId, modified: Timestamp) -> bool {
        if !self.session.sources.insert(source.clone()) {
            return false;
        }
        self.timestamps.insert(source.clone(), modified);
        true
    }

    /// Drop a source's timestamp carried over from the previous session.
    ///
    /// A value already recorded in this session is kept. Returns `true` if
    /// an entry was removed.
    pub fn forget_timestamp(&mut self, source: &SourceId) -> bool {
        if self.session.sources.contains(source) {
            return false;
        }
        self.timestamps.remove(source).is_some()
    }

    /// Record an external module's version token, once per session.
    pub fn record_module_version(&mut self, module: &str, token: &str) -> bool {
        if self.session.modules.contains(module) {
            return false;
        }
        let module: Arc<str> = Arc::from(module);
        self.session.modules.insert(Arc::clone(&module));
        self.module_versions.insert(module, Arc::from(token));
        true
    }

    /// Prepare to record `unit`'s dependencies.
    ///
    /// On the first call for `unit` in this session its previous dependency
    /// set is replaced by an empty one; stale edges from an earlier shape of
    /// the unit never survive a recompile. Returns `true` if it was reset.
    pub fn begin_unit(&mut self, unit: &ClassRef) -> bool {
        if !self.session.units.insert(unit.clone()) {
            return false;
        }
        self.dependencies.insert(unit.clone(), FxHashSet::default());
        true
    }

    /// Union `item` into the dependency set of `owner`.
    pub fn record_dependency(&mut self, owner: &ClassRef, item: DependencyItem) {
        if let Some(set) = self.dependencies.get_mut(owner) {
            set.insert(item);
        } else {
            let mut set = FxHashSet::default();
            set.insert(item);
            self.dependencies.insert(owner.clone(), set);
        }
    }

    /// Drop units and sources that are no longer part of the build.
    ///
    /// Entries recorded in this session are always kept. Module versions
    /// that no kept dependency refers to are dropped as well. Returns the
    /// number of units removed.
    pub fn prune(&mut self, units: &FxHashSet<ClassRef>, sources: &FxHashSet<SourceId>) -> usize {
        let session = &self.session;
        let before = self.dependencies.len();
        self.dependencies
            .retain(|unit, _| units.contains(unit) || session.units.contains(unit));
        self.timestamps
            .retain(|source, _| sources.contains(source) || session.sources.contains(source));

        let referenced: FxHashSet<&str> = self
            .dependencies
            .values()
            .flatten()
            .map(DependencyItem::module_name)
            .collect();
        self.module_versions.retain(|module, _| {
            referenced.contains(&**module) || session.modules.contains(module)
        });

        before - self.dependencies.len()
    }

    /// Forget everything, including the recorded versions.
    pub fn clear(&mut self) {
        self.versions = None;
        self.timestamps.clear();
        self.module_versions.clear();
        self.dependencies.clear();
        self.session = SessionMarks::default();
    }

    pub fn timestamp(&self, source: &SourceId) -> Option<Timestamp> {
        self.timestamps.get(source).copied()
    }

    pub fn module_version(&self, module: &str) -> Option<&str> {
        self.module_versions.get(module).map(|v| &**v)
    }

    /// The recorded dependency set of `unit`, if it was ever recorded.
    pub fn dependencies_of(&self, unit: &ClassRef) -> Option<&FxHashSet<DependencyItem>> {
        self.dependencies.get(unit)
    }

    pub fn timestamps(&self) -> &FxHashMap<SourceId, Timestamp> {
        &self.timestamps
    }

    pub fn module_versions(&self) -> &FxHashMap<Arc<str>, Arc<str>> {
        &self.module_versions
    }

    pub fn dependencies(&self) -> &DependencyMap {
        &self.dependencies
    }

    /// Number of units with a recorded dependency set.
    pub fn unit_count(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
            && self.module_versions.is_empty()
            && self.dependencies.is_empty()
    }
}

/// Contexts compare by their persisted content; session bookkeeping is
/// ignored.
impl PartialEq for PersistentContext {
    fn eq(&self, other: &Self) -> bool {
        self.versions == other.versions
            && self.timestamps == other.timestamps
            && self.module_versions == other.module_versions
            && self.dependencies == other.dependencies
    }
}

impl Eq for PersistentContext {}

#[cfg(test)]
mod tests;
