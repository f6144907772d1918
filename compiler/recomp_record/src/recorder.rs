//! Dependency recorder.
//!
//! Driven by the front-end while it processes one unit at a time:
//!
//! ```text
//! on_unit_start(Widget, "src/Widget.java", mtime)
//!   → record_timestamp, reset Widget's dependency set
//! on_symbol_reference(MemberAccess, Shape.area)
//!   → owning module "base" is not a platform module
//!   → normalize to Method(base/Shape, area, ()D)
//!   → record base's version token (once), union into Widget's set
//! on_unit_end()
//! ```

use std::path::Path;

use rustc_hash::FxHashSet;

use recomp_ir::{ClassRef, DependencyItem, SourceId, Timestamp};
use recomp_store::PersistentContext;

use crate::{PlatformModules, ReferenceKind, SymbolModel};

/// Counters for one recorder's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecorderStats {
    /// Units entered.
    pub units: usize,
    /// References recorded as dependencies.
    pub recorded: usize,
    /// References into platform modules.
    pub platform: usize,
    /// References that did not resolve.
    pub unresolved: usize,
}

/// Appends normalized dependency items to the context for the current unit.
pub struct DependencyRecorder<'a, M: SymbolModel> {
    context: &'a mut PersistentContext,
    model: &'a M,
    platform: &'a PlatformModules,
    current: Option<ClassRef>,
    /// Modules whose version has already been asked for.
    versioned: FxHashSet<Box<str>>,
    stats: RecorderStats,
}

impl<'a, M: SymbolModel> DependencyRecorder<'a, M> {
    pub fn new(
        context: &'a mut PersistentContext,
        model: &'a M,
        platform: &'a PlatformModules,
    ) -> Self {
        DependencyRecorder {
            context,
            model,
            platform,
            current: None,
            versioned: FxHashSet::default(),
            stats: RecorderStats::default(),
        }
    }

    /// Enter `unit`'s top-level definition.
    ///
    /// Records the source timestamp, then discards whatever dependency set
    /// the unit had before; a recompile replaces, never merges with, the
    /// previous record.
    pub fn on_unit_start(
        &mut self,
        unit: &ClassRef,
        source: &SourceId,
        modified: impl FnOnce() -> Timestamp,
    ) {
        self.context.record_timestamp(source, modified());
        self.enter(unit);
    }

    /// [`on_unit_start`](Self::on_unit_start) reading the timestamp from
    /// the source file.
    ///
    /// If the file cannot be read, any timestamp carried over from the
    /// previous session is dropped, so the next session sees the unit as
    /// never timestamped and recompiles it.
    pub fn on_unit_start_from_file(&mut self, unit: &ClassRef, path: &Path) {
        let source = SourceId::new(path.to_string_lossy());
        match Timestamp::of_file(path) {
            Ok(modified) => {
                self.context.record_timestamp(&source, modified);
            }
            Err(err) => {
                let forgotten = self.context.forget_timestamp(&source);
                tracing::debug!(unit = %unit, error = %err, forgotten, "no timestamp for unit source");
            }
        }
        self.enter(unit);
    }

    fn enter(&mut self, unit: &ClassRef) {
        let reset = self.context.begin_unit(unit);
        tracing::trace!(unit = %unit, reset, "unit start");
        self.current = Some(unit.clone());
        self.stats.units += 1;
    }

    /// Leave the current unit; references until the next start are ignored.
    pub fn on_unit_end(&mut self) {
        self.current = None;
    }

    /// The unit references are currently attributed to.
    pub fn current_unit(&self) -> Option<&ClassRef> {
        self.current.as_ref()
    }

    /// Handle one symbol reference inside the current unit.
    pub fn on_symbol_reference(&mut self, kind: ReferenceKind, symbol: &M::Symbol) {
        let model = self.model;
        let Some(unit) = self.current.as_ref() else {
            tracing::trace!(%kind, "reference outside of a unit");
            return;
        };

        let Some(module) = model.owning_module(symbol) else {
            self.stats.unresolved += 1;
            return;
        };
        if self.platform.contains(module) {
            self.stats.platform += 1;
            return;
        }

        let Some(item) = self.normalize(symbol) else {
            self.stats.unresolved += 1;
            return;
        };
        // References to the unit's own members carry no cross-unit edge.
        if item.owner_class() == Some(unit) {
            return;
        }

        if !self.versioned.contains(module) {
            self.versioned.insert(Box::from(module));
            if let Some(token) = model.module_version(module) {
                self.context.record_module_version(module, &token);
            }
        }

        tracing::trace!(unit = %unit, %kind, dependency = %item, "record dependency");
        self.context.record_dependency(unit, item);
        self.stats.recorded += 1;
    }

    fn normalize(&self, symbol: &M::Symbol) -> Option<DependencyItem> {
        match self.model.dependency_item(symbol)? {
            DependencyItem::Field { owner, .. } if self.model.is_constant_field(symbol) => {
                Some(DependencyItem::class(owner))
            }
            item => Some(item),
        }
    }

    pub fn stats(&self) -> RecorderStats {
        self.stats
    }
}
