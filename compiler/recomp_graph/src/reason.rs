//! Why a unit was scheduled for recompilation.

use std::fmt;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use recomp_ir::{Candidate, ClassRef, DependencyItem, Timestamp};

/// The first cause found for marking a unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecompileReason {
    /// Tool or runtime version changed; everything is rebuilt.
    Incompatible,
    /// The unit's source was never timestamped.
    NoTimestamp,
    /// The unit's source is newer than when it was last compiled.
    SourceModified {
        recorded: Timestamp,
        current: Timestamp,
    },
    /// The unit has no recorded dependency set.
    MissingRecord,
    /// A recorded dependency no longer resolves.
    MissingDependency(DependencyItem),
    /// An external module's version token changed.
    DependencyChanged { module: Arc<str> },
    /// A unit it depends on was already marked.
    DependencyMarked(ClassRef),
    /// A unit it transitively depends on is marked.
    Transitive,
}

impl fmt::Display for RecompileReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecompileReason::Incompatible => f.write_str("tool or runtime version changed"),
            RecompileReason::NoTimestamp => f.write_str("source was never timestamped"),
            RecompileReason::SourceModified { recorded, current } => {
                write!(f, "source modified ({recorded} -> {current})")
            }
            RecompileReason::MissingRecord => f.write_str("no recorded dependencies"),
            RecompileReason::MissingDependency(item) => write!(f, "missing dependency {item}"),
            RecompileReason::DependencyChanged { module } => {
                write!(f, "module {module} changed")
            }
            RecompileReason::DependencyMarked(unit) => write!(f, "depends on recompiled {unit}"),
            RecompileReason::Transitive => f.write_str("transitively depends on a recompiled unit"),
        }
    }
}

/// Per-step counters for one computation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InvalidationStats {
    pub candidates: usize,
    pub by_timestamp: usize,
    pub by_dependency: usize,
    pub by_closure: usize,
    /// The compatibility gate failed and every candidate was marked.
    pub incompatible: bool,
}

/// Result of [`InvalidationGraph::compute`](crate::InvalidationGraph::compute).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InvalidationOutcome {
    /// Candidates that must be recompiled.
    pub recompile: FxHashSet<ClassRef>,
    /// Why each of them was marked.
    pub reasons: FxHashMap<ClassRef, RecompileReason>,
    pub stats: InvalidationStats,
}

impl InvalidationOutcome {
    /// Every candidate, marked as incompatible.
    pub fn everything(candidates: &[Candidate]) -> Self {
        let mut outcome = InvalidationOutcome::default();
        for candidate in candidates {
            outcome.recompile.insert(candidate.class.clone());
            outcome
                .reasons
                .insert(candidate.class.clone(), RecompileReason::Incompatible);
        }
        outcome.stats = InvalidationStats {
            candidates: candidates.len(),
            incompatible: true,
            ..InvalidationStats::default()
        };
        outcome
    }

    #[inline]
    pub fn contains(&self, unit: &ClassRef) -> bool {
        self.recompile.contains(unit)
    }

    pub fn reason(&self, unit: &ClassRef) -> Option<&RecompileReason> {
        self.reasons.get(unit)
    }

    pub fn len(&self) -> usize {
        self.recompile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recompile.is_empty()
    }

    /// Marked units in a stable order.
    pub fn sorted(&self) -> Vec<&ClassRef> {
        let mut units: Vec<&ClassRef> = self.recompile.iter().collect();
        units.sort();
        units
    }
}
