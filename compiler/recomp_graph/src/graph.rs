//! Invalidation graph.
//!
//! Decides which candidate units must be recompiled, given what the last
//! session recorded and what the live symbol table says now.
//!
//! # Steps
//!
//! ```text
//! 0. compatibility gate     versions differ → everything
//! 1. mark_by_timestamp      no timestamp, or source strictly newer
//! 2. mark_by_dependency     missing record / missing item / module changed /
//!                           depends on a unit already marked; else live edges
//! 3. propagate_closure      mark units that reach a marked unit via live edges
//! 4. collect                candidates present in the recompile set
//! ```
//!
//! Steps 1 and 2 evaluate units in arbitrary interleaving on the worker
//! pool, so every structure they share is a concurrent map or set. Step 2
//! alone is order-sensitive: A → B → C is missed if A is evaluated before
//! C gets marked. Step 3 runs only after step 2 has finished and closes that
//! gap.
//!
//! # Cycles
//!
//! Live edges may form cycles. Each closure traversal expands a unit at
//! most once; reaching an already visited unit whose answer is not settled
//! yields a provisional `false` and taints every frame above it. Positive
//! results are always cached, negative results only when untainted. The
//! starting unit's answer is always exact because the traversal covers
//! everything it can reach, and when that answer is `false` every visited
//! unit is settled as `false` too.

use dashmap::{DashMap, DashSet};
use rustc_hash::FxHashSet;

use recomp_diagnostic::{Diagnostic, DiagnosticSink};
use recomp_ir::{Candidate, ClassRef, DependencyItem};
use recomp_store::PersistentContext;

use crate::{
    Dispatcher, InvalidationOutcome, InvalidationStats, LiveSymbolTable, RecompileReason,
    Resolution,
};

pub struct InvalidationGraph<'a, L: LiveSymbolTable + ?Sized> {
    context: &'a PersistentContext,
    live: &'a L,
    diagnostics: &'a dyn DiagnosticSink,
    dispatcher: &'a Dispatcher,
    /// Monotonically growing within one computation.
    recompile: DashSet<ClassRef>,
    reasons: DashMap<ClassRef, RecompileReason>,
    /// `unit → units it depends on` that were unmarked when step 2 saw them.
    live_edges: DashMap<ClassRef, Vec<ClassRef>>,
    resolutions: DashMap<DependencyItem, Resolution>,
    /// Settled closure answers.
    closure: DashMap<ClassRef, bool>,
}

impl<'a, L: LiveSymbolTable + ?Sized> InvalidationGraph<'a, L> {
    pub fn new(
        context: &'a PersistentContext,
        live: &'a L,
        diagnostics: &'a dyn DiagnosticSink,
        dispatcher: &'a Dispatcher,
    ) -> Self {
        InvalidationGraph {
            context,
            live,
            diagnostics,
            dispatcher,
            recompile: DashSet::new(),
            reasons: DashMap::new(),
            live_edges: DashMap::new(),
            resolutions: DashMap::new(),
            closure: DashMap::new(),
        }
    }

    /// Run all steps over `candidates`.
    ///
    /// Starts from a clean slate each time, so repeated calls on the same
    /// inputs give the same answer.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(candidates = candidates.len(), jobs = self.dispatcher.jobs())
    )]
    pub fn compute(
        &self,
        candidates: &[Candidate],
        tool_version: &str,
        runtime_version: &str,
    ) -> InvalidationOutcome {
        self.reset();

        if !self.context.compatible(tool_version, runtime_version) {
            tracing::debug!(tool_version, runtime_version, "incompatible context, rebuilding all");
            return InvalidationOutcome::everything(candidates);
        }

        let stats = InvalidationStats {
            candidates: candidates.len(),
            by_timestamp: self.mark_by_timestamp(candidates),
            by_dependency: self.mark_by_dependency(candidates),
            by_closure: self.propagate_closure(),
            incompatible: false,
        };
        let outcome = self.collect(candidates, stats);
        tracing::debug!(
            marked = outcome.len(),
            by_timestamp = stats.by_timestamp,
            by_dependency = stats.by_dependency,
            by_closure = stats.by_closure,
            "recompile set computed"
        );
        outcome
    }

    /// Step 1. Returns the number of units newly marked.
    pub fn mark_by_timestamp(&self, candidates: &[Candidate]) -> usize {
        self.dispatcher.count(candidates, |candidate| {
            if self.is_marked(&candidate.class) {
                return false;
            }
            let reason = match self.context.timestamp(&candidate.source) {
                None => RecompileReason::NoTimestamp,
                Some(recorded) if candidate.modified.is_newer_than(recorded) => {
                    RecompileReason::SourceModified {
                        recorded,
                        current: candidate.modified,
                    }
                }
                Some(_) => return false,
            };
            self.mark(&candidate.class, reason)
        })
    }

    /// Step 2. Returns the number of units newly marked.
    pub fn mark_by_dependency(&self, candidates: &[Candidate]) -> usize {
        self.dispatcher.count(candidates, |candidate| {
            if self.is_marked(&candidate.class) {
                return false;
            }
            match self.check_dependencies(&candidate.class) {
                Some(reason) => self.mark(&candidate.class, reason),
                None => false,
            }
        })
    }

    /// Step 3. Returns the number of units newly marked.
    ///
    /// Must only run once step 2 has completed for every unit.
    pub fn propagate_closure(&self) -> usize {
        let starts: Vec<ClassRef> = self
            .live_edges
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        self.dispatcher.count(&starts, |unit| {
            !self.is_marked(unit)
                && self.reaches_marked(unit)
                && self.mark(unit, RecompileReason::Transitive)
        })
    }

    /// Whether `unit` is in the recompile set.
    #[inline]
    pub fn is_marked(&self, unit: &ClassRef) -> bool {
        self.recompile.contains(unit)
    }

    fn reset(&self) {
        self.recompile.clear();
        self.reasons.clear();
        self.live_edges.clear();
        self.resolutions.clear();
        self.closure.clear();
    }

    /// Add `unit` to the recompile set. Only the first caller wins and gets
    /// its reason stored.
    fn mark(&self, unit: &ClassRef, reason: RecompileReason) -> bool {
        if !self.recompile.insert(unit.clone()) {
            return false;
        }
        tracing::trace!(unit = %unit, reason = %reason, "marked");
        self.reasons.insert(unit.clone(), reason);
        true
    }

    /// First positive mark among `unit`'s recorded dependencies, if any.
    ///
    /// With no mark, the unit's edges to still-unmarked units are kept for
    /// the closure step.
    fn check_dependencies(&self, unit: &ClassRef) -> Option<RecompileReason> {
        let Some(recorded) = self.context.dependencies_of(unit) else {
            self.diagnostics.report(Diagnostic::missing_record(format!(
                "{unit} has no recorded dependencies; recompiling it"
            )));
            return Some(RecompileReason::MissingRecord);
        };

        let mut edges = Vec::new();
        for item in recorded {
            match self.resolve(item) {
                Resolution::Missing => {
                    return Some(RecompileReason::MissingDependency(item.clone()));
                }
                Resolution::Module { name, version } => {
                    // A version never recorded is a change.
                    if self.context.module_version(&name) != Some(&*version) {
                        return Some(RecompileReason::DependencyChanged { module: name });
                    }
                }
                Resolution::Unit(dependency) => {
                    if dependency == *unit {
                        continue;
                    }
                    if self.is_marked(&dependency) {
                        return Some(RecompileReason::DependencyMarked(dependency));
                    }
                    edges.push(dependency);
                }
            }
        }

        if !edges.is_empty() {
            edges.sort();
            edges.dedup();
            self.live_edges.insert(unit.clone(), edges);
        }
        None
    }

    /// Resolve against the live table, at most once per distinct item.
    fn resolve(&self, item: &DependencyItem) -> Resolution {
        if let Some(hit) = self.resolutions.get(item) {
            return hit.value().clone();
        }
        self.resolutions
            .entry(item.clone())
            .or_insert_with(|| self.live.resolve(item))
            .value()
            .clone()
    }

    /// Settled answer for `unit`, without traversing.
    fn settled(&self, unit: &ClassRef) -> Option<bool> {
        if self.is_marked(unit) {
            return Some(true);
        }
        self.closure.get(unit).map(|cached| *cached.value())
    }

    fn edges_of(&self, unit: &ClassRef) -> Vec<ClassRef> {
        self.live_edges
            .get(unit)
            .map(|edges| edges.value().clone())
            .unwrap_or_default()
    }

    /// Whether any unit reachable from `start` over live edges is marked.
    ///
    /// Iterative depth-first search; long chains never grow the call stack.
    /// Each unit is expanded at most once per search.
    fn reaches_marked(&self, start: &ClassRef) -> bool {
        if let Some(answer) = self.settled(start) {
            return answer;
        }

        let mut visited: FxHashSet<ClassRef> = FxHashSet::default();
        visited.insert(start.clone());
        let mut stack = vec![Frame::new(start.clone(), self.edges_of(start))];

        while let Some(frame) = stack.last_mut() {
            if let Some(dependency) = frame.next_dependency() {
                match self.settled(&dependency) {
                    Some(true) => frame.found = true,
                    Some(false) => {}
                    // On the path, or finished with a provisional answer.
                    None if visited.contains(&dependency) => frame.tainted = true,
                    None => {
                        visited.insert(dependency.clone());
                        let edges = self.edges_of(&dependency);
                        stack.push(Frame::new(dependency, edges));
                    }
                }
                continue;
            }

            let Some(done) = stack.pop() else { break };
            if done.found {
                self.closure.insert(done.unit.clone(), true);
            } else if !done.tainted {
                self.closure.insert(done.unit.clone(), false);
            }

            match stack.last_mut() {
                Some(parent) => {
                    parent.found |= done.found;
                    parent.tainted |= done.tainted && !done.found;
                }
                None if done.found => return true,
                None => break,
            }
        }

        // Nothing reachable from `start` is marked, and everything visited
        // reaches only visited units.
        for unit in visited {
            self.closure.insert(unit, false);
        }
        false
    }

    /// Step 4.
    fn collect(&self, candidates: &[Candidate], stats: InvalidationStats) -> InvalidationOutcome {
        let mut outcome = InvalidationOutcome {
            stats,
            ..InvalidationOutcome::default()
        };
        for candidate in candidates {
            let unit = &candidate.class;
            if !self.is_marked(unit) {
                continue;
            }
            outcome.recompile.insert(unit.clone());
            if let Some(reason) = self.reasons.get(unit) {
                outcome.reasons.insert(unit.clone(), reason.value().clone());
            }
        }
        outcome
    }
}

/// One unit on the closure search path.
struct Frame {
    unit: ClassRef,
    dependencies: Vec<ClassRef>,
    next: usize,
    found: bool,
    tainted: bool,
}

impl Frame {
    fn new(unit: ClassRef, dependencies: Vec<ClassRef>) -> Self {
        Frame {
            unit,
            dependencies,
            next: 0,
            found: false,
            tainted: false,
        }
    }

    /// Next edge to follow; none once a marked unit was found.
    fn next_dependency(&mut self) -> Option<ClassRef> {
        if self.found {
            return None;
        }
        let dependency = self.dependencies.get(self.next)?.clone();
        self.next += 1;
        Some(dependency)
    }
}
