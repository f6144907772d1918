//! One build invocation.
//!
//! A session owns the persistent context for the duration of a build. It is
//! loaded when the session opens, consulted by the invalidation graph,
//! mutated by the dependency recorder while units compile, and written back
//! once the build succeeds.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use recomp_diagnostic::{Diagnostic, DiagnosticSink, TracingSink};
use recomp_graph::{Dispatcher, InvalidationGraph, InvalidationOutcome, LiveSymbolTable};
use recomp_ir::{Candidate, ClassRef, SourceId};
use recomp_record::{DependencyRecorder, PlatformModules, SymbolModel};
use recomp_store::{PersistentContext, StateDir, StoreError, Versions};

use crate::SessionConfig;

pub struct BuildSession {
    config: SessionConfig,
    state: StateDir,
    context: PersistentContext,
    dispatcher: Dispatcher,
    diagnostics: Arc<dyn DiagnosticSink>,
    /// Units and sources of the latest invalidation; everything else is
    /// pruned before saving.
    build: Option<(FxHashSet<ClassRef>, FxHashSet<SourceId>)>,
}

impl BuildSession {
    /// Open a session, reporting diagnostics through `tracing`.
    pub fn open(config: SessionConfig) -> Self {
        Self::open_with(config, Arc::new(TracingSink))
    }

    /// Open a session with an explicit diagnostic sink.
    ///
    /// Unreadable state is reported and replaced by an empty context. State
    /// saved by a different tool or runtime version is discarded.
    pub fn open_with(config: SessionConfig, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        let state = StateDir::new(&config.state_root);
        let mut context = state.load_or_empty(&*diagnostics);

        if context.versions().is_some()
            && !context.compatible(&config.tool_version, &config.runtime_version)
        {
            tracing::debug!(
                tool_version = %config.tool_version,
                runtime_version = %config.runtime_version,
                "build state written by another version, starting cold"
            );
            context.clear();
        }

        let dispatcher = Dispatcher::new(config.parallel());
        BuildSession {
            config,
            state,
            context,
            dispatcher,
            diagnostics,
            build: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn context(&self) -> &PersistentContext {
        &self.context
    }

    /// Whether the loaded state can be used incrementally.
    pub fn is_incremental(&self) -> bool {
        self.context
            .compatible(&self.config.tool_version, &self.config.runtime_version)
    }

    /// Units among `candidates` that must be recompiled.
    pub fn compute_recompile_set<L>(&mut self, candidates: &[Candidate], live: &L) -> FxHashSet<ClassRef>
    where
        L: LiveSymbolTable + ?Sized,
    {
        self.invalidate(candidates, live).recompile
    }

    /// [`compute_recompile_set`](Self::compute_recompile_set) with the
    /// reason for every mark.
    ///
    /// `candidates` are taken to be the whole build: units and sources
    /// outside it are dropped from the state saved by
    /// [`on_build_succeeded`](Self::on_build_succeeded).
    pub fn invalidate<L>(&mut self, candidates: &[Candidate], live: &L) -> InvalidationOutcome
    where
        L: LiveSymbolTable + ?Sized,
    {
        self.build = Some((
            candidates.iter().map(|c| c.class.clone()).collect(),
            candidates.iter().map(|c| c.source.clone()).collect(),
        ));
        let graph = InvalidationGraph::new(&self.context, live, &*self.diagnostics, &self.dispatcher);
        graph.compute(
            candidates,
            &self.config.tool_version,
            &self.config.runtime_version,
        )
    }

    /// Recorder the front-end drives while it compiles units.
    pub fn recorder<'s, M: SymbolModel>(
        &'s mut self,
        model: &'s M,
        platform: &'s PlatformModules,
    ) -> DependencyRecorder<'s, M> {
        DependencyRecorder::new(&mut self.context, model, platform)
    }

    /// Persist the context for the next session.
    ///
    /// A failure is reported as a diagnostic and returned; the decisions of
    /// this session stand either way.
    pub fn on_build_succeeded(&mut self) -> Result<(), StoreError> {
        if let Some((units, sources)) = &self.build {
            let pruned = self.context.prune(units, sources);
            tracing::debug!(pruned, "dropped units no longer in the build");
        }
        self.context.set_versions(Versions::new(
            self.config.tool_version.clone(),
            self.config.runtime_version.clone(),
        ));
        self.state.save(&self.context).map_err(|err| {
            self.diagnostics.report(Diagnostic::write_failed(format!(
                "could not save build state: {err}"
            )));
            err
        })
    }
}

impl std::fmt::Debug for BuildSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildSession")
            .field("config", &self.config)
            .field("units", &self.context.unit_count())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
