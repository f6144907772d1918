//! Recomp - Incremental Recompilation Engine
//!
//! Decides, for a multi-unit compiler, which units must be recompiled in a
//! build. Each build is one [`BuildSession`]:
//!
//! ```text
//! BuildSession::open              load <state root>, cold-start on version change
//!   compute_recompile_set         invalidation graph over the candidates
//!   recorder                      front-end records timestamps and dependencies
//!   on_build_succeeded            persist the context for the next build
//! ```
//!
//! The engine never fails a build. Corrupt or unwritable state only costs
//! incrementality and is surfaced through a
//! [`DiagnosticSink`](recomp_diagnostic::DiagnosticSink).

use std::sync::Once;

mod config;
mod session;

pub use config::SessionConfig;
pub use session::BuildSession;

pub use recomp_diagnostic::{
    CollectingSink, Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink,
};
pub use recomp_graph::{
    InvalidationOutcome, InvalidationStats, LiveSymbolTable, ParallelConfig, RecompileReason,
    Resolution,
};
pub use recomp_ir::{Candidate, ClassRef, DependencyItem, SourceId, Timestamp};
pub use recomp_record::{
    DependencyRecorder, PlatformModules, RecorderStats, ReferenceKind, SymbolModel,
};
pub use recomp_store::{PersistentContext, StoreError, Versions};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=recomp=debug` or `RUST_LOG=recomp_graph=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
