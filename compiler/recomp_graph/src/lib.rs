//! Recomp Graph - Invalidation Graph
//!
//! Computes the set of units that must be recompiled in this build from
//! the previous session's [`PersistentContext`](recomp_store::PersistentContext)
//! and the current session's [`LiveSymbolTable`].
//!
//! # Architecture
//!
//! ```text
//! PersistentContext ─┐
//! LiveSymbolTable ───┼─→ InvalidationGraph::compute ─→ InvalidationOutcome
//! candidates ────────┘        │
//!                             └─ Dispatcher (rayon pool, join barrier)
//! ```

mod graph;
mod live;
mod parallel;
mod reason;

pub use graph::InvalidationGraph;
pub use live::{LiveSymbolTable, Resolution};
pub use parallel::{Dispatcher, ParallelConfig};
pub use reason::{InvalidationOutcome, InvalidationStats, RecompileReason};
