//! Recomp Record - Dependency Recorder
//!
//! Consumes the symbol references a front-end surfaces while it processes a
//! unit, drops references into platform modules, normalizes the rest into
//! [`DependencyItem`](recomp_ir::DependencyItem)s, and appends them to the
//! [`PersistentContext`](recomp_store::PersistentContext) for that unit.
//!
//! # Architecture
//!
//! ```text
//! front-end ──on_unit_start / on_symbol_reference──→ DependencyRecorder
//!                                                       │  SymbolModel (normalize, classify)
//!                                                       │  PlatformModules (filter)
//!                                                       ↓
//!                                              PersistentContext
//! ```

mod model;
mod platform;
mod recorder;

pub use model::{ReferenceKind, SymbolModel};
pub use platform::PlatformModules;
pub use recorder::{DependencyRecorder, RecorderStats};
