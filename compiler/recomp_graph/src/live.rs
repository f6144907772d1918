//! The current session's symbol table, as seen by the invalidation graph.

use std::sync::Arc;

use recomp_ir::{ClassRef, DependencyItem};

/// What a recorded [`DependencyItem`] resolves to right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The item no longer exists.
    Missing,
    /// An external module, with its current version token.
    Module { name: Arc<str>, version: Arc<str> },
    /// A unit of this build. Fields and methods resolve to their owner.
    Unit(ClassRef),
}

/// Lookup service over the live symbol table.
///
/// Called concurrently from worker threads.
pub trait LiveSymbolTable: Sync {
    fn resolve(&self, item: &DependencyItem) -> Resolution;
}

impl<T: LiveSymbolTable + ?Sized> LiveSymbolTable for &T {
    fn resolve(&self, item: &DependencyItem) -> Resolution {
        (**self).resolve(item)
    }
}
