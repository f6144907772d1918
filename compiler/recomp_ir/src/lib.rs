//! Recomp IR - Dependency Item Model
//!
//! The closed set of value types the incremental recompilation engine
//! reasons about:
//! - [`ClassRef`]: identity of one compiled unit (module + qualified name)
//! - [`DependencyItem`]: something a unit can depend on (module, class,
//!   field, method)
//! - [`SourceId`] / [`Timestamp`]: where a unit came from and when it last
//!   changed
//! - [`Candidate`]: a unit offered to the engine for a build
//!
//! # Design Philosophy
//!
//! Every type is immutable and compared structurally. Strings are held as
//! `Arc<str>` so items can be cloned into concurrent sets and maps without
//! copying their contents.

mod item;
mod unit;

pub use item::{ClassRef, DependencyItem, ItemTag};
pub use unit::{Candidate, SourceId, Timestamp};
