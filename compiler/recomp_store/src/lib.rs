//! Recomp Store - Persistent Build Context
//!
//! The mutable store of what the previous build learned, and its versioned
//! on-disk format:
//! - [`PersistentContext`]: timestamps, module versions, per-unit dependency
//!   sets, and the compatibility gate
//! - [`StateDir`]: the directory of files a context is saved to and loaded
//!   from
//! - [`encode_dependencies`] / [`decode_dependencies`]: the binary
//!   dependency section and its [`StringTable`]
//!
//! Loading never fails a build: [`StateDir::load_or_empty`] turns any
//! malformed state into a diagnostic plus an empty context.

pub mod codec;
mod context;
mod dependencies;
mod error;
pub mod lines;
mod state_dir;
mod string_table;

pub use context::{DependencyMap, PersistentContext, Versions};
pub use dependencies::{decode_dependencies, encode_dependencies};
pub use error::{DecodeError, StoreError};
pub use state_dir::{
    StateDir, DEPENDENCIES_FILE, MODULE_VERSIONS_FILE, RUNTIME_VERSION_FILE, STRING_TABLE_FILE,
    TIMESTAMPS_FILE,
};
pub use string_table::StringTable;
