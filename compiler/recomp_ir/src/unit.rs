//! Unit identities and source timestamps.

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use crate::ClassRef;

/// Identifier of the source a unit was compiled from (usually a path).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(Arc<str>);

impl SourceId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        SourceId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source modification time, in milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(u64);

impl Timestamp {
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }

    #[inline]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Read the modification time of a file.
    ///
    /// Times before the epoch clamp to zero.
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let modified = std::fs::metadata(path)?.modified()?;
        let millis = modified
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        Ok(Timestamp(millis))
    }

    /// Strictly newer; equal timestamps count as unmodified.
    #[inline]
    pub fn is_newer_than(self, recorded: Timestamp) -> bool {
        self.0 > recorded.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit offered to the engine for the current build.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Identity of the compiled type.
    pub class: ClassRef,
    /// Source the unit is compiled from.
    pub source: SourceId,
    /// Current modification time of that source.
    pub modified: Timestamp,
}

impl Candidate {
    pub fn new(class: ClassRef, source: SourceId, modified: Timestamp) -> Self {
        Candidate {
            class,
            source,
            modified,
        }
    }
}

#[cfg(test)]
mod tests;
