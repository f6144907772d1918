//! Build session configuration.

use std::path::PathBuf;

use recomp_graph::ParallelConfig;

/// Configuration for one build session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory the build state is loaded from and saved to.
    pub state_root: PathBuf,
    /// Version of the compiling tool; part of the compatibility gate.
    pub tool_version: String,
    /// Version of the runtime the tool runs on; part of the compatibility gate.
    pub runtime_version: String,
    /// Worker threads for invalidation (0 = auto-detect).
    pub jobs: usize,
}

impl SessionConfig {
    /// Create a new session configuration.
    #[must_use]
    pub fn new(state_root: impl Into<PathBuf>) -> Self {
        Self {
            state_root: state_root.into(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            runtime_version: "unknown".to_string(),
            jobs: 0,
        }
    }

    /// Set the tool version.
    #[must_use]
    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = version.into();
        self
    }

    /// Set the runtime version.
    #[must_use]
    pub fn with_runtime_version(mut self, version: impl Into<String>) -> Self {
        self.runtime_version = version.into();
        self
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Worker pool settings derived from `jobs`.
    pub fn parallel(&self) -> ParallelConfig {
        ParallelConfig::new(self.jobs)
    }
}

#[cfg(test)]
mod tests;
