//! On-disk layout of the persisted context.
//!
//! ```text
//! <state root>/
//! ├── runtime-version    # runtime version line, tool version line
//! ├── timestamps         # source:millis
//! ├── module-versions    # module:token
//! ├── string-table       # one string per line, order-significant
//! └── dependencies       # binary, see `dependencies`
//! ```
//!
//! # Torn Writes
//!
//! Every file is written to a `.tmp` sibling, synced, then renamed into
//! place. `runtime-version` is removed before anything else is replaced and
//! is renamed in last, so an interrupted save leaves a directory without a
//! version file, which loads as "no prior state".

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use recomp_diagnostic::{Diagnostic, DiagnosticSink};
use recomp_ir::{SourceId, Timestamp};

use crate::context::{PersistentContext, Versions};
use crate::dependencies::{decode_dependencies, encode_dependencies};
use crate::lines::{escape, read_entries, read_lines, unescape, write_entries, write_lines};
use crate::{DecodeError, StoreError, StringTable};

pub const RUNTIME_VERSION_FILE: &str = "runtime-version";
pub const TIMESTAMPS_FILE: &str = "timestamps";
pub const MODULE_VERSIONS_FILE: &str = "module-versions";
pub const STRING_TABLE_FILE: &str = "string-table";
pub const DEPENDENCIES_FILE: &str = "dependencies";

/// A build-state directory.
#[derive(Clone, Debug)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        StateDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Load the previous session's context.
    ///
    /// `Ok(None)` means there is no prior state: the root or its
    /// `runtime-version` file does not exist.
    #[tracing::instrument(level = "debug", skip_all, fields(root = %self.root.display()))]
    pub fn load(&self) -> Result<Option<PersistentContext>, StoreError> {
        let Some(versions) = self.read_versions()? else {
            tracing::debug!("no prior build state");
            return Ok(None);
        };

        let timestamps = self.read_timestamps()?;
        let module_versions = self.read_module_versions()?;

        let table_path = self.file(STRING_TABLE_FILE);
        let table_text = read_text(&table_path)?;
        let table = StringTable::from_strings(
            read_lines(&table_text).map_err(|e| StoreError::decode(&table_path, e))?,
        );

        let deps_path = self.file(DEPENDENCIES_FILE);
        let bytes = fs::read(&deps_path).map_err(|e| StoreError::io(&deps_path, e))?;
        let dependencies =
            decode_dependencies(&bytes, &table).map_err(|e| StoreError::decode(&deps_path, e))?;

        tracing::debug!(
            sources = timestamps.len(),
            modules = module_versions.len(),
            units = dependencies.len(),
            "loaded build state"
        );

        Ok(Some(PersistentContext::from_parts(
            versions,
            timestamps,
            module_versions,
            dependencies,
        )))
    }

    /// Load the previous context, or an empty one.
    ///
    /// Malformed or unreadable state is reported to `diagnostics` and
    /// discarded; the caller proceeds as on a first run.
    pub fn load_or_empty(&self, diagnostics: &dyn DiagnosticSink) -> PersistentContext {
        match self.load() {
            Ok(Some(context)) => context,
            Ok(None) => PersistentContext::new(),
            Err(err) => {
                diagnostics.report(Diagnostic::corrupt_state(format!(
                    "discarding build state: {err}"
                )));
                PersistentContext::new()
            }
        }
    }

    fn read_versions(&self) -> Result<Option<Versions>, StoreError> {
        let path = self.file(RUNTIME_VERSION_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                return Err(StoreError::decode(&path, DecodeError::InvalidUtf8))
            }
            Err(err) => return Err(StoreError::io(&path, err)),
        };

        let mut lines = text.lines();
        let runtime = lines
            .next()
            .ok_or_else(|| StoreError::MissingVersionLine { file: path.clone() })?;
        let tool = lines
            .next()
            .ok_or_else(|| StoreError::MissingVersionLine { file: path.clone() })?;
        let runtime = unescape(runtime, 1).map_err(|e| StoreError::decode(&path, e))?;
        let tool = unescape(tool, 2).map_err(|e| StoreError::decode(&path, e))?;
        Ok(Some(Versions::new(tool, runtime)))
    }

    fn read_timestamps(&self) -> Result<FxHashMap<SourceId, Timestamp>, StoreError> {
        let path = self.file(TIMESTAMPS_FILE);
        let text = read_text(&path)?;
        let entries = read_entries(&text).map_err(|e| StoreError::decode(&path, e))?;

        let mut timestamps = FxHashMap::default();
        for (line, (source, value)) in entries.into_iter().enumerate() {
            let millis = value.parse::<u64>().map_err(|_| {
                StoreError::decode(
                    &path,
                    DecodeError::MalformedLine {
                        line: line + 1,
                        reason: "timestamp is not a number",
                    },
                )
            })?;
            timestamps.insert(SourceId::new(source), Timestamp::from_millis(millis));
        }
        Ok(timestamps)
    }

    fn read_module_versions(&self) -> Result<FxHashMap<Arc<str>, Arc<str>>, StoreError> {
        let path = self.file(MODULE_VERSIONS_FILE);
        let text = read_text(&path)?;
        let entries = read_entries(&text).map_err(|e| StoreError::decode(&path, e))?;
        Ok(entries
            .into_iter()
            .map(|(module, token)| (Arc::from(module), Arc::from(token)))
            .collect())
    }

    /// Persist `context` for the next session.
    ///
    /// A context without recorded versions is saved without a
    /// `runtime-version` file and will load as "no prior state".
    #[tracing::instrument(level = "debug", skip_all, fields(root = %self.root.display()))]
    pub fn save(&self, context: &PersistentContext) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))?;

        let version_path = self.file(RUNTIME_VERSION_FILE);
        match fs::remove_file(&version_path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(StoreError::io(&version_path, err)),
        }

        let mut timestamps: Vec<_> = context.timestamps().iter().collect();
        timestamps.sort_unstable();
        let timestamps = write_entries(
            timestamps
                .into_iter()
                .map(|(source, ts)| (source.as_str(), ts.as_millis().to_string())),
        );
        self.write_atomic(TIMESTAMPS_FILE, timestamps.as_bytes())?;

        let mut modules: Vec<_> = context.module_versions().iter().collect();
        modules.sort_unstable();
        let modules = write_entries(
            modules
                .into_iter()
                .map(|(module, token)| (&**module, token.to_string())),
        );
        self.write_atomic(MODULE_VERSIONS_FILE, modules.as_bytes())?;

        let (table, bytes) = encode_dependencies(context.dependencies());
        self.write_atomic(STRING_TABLE_FILE, write_lines(table.iter()).as_bytes())?;
        self.write_atomic(DEPENDENCIES_FILE, &bytes)?;

        if let Some(versions) = context.versions() {
            let text = format!(
                "{}\n{}\n",
                escape(&versions.runtime),
                escape(&versions.tool)
            );
            self.write_atomic(RUNTIME_VERSION_FILE, text.as_bytes())?;
        }

        tracing::debug!(
            units = context.unit_count(),
            strings = table.len(),
            "saved build state"
        );
        Ok(())
    }

    fn write_atomic(&self, name: &str, contents: &[u8]) -> Result<(), StoreError> {
        let target = self.file(name);
        let tmp = self.file(&format!("{name}.tmp"));

        let write = || -> io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(contents)?;
            file.sync_all()
        };
        if let Err(err) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(&tmp, err));
        }
        fs::rename(&tmp, &target).map_err(|e| StoreError::io(&target, e))
    }
}

fn read_text(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::InvalidData {
            StoreError::decode(path, DecodeError::InvalidUtf8)
        } else {
            StoreError::io(path, e)
        }
    })
}

#[cfg(test)]
mod tests;
