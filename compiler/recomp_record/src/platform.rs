//! The fixed set of platform/system modules.
//!
//! Modules supplied by the runtime, plus the tool's own module, are never
//! part of the user's recompilation domain. Tracking them would make every
//! unit depend on everything, so references into them are dropped.

use rustc_hash::FxHashSet;

#[derive(Clone, Debug, Default)]
pub struct PlatformModules {
    modules: FxHashSet<Box<str>>,
}

impl PlatformModules {
    /// Build the set from the runtime's module list and the tool module.
    pub fn new<I, S>(runtime_modules: I, tool_module: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut modules: FxHashSet<Box<str>> = runtime_modules
            .into_iter()
            .map(|m| Box::from(m.as_ref()))
            .collect();
        modules.insert(Box::from(tool_module));
        tracing::debug!(count = modules.len(), "platform modules");
        PlatformModules { modules }
    }

    /// A set that excludes nothing.
    pub fn none() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
