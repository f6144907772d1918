//! String interning table for the `dependencies` file.
//!
//! Each distinct string is stored once, in first-seen order, and is
//! referenced from the binary section by its 0-based index.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::DecodeError;

#[derive(Clone, Debug, Default)]
pub struct StringTable {
    strings: Vec<Arc<str>>,
    index: FxHashMap<Arc<str>, u32>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from decoded lines, preserving their order.
    pub fn from_strings<I>(strings: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<str>>,
    {
        let mut table = Self::new();
        for s in strings {
            let s: Arc<str> = s.into();
            // Duplicates keep their first index; later copies stay addressable.
            let idx = table.next_index();
            table.index.entry(Arc::clone(&s)).or_insert(idx);
            table.strings.push(s);
        }
        table
    }

    fn next_index(&self) -> u32 {
        u32::try_from(self.strings.len()).unwrap_or(u32::MAX)
    }

    /// Index of `s`, adding it if unseen.
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.next_index();
        let s: Arc<str> = Arc::from(s);
        self.strings.push(Arc::clone(&s));
        self.index.insert(s, idx);
        idx
    }

    /// Resolve an index read from the binary section.
    pub fn get(&self, index: u64) -> Result<&Arc<str>, DecodeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .ok_or(DecodeError::StringIndexOutOfRange {
                index,
                len: self.strings.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Strings in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|s| &**s)
    }
}
