//! Binary encoding of recorded dependency sets.
//!
//! ```text
//! dependencies := record*
//! record       := owner_module owner_name count item{count}
//! item         := tag:u8 index{tag.string_count()}
//! ```
//!
//! `owner_module`, `owner_name`, `count` and every `index` are unsigned
//! LEB128 varints; indices point into the companion [`StringTable`]. Field
//! and method items carry four indices: owner module, owner name, member
//! name, signature.
//!
//! # Index Deltas
//!
//! Strings enter the table in first-use order, so a string's first use is
//! always the next unseen index. Each index is written as its distance
//! back from that next index:
//!
//! ```text
//! delta = seen - index      seen = distinct strings referenced so far
//! 0      → first use; index = seen, then seen += 1
//! d > 0  → repeat;    index = seen - d
//! ```
//!
//! Owners and items are written in sorted order so identical contexts
//! encode to identical bytes.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use recomp_ir::{ClassRef, DependencyItem, ItemTag};

use crate::codec::{Reader, Writer};
use crate::context::DependencyMap;
use crate::{DecodeError, StringTable};

/// Encode `dependencies`, interning every string into a fresh table.
pub fn encode_dependencies(dependencies: &DependencyMap) -> (StringTable, Vec<u8>) {
    let mut table = StringTable::new();
    let mut w = Writer::new();

    let mut owners: Vec<_> = dependencies.iter().collect();
    owners.sort_unstable_by(|a, b| a.0.cmp(b.0));

    for (owner, items) in owners {
        write_class(&mut w, &mut table, owner);
        w.write_uleb128_usize(items.len());

        let mut items: Vec<_> = items.iter().collect();
        items.sort_unstable();
        for item in items {
            write_item(&mut w, &mut table, item);
        }
    }

    (table, w.into_bytes())
}

fn write_str(w: &mut Writer, table: &mut StringTable, s: &str) {
    let seen = table.len();
    let idx = table.intern(s) as usize;
    w.write_uleb128_usize(seen - idx);
}

fn write_class(w: &mut Writer, table: &mut StringTable, class: &ClassRef) {
    write_str(w, table, class.module());
    write_str(w, table, class.name());
}

fn write_item(w: &mut Writer, table: &mut StringTable, item: &DependencyItem) {
    w.write_u8(item.tag().as_byte());
    match item {
        DependencyItem::Module { name } => write_str(w, table, name),
        DependencyItem::Class(class) => write_class(w, table, class),
        DependencyItem::Field {
            owner,
            name,
            signature,
        }
        | DependencyItem::Method {
            owner,
            name,
            signature,
        } => {
            write_class(w, table, owner);
            write_str(w, table, name);
            write_str(w, table, signature);
        }
    }
}

/// Decode a `dependencies` section against its string table.
pub fn decode_dependencies(
    bytes: &[u8],
    table: &StringTable,
) -> Result<DependencyMap, DecodeError> {
    let mut r = Strings {
        reader: Reader::new(bytes),
        table,
        seen: 0,
    };
    let mut dependencies = DependencyMap::default();

    while !r.reader.is_at_end() {
        let owner = r.read_class()?;
        let count = r.reader.read_uleb128_usize()?;
        // Every item takes at least two bytes; cap the pre-allocation so a
        // corrupt count cannot request an absurd buffer.
        let mut items =
            FxHashSet::with_capacity_and_hasher(count.min(bytes.len() / 2), Default::default());
        for _ in 0..count {
            items.insert(r.read_item()?);
        }
        dependencies.entry(owner).or_default().extend(items);
    }

    Ok(dependencies)
}

/// Decoding state: the byte cursor plus the running string count.
struct Strings<'a> {
    reader: Reader<'a>,
    table: &'a StringTable,
    seen: usize,
}

impl Strings<'_> {
    fn read_str(&mut self) -> Result<Arc<str>, DecodeError> {
        let delta = self.reader.read_uleb128_usize()?;
        let idx = if delta == 0 {
            self.seen += 1;
            self.seen - 1
        } else {
            self.seen
                .checked_sub(delta)
                .ok_or(DecodeError::InvalidStringDelta {
                    delta,
                    seen: self.seen,
                })?
        };
        self.table.get(idx as u64).map(Arc::clone)
    }

    fn read_class(&mut self) -> Result<ClassRef, DecodeError> {
        let module = self.read_str()?;
        let name = self.read_str()?;
        Ok(ClassRef::new(module, name))
    }

    fn read_item(&mut self) -> Result<DependencyItem, DecodeError> {
        let tag = self.reader.read_u8()?;
        let tag = ItemTag::from_byte(tag).ok_or(DecodeError::UnknownTag { tag })?;
        let item = match tag {
            ItemTag::Module => DependencyItem::module(self.read_str()?),
            ItemTag::Class => DependencyItem::class(self.read_class()?),
            ItemTag::Field => {
                let owner = self.read_class()?;
                let name = self.read_str()?;
                DependencyItem::field(owner, name, self.read_str()?)
            }
            ItemTag::Method => {
                let owner = self.read_class()?;
                let name = self.read_str()?;
                DependencyItem::method(owner, name, self.read_str()?)
            }
        };
        Ok(item)
    }
}
