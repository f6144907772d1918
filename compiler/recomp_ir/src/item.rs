//! Dependency items.
//!
//! A [`DependencyItem`] is a normalized, persistable reference from one unit
//! to a module, class, field or method it relied on when it was compiled.
//! The variant set is closed; the wire discriminator of each variant is
//! given by [`ItemTag`].

use std::fmt;
use std::sync::Arc;

/// Identity of one compiled type.
///
/// Both the module and the qualified name participate in equality: the
/// same qualified name may exist in two modules.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassRef {
    module: Arc<str>,
    name: Arc<str>,
}

impl ClassRef {
    /// Create a class reference.
    pub fn new(module: impl Into<Arc<str>>, name: impl Into<Arc<str>>) -> Self {
        ClassRef {
            module: module.into(),
            name: name.into(),
        }
    }

    /// Owning module name.
    #[inline]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Fully qualified type name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module, self.name)
    }
}

/// Something a unit can depend on.
///
/// `signature` is an opaque, erasure-stable string produced by the external
/// type system. It is only ever compared, never parsed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyItem {
    /// An entire external module must exist and be unchanged.
    Module { name: Arc<str> },
    /// A specific compiled type.
    Class(ClassRef),
    /// One field of a type.
    Field {
        owner: ClassRef,
        name: Arc<str>,
        signature: Arc<str>,
    },
    /// One method of a type; the signature disambiguates overloads.
    Method {
        owner: ClassRef,
        name: Arc<str>,
        signature: Arc<str>,
    },
}

impl DependencyItem {
    pub fn module(name: impl Into<Arc<str>>) -> Self {
        DependencyItem::Module { name: name.into() }
    }

    pub fn class(class: ClassRef) -> Self {
        DependencyItem::Class(class)
    }

    pub fn field(
        owner: ClassRef,
        name: impl Into<Arc<str>>,
        signature: impl Into<Arc<str>>,
    ) -> Self {
        DependencyItem::Field {
            owner,
            name: name.into(),
            signature: signature.into(),
        }
    }

    pub fn method(
        owner: ClassRef,
        name: impl Into<Arc<str>>,
        signature: impl Into<Arc<str>>,
    ) -> Self {
        DependencyItem::Method {
            owner,
            name: name.into(),
            signature: signature.into(),
        }
    }

    /// Wire discriminator for this variant.
    #[inline]
    pub fn tag(&self) -> ItemTag {
        match self {
            DependencyItem::Module { .. } => ItemTag::Module,
            DependencyItem::Class(_) => ItemTag::Class,
            DependencyItem::Field { .. } => ItemTag::Field,
            DependencyItem::Method { .. } => ItemTag::Method,
        }
    }

    /// The type this item lives in, if it is class-like.
    pub fn owner_class(&self) -> Option<&ClassRef> {
        match self {
            DependencyItem::Module { .. } => None,
            DependencyItem::Class(class) => Some(class),
            DependencyItem::Field { owner, .. } | DependencyItem::Method { owner, .. } => {
                Some(owner)
            }
        }
    }

    /// Name of the module this item belongs to.
    pub fn module_name(&self) -> &str {
        match self {
            DependencyItem::Module { name } => name,
            DependencyItem::Class(class) => class.module(),
            DependencyItem::Field { owner, .. } | DependencyItem::Method { owner, .. } => {
                owner.module()
            }
        }
    }
}

impl fmt::Display for DependencyItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyItem::Module { name } => write!(f, "module {name}"),
            DependencyItem::Class(class) => write!(f, "class {class}"),
            DependencyItem::Field {
                owner,
                name,
                signature,
            } => write!(f, "field {owner}.{name}: {signature}"),
            DependencyItem::Method {
                owner,
                name,
                signature,
            } => write!(f, "method {owner}.{name}{signature}"),
        }
    }
}

/// One-byte discriminator written ahead of each dependency record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ItemTag {
    Module = 0,
    Class = 1,
    Field = 2,
    Method = 3,
}

impl ItemTag {
    #[inline]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Decode a discriminator byte; unknown bytes yield `None`.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ItemTag::Module),
            1 => Some(ItemTag::Class),
            2 => Some(ItemTag::Field),
            3 => Some(ItemTag::Method),
            _ => None,
        }
    }

    /// Number of string-table indices that follow the discriminator.
    pub const fn string_count(self) -> usize {
        match self {
            ItemTag::Module => 1,
            ItemTag::Class => 2,
            ItemTag::Field | ItemTag::Method => 4,
        }
    }
}
