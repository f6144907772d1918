//! Front-end interface.
//!
//! The recorder never inspects the front-end's symbols directly; it asks
//! the front-end's type/symbol model to classify and normalize them.

use std::fmt;

use recomp_ir::DependencyItem;

/// Syntactic form of a symbol reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// A bare name.
    Identifier,
    /// `receiver.member`
    MemberAccess,
    /// Construction of a new instance.
    Instantiation,
    /// A method or constructor reference used as a value.
    CallableRef,
}

impl ReferenceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReferenceKind::Identifier => "identifier",
            ReferenceKind::MemberAccess => "member access",
            ReferenceKind::Instantiation => "instantiation",
            ReferenceKind::CallableRef => "callable reference",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The front-end's view of its symbols.
///
/// Implemented by whatever processes a unit's syntax and resolves names.
pub trait SymbolModel {
    /// A resolved (or failed-to-resolve) symbol.
    type Symbol;

    /// Module the symbol is declared in, or `None` if it did not resolve.
    fn owning_module<'s>(&'s self, symbol: &'s Self::Symbol) -> Option<&'s str>;

    /// The finest-grained dependency item naming `symbol`.
    ///
    /// `None` for unresolved symbols; they contribute no dependency.
    fn dependency_item(&self, symbol: &Self::Symbol) -> Option<DependencyItem>;

    /// Whether `symbol` is a field with a compile-time constant value.
    ///
    /// Constants are inlined into their users, so a reference to one is
    /// recorded against the type that declares it.
    fn is_constant_field(&self, symbol: &Self::Symbol) -> bool {
        let _ = symbol;
        false
    }

    /// Version token of an external module.
    ///
    /// `None` for modules built from source in this build; their units are
    /// tracked individually instead.
    fn module_version(&self, module: &str) -> Option<String>;
}
