//! Opaque symbol identities.
//!
//! Types, methods, members, constructors and dynamic binders are defined by
//! whoever builds the trees. The engines never look inside a symbol: they only
//! ask whether two symbols are the same and for a stable hash of one.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::domain::hashing::fnv1a_str;

/// Caller-defined identity of a type, method, member, constructor or binder.
///
/// `symbol_hash` must agree with `same_symbol`: symbols that are the same
/// must hash identically, and the value must not depend on the process
/// (no randomly seeded hashers), otherwise tree hashes stop being stable.
pub trait Symbol: fmt::Debug + Send + Sync + 'static {
    fn same_symbol(&self, other: &dyn Symbol) -> bool;
    fn symbol_hash(&self) -> u32;
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a [`Symbol`].
#[derive(Clone)]
pub struct Sym(Arc<dyn Symbol>);

pub type TypeRef = Sym;
pub type MethodRef = Sym;
pub type MemberRef = Sym;
pub type CtorRef = Sym;
pub type BinderRef = Sym;

impl Sym {
    pub fn new<S: Symbol>(symbol: S) -> Self {
        Sym(Arc::new(symbol))
    }

    /// Symbol identified by its qualified name alone.
    pub fn named(name: impl Into<String>) -> Self {
        Sym::new(NamedSymbol::new(name))
    }

    pub fn symbol(&self) -> &dyn Symbol {
        &*self.0
    }

    pub fn downcast_ref<T: Symbol>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn hash_code(&self) -> u32 {
        self.0.symbol_hash()
    }
}

impl PartialEq for Sym {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.same_symbol(&*other.0)
    }
}

impl Eq for Sym {}

impl Hash for Sym {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code());
    }
}

impl fmt::Debug for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A symbol whose identity is its qualified name, e.g. `System.Int32` or
/// `System.Math.Max(Int32, Int32)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSymbol {
    name: Arc<str>,
}

impl NamedSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Symbol for NamedSymbol {
    fn same_symbol(&self, other: &dyn Symbol) -> bool {
        other
            .as_any()
            .downcast_ref::<NamedSymbol>()
            .is_some_and(|other| other.name == self.name)
    }

    fn symbol_hash(&self) -> u32 {
        fnv1a_str(&self.name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for NamedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
