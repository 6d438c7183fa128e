//! Stable identifiers for lookup entities.
//!
//! Every module, package binding and type lives in an arena owned by the
//! [`LookupEnvironment`](crate::LookupEnvironment). These ids are the only
//! handles the rest of the crate passes around, so equality on them is
//! identity equality:
//! - [`ModuleId`] - a node of the module graph
//! - [`PackageId`] - a plain, split or problem package binding
//! - [`TypeId`] - a declared type

use std::fmt;

/// Identifier of a module in the lookup environment.
///
/// Two modules with identical names still get distinct ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    /// Environment-local index for this module.
    pub index: u32,
}

impl ModuleId {
    /// Create a new ModuleId with the given index.
    pub const fn new(index: u32) -> Self {
        Self { index }
    }

    /// The index of this module.
    pub const fn index(self) -> u32 {
        self.index
    }

    pub(crate) fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.index)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mod{}", self.index)
    }
}

/// Identifier of a package binding.
///
/// Plain bindings from different modules never share an id, even when their
/// compound names are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId {
    /// Environment-local index for this binding.
    pub index: u32,
}

impl PackageId {
    /// Create a new PackageId with the given index.
    pub const fn new(index: u32) -> Self {
        Self { index }
    }

    /// The index of this binding.
    pub const fn index(self) -> u32 {
        self.index
    }

    pub(crate) fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackageId({})", self.index)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pkg{}", self.index)
    }
}

/// Identifier of a declared type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId {
    /// Environment-local index for this type.
    pub index: u32,
}

impl TypeId {
    /// Create a new TypeId with the given index.
    pub const fn new(index: u32) -> Self {
        Self { index }
    }

    /// The index of this type.
    pub const fn index(self) -> u32 {
        self.index
    }

    pub(crate) fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.index)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type{}", self.index)
    }
}
