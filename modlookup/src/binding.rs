//! Package binding records.
//!
//! A package binding is one of:
//! - **Plain**: one module's own declaration of a package path.
//! - **Split**: the aggregate of plain bindings of the same path contributed
//!   by several modules.
//! - **Problem**: an invalid binding. It always loses to a valid one.
//!
//! Records live in the environment's package arena and refer to each other
//! only through [`PackageId`]s. The plain ↔ split back-references are lookup
//! aids stored as id sets, never ownership.

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::ids::{ModuleId, PackageId, TypeId};
use crate::path::PackagePath;

/// Result of a cached or searched package lookup.
///
/// "Absent" is expressed as `Option::None` around this type; `NotFound` is
/// the sentinel cached once a search has confirmed there is no declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageRef {
    /// Searched, and confirmed there is no such package.
    NotFound,
    /// A package binding (plain, split or problem).
    Package(PackageId),
}

impl PackageRef {
    /// The binding id, if this is not the not-found sentinel.
    pub fn package(self) -> Option<PackageId> {
        match self {
            PackageRef::Package(id) => Some(id),
            PackageRef::NotFound => None,
        }
    }
}

impl From<PackageId> for PackageRef {
    fn from(id: PackageId) -> Self {
        PackageRef::Package(id)
    }
}

/// Shared state of every package binding.
#[derive(Debug, Clone)]
pub struct PackageData {
    /// The package path; equal across all incarnations of a split.
    pub(crate) compound_name: PackagePath,
    /// Enclosing package binding, if any.
    pub(crate) parent: Option<PackageId>,
    /// Module giving this binding its resolution context.
    pub(crate) enclosing_module: ModuleId,
    /// Lazily populated cache of sub-packages by simple name.
    pub(crate) known_packages: HashMap<String, PackageRef>,
    /// Known types by simple name.
    pub(crate) known_types: HashMap<String, TypeId>,
    /// Set by a search that hit a missing type below this package.
    pub(crate) has_missing_type: bool,
    pub(crate) kind: PackageKind,
}

/// The variant-specific part of a package binding.
#[derive(Debug, Clone)]
pub enum PackageKind {
    Plain(PlainPackage),
    Split(SplitPackage),
    Problem,
}

/// State owned by a plain binding.
#[derive(Debug, Clone, Default)]
pub struct PlainPackage {
    /// Whether the module really has a compilation unit in this package, as
    /// opposed to the package only enclosing other packages.
    pub(crate) has_compilation_unit: bool,
    /// Splits wrapping this binding. Only the splits add entries.
    pub(crate) wrapping_splits: IndexSet<PackageId>,
}

/// State owned by a split binding.
#[derive(Debug, Clone, Default)]
pub struct SplitPackage {
    /// Modules contributing an incarnation, in insertion order.
    pub(crate) declaring_modules: IndexSet<ModuleId>,
    /// Contributing plain bindings, deduplicated by identity.
    pub(crate) incarnations: IndexSet<PackageId>,
    /// Single-flight marker for `find_package`.
    pub(crate) current_find: bool,
    /// Last relaxed lookup per simple name, with the incarnation entries it
    /// was combined from. Reused while those entries are unchanged.
    pub(crate) relaxed: HashMap<String, (Vec<PackageRef>, Option<PackageRef>)>,
}

impl PackageData {
    pub(crate) fn plain(
        compound_name: PackagePath,
        parent: Option<PackageId>,
        module: ModuleId,
        has_compilation_unit: bool,
    ) -> Self {
        Self::with_kind(
            compound_name,
            parent,
            module,
            PackageKind::Plain(PlainPackage {
                has_compilation_unit,
                wrapping_splits: IndexSet::new(),
            }),
        )
    }

    pub(crate) fn split(compound_name: PackagePath, parent: Option<PackageId>, primary: ModuleId) -> Self {
        Self::with_kind(compound_name, parent, primary, PackageKind::Split(SplitPackage::default()))
    }

    pub(crate) fn problem(compound_name: PackagePath, parent: Option<PackageId>, module: ModuleId) -> Self {
        Self::with_kind(compound_name, parent, module, PackageKind::Problem)
    }

    fn with_kind(
        compound_name: PackagePath,
        parent: Option<PackageId>,
        enclosing_module: ModuleId,
        kind: PackageKind,
    ) -> Self {
        Self {
            compound_name,
            parent,
            enclosing_module,
            known_packages: HashMap::new(),
            known_types: HashMap::new(),
            has_missing_type: false,
            kind,
        }
    }

    /// The package path.
    pub fn compound_name(&self) -> &PackagePath {
        &self.compound_name
    }

    /// The enclosing package binding.
    pub fn parent(&self) -> Option<PackageId> {
        self.parent
    }

    /// The module giving this binding its resolution context.
    pub fn enclosing_module(&self) -> ModuleId {
        self.enclosing_module
    }

    /// Problem bindings are the only invalid ones.
    pub fn is_valid(&self) -> bool {
        !matches!(self.kind, PackageKind::Problem)
    }

    pub fn is_split(&self) -> bool {
        matches!(self.kind, PackageKind::Split(_))
    }

    pub fn is_plain(&self) -> bool {
        matches!(self.kind, PackageKind::Plain(_))
    }

    /// Whether a lookup below this package hit a missing type.
    pub fn has_missing_type(&self) -> bool {
        self.has_missing_type
    }

    /// Whether the package holds at least one compilation unit. Only plain
    /// bindings can.
    pub fn has_compilation_unit(&self) -> bool {
        match &self.kind {
            PackageKind::Plain(plain) => plain.has_compilation_unit,
            _ => false,
        }
    }

    /// Cached sub-package entry for `name`, without searching.
    pub fn known_package(&self, name: &str) -> Option<PackageRef> {
        self.known_packages.get(name).copied()
    }

    /// Incarnations of a split, in insertion order. Empty for other kinds.
    pub fn incarnations(&self) -> Vec<PackageId> {
        match &self.kind {
            PackageKind::Split(split) => split.incarnations.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Splits currently wrapping a plain binding.
    pub fn wrapping_splits(&self) -> Vec<PackageId> {
        match &self.kind {
            PackageKind::Plain(plain) => plain.wrapping_splits.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn as_split(&self) -> Option<&SplitPackage> {
        match &self.kind {
            PackageKind::Split(split) => Some(split),
            _ => None,
        }
    }

    pub(crate) fn as_split_mut(&mut self) -> Option<&mut SplitPackage> {
        match &mut self.kind {
            PackageKind::Split(split) => Some(split),
            _ => None,
        }
    }

    pub(crate) fn as_plain_mut(&mut self) -> Option<&mut PlainPackage> {
        match &mut self.kind {
            PackageKind::Plain(plain) => Some(plain),
            _ => None,
        }
    }
}

/// A declared type.
#[derive(Debug, Clone)]
pub struct TypeData {
    pub(crate) name: String,
    pub(crate) package: PackageId,
    pub(crate) module: ModuleId,
}

impl TypeData {
    /// Simple name of the type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The plain package declaring the type.
    pub fn package(&self) -> PackageId {
        self.package
    }

    /// The module declaring the type.
    pub fn module(&self) -> ModuleId {
        self.module
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> PackagePath {
        PackagePath::parse(s).unwrap()
    }

    #[test]
    fn test_plain_record() {
        let data = PackageData::plain(path("com.foo"), None, ModuleId::new(0), true);
        assert!(data.is_plain());
        assert!(data.is_valid());
        assert!(data.has_compilation_unit());
        assert!(data.incarnations().is_empty());
    }

    #[test]
    fn test_problem_record_is_invalid() {
        let data = PackageData::problem(path("com.foo"), None, ModuleId::new(0));
        assert!(!data.is_valid());
        assert!(!data.has_compilation_unit());
    }

    #[test]
    fn test_split_record_starts_empty() {
        let data = PackageData::split(path("com.foo"), None, ModuleId::new(1));
        assert!(data.is_split());
        assert!(data.as_split().unwrap().declaring_modules.is_empty());
        assert!(!data.has_compilation_unit());
    }

    #[test]
    fn test_package_ref_accessor() {
        assert_eq!(PackageRef::from(PackageId::new(4)).package(), Some(PackageId::new(4)));
        assert_eq!(PackageRef::NotFound.package(), None);
    }
}
