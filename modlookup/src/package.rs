//! Package binding operations dispatched on the binding kind.
//!
//! Plain and problem bindings only ever consult their own caches. Splits
//! route to the merge logic in [`crate::split`].

use crate::binding::PackageRef;
use crate::environment::LookupEnvironment;
use crate::error::TypeLookupError;
use crate::ids::{ModuleId, PackageId, TypeId};

impl LookupEnvironment {
    /// Cached lookup of the sub-package `name` of `package`.
    ///
    /// `None` means nothing is known yet. For a split this is the strict
    /// lookup: every incarnation must have an answer.
    pub fn get_package0(&mut self, package: PackageId, name: &str) -> Option<PackageRef> {
        if self.package(package).is_split() {
            return self.split_get_package0(package, name);
        }
        self.package(package).known_package(name)
    }

    /// Cached lookup that tolerates incarnations without an answer. The
    /// result is never cached.
    pub fn get_package0_any(&mut self, package: PackageId, name: &str) -> Option<PackageRef> {
        if self.package(package).is_split() {
            return self.split_get_package0_any(package, name);
        }
        self.package(package).known_package(name)
    }

    /// Register `child` as a sub-package of `parent` and return the binding
    /// actually stored for it.
    pub fn add_package(&mut self, parent: PackageId, child: PackageId, module: ModuleId) -> PackageId {
        if self.package(parent).is_split() {
            return self.split_add_package(parent, child, module);
        }
        let name = self.package(child).compound_name.simple_name().to_string();
        self.package_mut(parent)
            .known_packages
            .insert(name, PackageRef::Package(child));
        child
    }

    /// Record that `package` has no sub-package `name`.
    pub fn add_not_found_package(&mut self, package: PackageId, name: &str) {
        self.package_mut(package)
            .known_packages
            .insert(name.to_string(), PackageRef::NotFound);
    }

    /// Sub-package `name` of `parent` as seen by `module`.
    ///
    /// The cache is consulted first. On a miss a split runs the full
    /// cross-module search, and a plain binding resolves the child path
    /// against `module`'s visible packages. A plain binding's cache holds
    /// its owner's view, so other modules bypass it and never write to it.
    pub fn get_package(&mut self, parent: PackageId, name: &str, module: ModuleId) -> Option<PackageId> {
        let data = self.package(parent);
        if data.is_split() {
            if let Some(known) = self.get_package0(parent, name) {
                return known.package();
            }
            return self.find_package(parent, name, module);
        }
        if !data.is_valid() {
            return None;
        }

        let owned = data.enclosing_module == module;
        if owned {
            if let Some(known) = data.known_package(name) {
                return known.package();
            }
        }

        let child_path = data.compound_name.child(name);
        let found = self.visible_package(module, &child_path).and_then(PackageRef::package);
        if owned && self.package(parent).known_package(name).is_none() {
            match found {
                Some(found) => {
                    self.add_package(parent, found, module);
                }
                None => self.add_not_found_package(parent, name),
            }
        }
        found
    }

    /// Type `name` known to `package` itself. A split never holds types of
    /// its own.
    pub fn get_type0(&self, package: PackageId, name: &str) -> Option<TypeId> {
        self.package(package).known_types.get(name).copied()
    }

    /// Whether `package`, or any of its incarnations, knows the type `name`.
    pub fn has_type0_any(&self, package: PackageId, name: &str) -> bool {
        if self.package(package).is_split() {
            return self.split_has_type0_any(package, name);
        }
        self.get_type0(package, name).is_some()
    }

    /// Type `name` as declared by `module`'s own contribution to `package`.
    pub fn get_type0_for_module(&self, package: PackageId, module: ModuleId, name: &str) -> Option<TypeId> {
        if !self.is_declared_in(package, module) {
            return None;
        }
        let incarnation = self.get_incarnation(package, module)?;
        self.get_type0(incarnation, name)
    }

    /// Type `name` in `package` on behalf of `module`.
    ///
    /// Only a split can fail: see
    /// [`TypeLookupError`] for the two ways it does. Accessibility of a plain
    /// package is left to the caller.
    pub fn get_type(&self, package: PackageId, name: &str, module: ModuleId) -> Result<Option<TypeId>, TypeLookupError> {
        if self.package(package).is_split() {
            return self.split_get_type(package, name, module);
        }
        Ok(self.get_type0(package, name))
    }

    /// The binding `client` should see for `package`.
    ///
    /// Plain and problem bindings are returned unchanged.
    pub fn get_visible_for(&self, package: PackageId, client: ModuleId, prefer_local: bool) -> Option<PackageId> {
        if self.package(package).is_split() {
            return self.split_get_visible_for(package, client, prefer_local);
        }
        Some(package)
    }
}

#[cfg(test)]
mod tests {
    use crate::binding::PackageRef;
    use crate::environment::LookupEnvironment;
    use crate::path::PackagePath;

    fn path(s: &str) -> PackagePath {
        PackagePath::parse(s).unwrap()
    }

    #[test]
    fn test_plain_add_package_caches_child() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let bar = env.declare_package(a, &path("com.foo.bar")).unwrap();
        let foo = env.declared_package(a, &path("com.foo")).unwrap();

        assert_eq!(env.get_package0(foo, "bar"), None);
        assert_eq!(env.add_package(foo, bar, a), bar);
        assert_eq!(env.get_package0(foo, "bar"), Some(PackageRef::Package(bar)));
    }

    #[test]
    fn test_plain_get_package_searches_then_caches() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let bar = env.declare_package(a, &path("com.foo.bar")).unwrap();
        let foo = env.declared_package(a, &path("com.foo")).unwrap();

        assert_eq!(env.get_package(foo, "bar", a), Some(bar));
        assert_eq!(env.get_package(foo, "baz", a), None);
        assert_eq!(env.package(foo).known_package("baz"), Some(PackageRef::NotFound));
    }

    #[test]
    fn test_plain_visible_for_is_identity() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let b = env.add_module("b");
        let foo = env.declare_package(a, &path("com.foo")).unwrap();

        assert_eq!(env.get_visible_for(foo, b, false), Some(foo));
        assert_eq!(env.get_type(foo, "Missing", b), Ok(None));
    }

    #[test]
    fn test_type_probes_on_plain() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let b = env.add_module("b");
        let ty = env.declare_type(a, "com.foo.Bar").unwrap();
        let foo = env.declared_package(a, &path("com.foo")).unwrap();

        assert_eq!(env.get_type0(foo, "Bar"), Some(ty));
        assert!(env.has_type0_any(foo, "Bar"));
        assert_eq!(env.get_type0_for_module(foo, a, "Bar"), Some(ty));
        assert_eq!(env.get_type0_for_module(foo, b, "Bar"), None);
    }
}
