//! Path-level resolution on behalf of a module.

use crate::binding::PackageRef;
use crate::environment::LookupEnvironment;
use crate::error::{GraphError, TypeLookupError};
use crate::ids::{ModuleId, PackageId, TypeId};
use crate::path::PackagePath;

/// Outcome of resolving a qualified type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeResolution {
    Found(TypeId),
    /// The package resolved but does not know the type.
    NoSuchType(PackageId),
    NoSuchPackage,
    Failed(TypeLookupError),
}

impl LookupEnvironment {
    /// Resolve `path` segment by segment as seen by `module`.
    ///
    /// The top-level segment comes from the module's visible packages, every
    /// further segment from [`get_package`](LookupEnvironment::get_package)
    /// on the binding found so far.
    pub fn resolve_package(&mut self, module: ModuleId, path: &PackagePath) -> Option<PackageId> {
        if path.is_empty() {
            return None;
        }
        let mut current = self
            .visible_package(module, &path.prefix(1))
            .and_then(PackageRef::package)?;
        for segment in &path.segments()[1..] {
            current = self.get_package(current, segment, module)?;
        }
        Some(current)
    }

    /// Resolve a qualified type name (`com.foo.Bar`) as seen by `module`.
    ///
    /// A plain package must be accessible to `module`; a split applies its
    /// own cross-incarnation rules.
    pub fn resolve_type(&mut self, module: ModuleId, qualified: &str) -> Result<TypeResolution, GraphError> {
        let (path, name) = PackagePath::split_type_name(qualified)?;
        let Some(package) = self.resolve_package(module, &path) else {
            return Ok(TypeResolution::NoSuchPackage);
        };

        let found = match self.get_type(package, &name, module) {
            Ok(found) => found,
            Err(err) => return Ok(TypeResolution::Failed(err)),
        };
        Ok(match found {
            None => TypeResolution::NoSuchType(package),
            Some(ty) if !self.package(package).is_split() && !self.can_access(module, package) => {
                TypeResolution::Failed(TypeLookupError::NotAccessible { ty })
            }
            Some(ty) => TypeResolution::Found(ty),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> PackagePath {
        PackagePath::parse(s).unwrap()
    }

    #[test]
    fn test_resolve_package_walks_segments() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let bar = env.declare_package(a, &path("com.foo.bar")).unwrap();

        assert_eq!(env.resolve_package(a, &path("com.foo.bar")), Some(bar));
        assert_eq!(env.resolve_package(a, &path("com.foo.baz")), None);
        assert_eq!(env.resolve_package(a, &path("org")), None);
    }

    #[test]
    fn test_resolve_type_in_own_module() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let ty = env.declare_type(a, "com.foo.Bar").unwrap();

        assert_eq!(env.resolve_type(a, "com.foo.Bar"), Ok(TypeResolution::Found(ty)));
        assert!(matches!(env.resolve_type(a, "com.foo.Baz"), Ok(TypeResolution::NoSuchType(_))));
        assert_eq!(env.resolve_type(a, "org.Baz"), Ok(TypeResolution::NoSuchPackage));
        assert!(env.resolve_type(a, "Bar").is_err());
    }

    #[test]
    fn test_resolve_type_through_export() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let c = env.add_module("c");
        let ty = env.declare_type(a, "com.foo.Bar").unwrap();
        env.add_exports(a, path("com.foo"));
        env.add_reads(c, a);

        assert_eq!(env.resolve_type(c, "com.foo.Bar"), Ok(TypeResolution::Found(ty)));
    }

    #[test]
    fn test_resolve_type_in_unexported_package_is_not_found() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let c = env.add_module("c");
        env.declare_type(a, "com.foo.Bar").unwrap();
        env.add_reads(c, a);

        assert_eq!(env.resolve_type(c, "com.foo.Bar"), Ok(TypeResolution::NoSuchPackage));
    }
}
