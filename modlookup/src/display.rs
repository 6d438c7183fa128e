//! Human-readable rendering of bindings.

use std::fmt;

use crate::binding::{PackageKind, PackageRef};
use crate::environment::LookupEnvironment;
use crate::ids::PackageId;

/// Renders a binding as `com.foo`, `com.foo (from a, b)` or
/// `com.foo <problem>`.
pub struct PackageDisplay<'a> {
    env: &'a LookupEnvironment,
    package: PackageId,
}

impl fmt::Display for PackageDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.env.package(self.package);
        write!(f, "{}", data.compound_name)?;
        match &data.kind {
            PackageKind::Plain(_) => Ok(()),
            PackageKind::Problem => write!(f, " <problem>"),
            PackageKind::Split(split) => {
                write!(f, " (from ")?;
                for (i, module) in split.declaring_modules.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.env.module_name(*module))?;
                }
                write!(f, ")")
            }
        }
    }
}

impl LookupEnvironment {
    /// Readable form of a binding.
    pub fn display(&self, package: PackageId) -> PackageDisplay<'_> {
        PackageDisplay { env: self, package }
    }

    /// Diagnostic form of a lookup result, including the binding kind, id
    /// and enclosing module.
    pub fn describe(&self, binding: Option<PackageRef>) -> String {
        let id = match binding {
            None => return "<absent>".to_string(),
            Some(PackageRef::NotFound) => return "<not found>".to_string(),
            Some(PackageRef::Package(id)) => id,
        };
        let data = self.package(id);
        let kind = match data.kind {
            PackageKind::Plain(_) => "plain",
            PackageKind::Split(_) => "split",
            PackageKind::Problem => "problem",
        };
        format!(
            "{kind}#{} {{{}}} enclosing {}",
            id.index(),
            self.display(id),
            self.module_name(data.enclosing_module)
        )
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
    fn test_display_kinds() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let b = env.add_module("b");
        let pa = env.declare_package(a, &path("com.foo")).unwrap();
        let pb = env.declare_package(b, &path("com.foo")).unwrap();
        let bad = env.declare_problem_package(b, &path("com.bad")).unwrap();
        let split = env
            .combine(Some(PackageRef::Package(pb)), Some(PackageRef::Package(pa)), a)
            .and_then(PackageRef::package)
            .unwrap();

        assert_eq!(env.display(pa).to_string(), "com.foo");
        assert_eq!(env.display(split).to_string(), "com.foo (from a, b)");
        assert_eq!(env.display(bad).to_string(), "com.bad <problem>");
    }

    #[test]
    fn test_describe_sentinels() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let pa = env.declare_package(a, &path("com.foo")).unwrap();

        assert_eq!(env.describe(None), "<absent>");
        assert_eq!(env.describe(Some(PackageRef::NotFound)), "<not found>");
        assert_eq!(
            env.describe(Some(PackageRef::Package(pa))),
            format!("plain#{} {{com.foo}} enclosing a", pa.index())
        );
    }
}
