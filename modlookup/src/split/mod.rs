//! Split package bindings.
//!
//! A split package is a package path declared independently by two or more
//! modules. It is represented by one aggregate binding whose incarnations are
//! the plain bindings of the contributing modules.
//!
//! # Invariants
//!
//! - A split has at least one incarnation, and a split with a single
//!   incarnation is never handed out: callers collapse it to that
//!   incarnation.
//! - `declaring_modules` always equals the set of enclosing modules of the
//!   incarnations.
//! - Every incarnation lists the split among its wrapping splits.
//!
//! Splits are created by [`combine`](LookupEnvironment::combine),
//! [`combine_all`](LookupEnvironment::combine_all) and
//! [`find_package`](LookupEnvironment::find_package) only, grow by
//! [`add`](LookupEnvironment::add_to_split), and are never destroyed; a
//! superseded split simply stops being referenced by any cache.
//!
//! # Submodules
//!
//! - [`combine`] - ranking and merging of candidate bindings
//! - [`register`] - sub-package registration and sibling enrichment
//! - [`lookup`] - cached lookups and the full cross-module search
//! - [`resolve`] - type resolution and client visibility

mod combine;
mod lookup;
mod register;
mod resolve;

pub use combine::RANK_VALID;

use crate::binding::{PackageData, PackageKind};
use crate::diag::lookup_debug;
use crate::environment::LookupEnvironment;
use crate::ids::{ModuleId, PackageId};
use crate::path::PackagePath;

/// Observer notified of every split construction.
///
/// Installed with [`LookupEnvironment::with_observer`]. Nothing in the
/// lookup logic depends on it.
pub trait SplitObserver {
    /// Called once the new split holds its initial incarnations.
    fn split_created(&mut self, split: PackageId, name: &PackagePath);
}

impl LookupEnvironment {
    /// Create a split seeded with `initial`, using `primary` as its
    /// enclosing module.
    pub(crate) fn new_split(&mut self, initial: PackageId, primary: ModuleId) -> PackageId {
        let name = self.package(initial).compound_name.clone();
        let parent = self.package(initial).parent;
        let split = self.alloc_package(PackageData::split(name, parent, primary));
        self.add_to_split(split, initial);

        if let Some(observer) = self.observer.as_mut() {
            observer.split_created(split, &self.packages[split.slot()].compound_name);
        }
        split
    }

    /// Merge `other` into `split`.
    ///
    /// A split contributes all its incarnations, a plain binding itself.
    /// Incarnations already present are skipped, so adding is idempotent and
    /// never duplicates a back-reference. Problem bindings contribute
    /// nothing.
    pub fn add_to_split(&mut self, split: PackageId, other: PackageId) {
        let (modules, incarnations): (Vec<ModuleId>, Vec<PackageId>) = match &self.package(other).kind {
            PackageKind::Split(source) => (
                source.declaring_modules.iter().copied().collect(),
                source.incarnations.iter().copied().collect(),
            ),
            PackageKind::Plain(_) => (vec![self.package(other).enclosing_module], vec![other]),
            PackageKind::Problem => return,
        };

        let mut added = Vec::new();
        if let Some(state) = self.package_mut(split).as_split_mut() {
            state.declaring_modules.extend(modules);
            for incarnation in incarnations {
                if state.incarnations.insert(incarnation) {
                    added.push(incarnation);
                }
            }
        }
        for incarnation in added {
            if let Some(plain) = self.package_mut(incarnation).as_plain_mut() {
                plain.wrapping_splits.insert(split);
            }
        }
    }

    /// The plain binding of `package` contributed by exactly `module`.
    ///
    /// For a plain binding this is the binding itself when it belongs to
    /// `module`.
    pub fn get_incarnation(&self, package: PackageId, module: ModuleId) -> Option<PackageId> {
        let data = self.package(package);
        match &data.kind {
            PackageKind::Split(split) => split
                .incarnations
                .iter()
                .copied()
                .find(|&inc| self.package(inc).enclosing_module == module),
            PackageKind::Plain(_) if data.enclosing_module == module => Some(package),
            _ => None,
        }
    }

    /// Whether `module` contributes to `package`.
    pub fn is_declared_in(&self, package: PackageId, module: ModuleId) -> bool {
        let data = self.package(package);
        match &data.kind {
            PackageKind::Split(split) => split.declaring_modules.contains(&module),
            PackageKind::Plain(_) => data.enclosing_module == module,
            PackageKind::Problem => false,
        }
    }

    /// Modules contributing to `package`, in insertion order.
    pub fn declaring_modules(&self, package: PackageId) -> Vec<ModuleId> {
        let data = self.package(package);
        match &data.kind {
            PackageKind::Split(split) => split.declaring_modules.iter().copied().collect(),
            PackageKind::Plain(_) => vec![data.enclosing_module],
            PackageKind::Problem => Vec::new(),
        }
    }

    /// Whether `package` already covers everything `other` contributes.
    ///
    /// A split subsumes a binding of the same path whose contributing modules
    /// it all declares. Any other binding only subsumes itself.
    pub fn subsumes(&self, package: PackageId, other: PackageId) -> bool {
        let data = self.package(package);
        let Some(split) = data.as_split() else {
            return package == other;
        };
        let other_data = self.package(other);
        if data.compound_name != other_data.compound_name {
            return false;
        }
        match other_data.as_split() {
            Some(other_split) => other_split
                .declaring_modules
                .iter()
                .all(|m| split.declaring_modules.contains(m)),
            None => split.declaring_modules.contains(&other_data.enclosing_module),
        }
    }

    /// Collapse a split holding a single incarnation to that incarnation.
    pub(crate) fn peel_singleton(&self, package: PackageId) -> PackageId {
        match self.package(package).as_split() {
            Some(split) if split.incarnations.len() == 1 => {
                let only = split.incarnations.first().copied().unwrap_or(package);
                lookup_debug!(self, split = %package, incarnation = %only, "peeled singleton split");
                only
            }
            _ => package,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::LookupConfig;

    fn path(s: &str) -> PackagePath {
        PackagePath::parse(s).unwrap()
    }

    struct Recorder(Rc<RefCell<Vec<PackageId>>>);

    impl SplitObserver for Recorder {
        fn split_created(&mut self, split: PackageId, _name: &PackagePath) {
            self.0.borrow_mut().push(split);
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let b = env.add_module("b");
        let pa = env.declare_package(a, &path("com.foo")).unwrap();
        let pb = env.declare_package(b, &path("com.foo")).unwrap();

        let split = env.new_split(pa, a);
        env.add_to_split(split, pb);
        env.add_to_split(split, pb);
        env.add_to_split(split, pa);

        assert_eq!(env.package(split).incarnations(), vec![pa, pb]);
        assert_eq!(env.declaring_modules(split), vec![a, b]);
        assert_eq!(env.package(pb).wrapping_splits(), vec![split]);
    }

    #[test]
    fn test_add_split_unions_incarnations() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let b = env.add_module("b");
        let c = env.add_module("c");
        let pa = env.declare_package(a, &path("com.foo")).unwrap();
        let pb = env.declare_package(b, &path("com.foo")).unwrap();
        let pc = env.declare_package(c, &path("com.foo")).unwrap();

        let ab = env.new_split(pa, a);
        env.add_to_split(ab, pb);
        let abc = env.new_split(pc, a);
        env.add_to_split(abc, ab);

        assert_eq!(env.package(abc).incarnations(), vec![pc, pa, pb]);
        assert_eq!(env.package(pa).wrapping_splits(), vec![ab, abc]);
    }

    #[test]
    fn test_incarnation_queries() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let b = env.add_module("b");
        let c = env.add_module("c");
        let pa = env.declare_package(a, &path("com.foo")).unwrap();
        let pb = env.declare_package(b, &path("com.foo")).unwrap();

        let split = env.new_split(pa, c);
        env.add_to_split(split, pb);

        assert_eq!(env.get_incarnation(split, b), Some(pb));
        assert_eq!(env.get_incarnation(split, c), None);
        assert!(env.is_declared_in(split, a));
        assert!(!env.is_declared_in(split, c));
        assert_eq!(env.package(split).enclosing_module(), c);
        assert_eq!(env.get_incarnation(pa, a), Some(pa));
        assert_eq!(env.get_incarnation(pa, b), None);
    }

    #[test]
    fn test_subsumes_compares_modules_and_path() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let b = env.add_module("b");
        let pa = env.declare_package(a, &path("com.foo")).unwrap();
        let pb = env.declare_package(b, &path("com.foo")).unwrap();
        let other_path = env.declare_package(a, &path("com.bar")).unwrap();

        let split = env.new_split(pa, a);
        env.add_to_split(split, pb);

        assert!(env.subsumes(split, pa));
        assert!(env.subsumes(split, split));
        assert!(!env.subsumes(split, other_path));
        assert!(!env.subsumes(pa, split));
        assert!(env.subsumes(pa, pa));
    }

    #[test]
    fn test_observer_sees_every_split() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut env = LookupEnvironment::with_observer(LookupConfig::default(), Box::new(Recorder(seen.clone())));
        let a = env.add_module("a");
        let b = env.add_module("b");
        let pa = env.declare_package(a, &path("com.foo")).unwrap();
        let pb = env.declare_package(b, &path("com.foo")).unwrap();

        let split = env.new_split(pa, a);
        env.add_to_split(split, pb);

        assert_eq!(*seen.borrow(), vec![split]);
    }
}
