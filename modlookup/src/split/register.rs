//! Sub-package registration under a split package.

use crate::binding::PackageRef;
use crate::diag::{lookup_anomaly, lookup_debug};
use crate::environment::LookupEnvironment;
use crate::ids::{ModuleId, PackageId};

impl LookupEnvironment {
    /// Register `child` under the split `split` on behalf of `module`.
    ///
    /// The child is first enriched with the same package from the other
    /// declaring modules, then merged with whatever the split already caches
    /// under its simple name. The plain part of the child belonging to the
    /// child's own module is also registered under the matching plain
    /// incarnation, so the per-module trees stay linked. Returns the
    /// enriched child.
    pub(crate) fn split_add_package(&mut self, split: PackageId, child: PackageId, module: ModuleId) -> PackageId {
        let span = self.diag.span("add_package");
        let _enter = span.enter();

        if self.package(child).parent != Some(split) {
            lookup_anomaly!(
                self,
                child = %self.describe(Some(PackageRef::Package(child))),
                parent = %self.describe(Some(PackageRef::Package(split))),
                "adding child binding with unexpected parent"
            );
        }
        lookup_debug!(
            self,
            child = %self.describe(Some(PackageRef::Package(child))),
            split = %self.describe(Some(PackageRef::Package(split))),
            module = %self.module_name(module),
            "add package binding"
        );

        let simple_name = self.package(child).compound_name.simple_name().to_string();
        let enriched = self.combine_with_siblings(split, child, module);

        let previous = self.package(split).known_packages.get(&simple_name).copied();
        let enclosing = self.package(split).enclosing_module;
        let visible = self.combine(Some(PackageRef::Package(enriched)), previous, enclosing);
        lookup_debug!(
            self,
            registered = %self.describe(visible),
            replacing = %self.describe(previous),
            "register known package"
        );
        if let Some(visible) = visible {
            self.package_mut(split).known_packages.insert(simple_name, visible);
        }

        // A split never becomes the child of a plain binding.
        let child_module = self.package(enriched).enclosing_module;
        if let Some(incarnation) = self.get_incarnation(split, child_module) {
            if let Some(child_incarnation) = self.get_incarnation(enriched, child_module) {
                self.add_package(incarnation, child_incarnation, module);
            }
        }

        enriched
    }

    /// Upgrade `child` with the same package declared by the split's other
    /// modules.
    ///
    /// Modules equal to `module`, and modules already contributing to
    /// `child`, are skipped.
    pub(crate) fn combine_with_siblings(&mut self, split: PackageId, child: PackageId, module: ModuleId) -> PackageId {
        let primary = self.package(child).enclosing_module;
        let path = self.package(child).compound_name.clone();

        let mut bindings = Vec::new();
        for incarnation in self.package(split).incarnations() {
            let sibling_module = self.package(incarnation).enclosing_module;
            if sibling_module == module || self.is_declared_in(child, sibling_module) {
                continue;
            }
            if let Some(next) = self.declared_package(sibling_module, &path) {
                bindings.push(Some(PackageRef::Package(next)));
            }
        }
        if bindings.is_empty() {
            return child;
        }

        bindings.push(Some(PackageRef::Package(child)));
        let enriched = self.combine_all(&bindings, primary);
        lookup_debug!(
            self,
            from = %self.describe(Some(PackageRef::Package(child))),
            to = %self.describe(enriched),
            "enriched sub-binding"
        );
        enriched.and_then(PackageRef::package).unwrap_or(child)
    }
}
