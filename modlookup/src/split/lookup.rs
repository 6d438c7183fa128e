//! Cached sub-package lookups and the full cross-module search.

use indexmap::IndexSet;

use crate::binding::PackageRef;
use crate::diag::{lookup_anomaly, lookup_debug, lookup_trace};
use crate::environment::LookupEnvironment;
use crate::ids::{ModuleId, PackageId};

impl LookupEnvironment {
    /// Strict cached lookup of the sub-package `name` of `split`.
    ///
    /// Returns `None` as soon as one incarnation has no cache entry for
    /// `name`, since only a full search can then give a complete answer.
    /// Otherwise the incarnations' entries are combined and the result is
    /// cached in the split.
    pub(crate) fn split_get_package0(&mut self, split: PackageId, name: &str) -> Option<PackageRef> {
        if let Some(known) = self.package(split).known_package(name) {
            if known == PackageRef::NotFound {
                lookup_debug!(self, simple_name = name, split = %split, "package not found from cache");
            }
            return Some(known);
        }

        let incarnations = self.package(split).incarnations();
        let mut bindings = Vec::with_capacity(incarnations.len());
        for &incarnation in &incarnations {
            match self.package(incarnation).known_package(name) {
                Some(entry) => bindings.push(Some(entry)),
                None => return None,
            }
        }

        let enclosing = self.package(split).enclosing_module;
        let candidate = self.combine_all(&bindings, enclosing)?;
        lookup_debug!(
            self,
            candidate = %self.describe(Some(candidate)),
            parent = %self.describe(Some(PackageRef::Package(split))),
            "register known package in parent binding"
        );
        if let PackageRef::Package(found) = candidate {
            if self.package(found).is_split() {
                for &incarnation in &incarnations {
                    if self.package(incarnation).known_package(name) == Some(candidate) {
                        lookup_anomaly!(
                            self,
                            candidate = %self.describe(Some(candidate)),
                            incarnation = %self.describe(Some(PackageRef::Package(incarnation))),
                            "adding reference to sub-package already cached by an incarnation"
                        );
                    }
                }
            }
        }
        let data = self.package_mut(split);
        data.known_packages.insert(name.to_string(), candidate);
        if let Some(state) = data.as_split_mut() {
            state.relaxed.remove(name);
        }
        Some(candidate)
    }

    /// Relaxed cached lookup of the sub-package `name` of `split`.
    ///
    /// Incarnations without a cache entry are skipped. The combined result
    /// may be incomplete and never enters the sub-package cache. It is
    /// memoized against the incarnation entries it came from, so repeated
    /// lookups do not allocate fresh splits.
    pub(crate) fn split_get_package0_any(&mut self, split: PackageId, name: &str) -> Option<PackageRef> {
        if let Some(known) = self.package(split).known_package(name) {
            return Some(known);
        }

        let entries: Vec<PackageRef> = self
            .package(split)
            .incarnations()
            .into_iter()
            .filter_map(|incarnation| self.package(incarnation).known_package(name))
            .collect();
        if let Some((seen, result)) = self.package(split).as_split().and_then(|s| s.relaxed.get(name)) {
            if *seen == entries {
                return *result;
            }
        }

        let bindings: Vec<Option<PackageRef>> = entries.iter().copied().map(Some).collect();
        let enclosing = self.package(split).enclosing_module;
        let result = self.combine_all(&bindings, enclosing);
        if let Some(state) = self.package_mut(split).as_split_mut() {
            state.relaxed.insert(name.to_string(), (entries, result));
        }
        result
    }

    /// Search every declaring module of `split` for the sub-package `name`.
    ///
    /// Each declaring module contributes its visible package at the child
    /// path. A single contribution is used as is, several are merged into a
    /// fresh split. The result is registered with
    /// [`add_package`](LookupEnvironment::add_package); an empty search
    /// records the not-found sentinel and yields `None`.
    pub fn find_package(&mut self, split: PackageId, name: &str, module: ModuleId) -> Option<PackageId> {
        let span = self.diag.span("find_package");
        let _enter = span.enter();

        let Some(in_flight) = self.package(split).as_split().map(|s| s.current_find) else {
            lookup_anomaly!(self, package = %self.describe(Some(PackageRef::Package(split))), "find_package on a non-split binding");
            return None;
        };
        if in_flight {
            lookup_anomaly!(self, split = %self.describe(Some(PackageRef::Package(split))), "unexpected recursive find_package");
        }
        self.set_current_find(split, true);

        let enclosing = self.package(split).enclosing_module;
        if module != enclosing {
            lookup_anomaly!(
                self,
                enclosing = %self.module_name(enclosing),
                context = %self.module_name(module),
                "enclosing module does not match search context"
            );
        }
        lookup_debug!(
            self,
            simple_name = name,
            split = %self.describe(Some(PackageRef::Package(split))),
            module = %self.module_name(module),
            "find package"
        );

        let child_path = self.package(split).compound_name.child(name);
        let mut candidates: IndexSet<PackageId> = IndexSet::new();
        for declaring in self.declaring_modules(split) {
            let candidate = self.visible_package(declaring, &child_path);
            lookup_trace!(
                self,
                module = %self.module_name(declaring),
                candidate = %self.describe(candidate),
                "declaring module contributed"
            );
            if let Some(PackageRef::Package(found)) = candidate {
                if !self.package(found).has_missing_type {
                    candidates.insert(found);
                }
            }
        }

        let result = match candidates.len() {
            0 => None,
            1 => {
                let only = candidates[0];
                if self.package(only).is_split() {
                    lookup_anomaly!(self, split = %self.describe(Some(PackageRef::Package(only))), "leaking non-unique split binding");
                }
                Some(only)
            }
            _ => {
                let merged = self.new_split(candidates[0], enclosing);
                for &other in candidates.iter().skip(1) {
                    self.add_to_split(merged, other);
                }
                Some(merged)
            }
        };
        lookup_debug!(self, result = %self.describe(result.map(PackageRef::Package)), "search result");

        match result {
            None => self.add_not_found_package(split, name),
            Some(found) => {
                if self.package(found).enclosing_module != enclosing {
                    lookup_anomaly!(
                        self,
                        result = %self.describe(Some(PackageRef::Package(found))),
                        expected = %self.module_name(enclosing),
                        "resulting package binding has foreign enclosing module"
                    );
                }
                if self.package(found).is_split() && candidates.contains(&found) {
                    lookup_anomaly!(
                        self,
                        result = %self.describe(Some(PackageRef::Package(found))),
                        parent = %self.describe(Some(PackageRef::Package(split))),
                        "adding non-unique split binding as package"
                    );
                }
                self.add_package(split, found, module);
            }
        }

        self.set_current_find(split, false);
        result
    }

    fn set_current_find(&mut self, split: PackageId, value: bool) {
        if let Some(state) = self.package_mut(split).as_split_mut() {
            state.current_find = value;
        }
    }
}
