//! Type resolution across incarnations and client-facing visibility.

use crate::diag::lookup_debug;
use crate::environment::LookupEnvironment;
use crate::error::TypeLookupError;
use crate::ids::{ModuleId, PackageId, TypeId};

impl LookupEnvironment {
    /// Resolve the type `name` across the incarnations of `split` on behalf
    /// of `module`.
    ///
    /// The first hit is kept until an accessible one replaces it. A second
    /// accessible hit makes the lookup ambiguous, and a hit that never
    /// became accessible is reported as not accessible. Only the package is
    /// checked here, not the type's own modifiers.
    pub(crate) fn split_get_type(
        &self,
        split: PackageId,
        name: &str,
        module: ModuleId,
    ) -> Result<Option<TypeId>, TypeLookupError> {
        let mut candidate: Option<TypeId> = None;
        let mut accessible = false;

        for incarnation in self.package(split).incarnations() {
            let Some(ty) = self.package(incarnation).known_types.get(name).copied() else {
                continue;
            };
            match candidate {
                Some(first) if accessible => {
                    if self.can_access(module, incarnation) {
                        return Err(TypeLookupError::Ambiguous { first, second: ty });
                    }
                }
                _ => {
                    candidate = Some(ty);
                    accessible = self.can_access(module, incarnation);
                }
            }
        }

        match candidate {
            Some(ty) if !accessible => Err(TypeLookupError::NotAccessible { ty }),
            other => Ok(other),
        }
    }

    /// Whether `split` or any of its incarnations already knows the type
    /// `name`.
    pub(crate) fn split_has_type0_any(&self, split: PackageId, name: &str) -> bool {
        let data = self.package(split);
        data.known_types.contains_key(name)
            || data
                .incarnations()
                .into_iter()
                .any(|inc| self.package(inc).known_types.contains_key(name))
    }

    /// The binding a client should see for `split`.
    ///
    /// Only incarnations holding a compilation unit count. With
    /// `prefer_local`, the client's own incarnation wins outright. Otherwise
    /// a single accessible incarnation in a named module is returned, unless
    /// an accessible unnamed-module incarnation competes with it and the
    /// configuration does not ignore the unnamed module. Competing named
    /// incarnations yield the split itself.
    pub(crate) fn split_get_visible_for(
        &self,
        split: PackageId,
        client: ModuleId,
        prefer_local: bool,
    ) -> Option<PackageId> {
        let mut named_count = 0usize;
        let mut unique_named = None;
        let mut in_unnamed = None;

        for incarnation in self.package(split).incarnations() {
            let data = self.package(incarnation);
            if !data.has_compilation_unit() {
                continue;
            }
            if prefer_local && data.enclosing_module == client {
                return Some(incarnation);
            }
            if !self.can_access(client, incarnation) {
                continue;
            }
            if self.module(data.enclosing_module).is_unnamed() {
                in_unnamed = Some(incarnation);
            } else {
                named_count += 1;
                unique_named = Some(incarnation);
            }
        }

        let visible = match named_count {
            0 => in_unnamed,
            1 if self.config.ignore_unnamed_module_for_split_package || in_unnamed.is_none() => unique_named,
            _ => Some(split),
        };
        lookup_debug!(
            self,
            client = %self.module_name(client),
            named = named_count,
            unnamed = in_unnamed.is_some(),
            "visible for client"
        );
        visible
    }
}
