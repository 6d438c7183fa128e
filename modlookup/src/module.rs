//! Module nodes and the readability relation.
//!
//! This module provides:
//! - Module records with their declared packages and exports
//! - Readability, including implied readability through `requires transitive`
//! - Package accessibility from a client module

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;

use crate::binding::PackageRef;
use crate::diag::{lookup_debug, lookup_trace};
use crate::environment::LookupEnvironment;
use crate::ids::{ModuleId, PackageId};
use crate::path::PackagePath;

/// A module of the lookup environment.
#[derive(Debug, Clone)]
pub struct ModuleData {
    pub(crate) id: ModuleId,
    pub(crate) name: String,
    /// The catch-all module for code outside the named-module graph.
    pub(crate) unnamed: bool,
    /// Outgoing read edges; the flag marks `requires transitive`.
    pub(crate) reads: IndexMap<ModuleId, bool>,
    pub(crate) exports: Vec<PackagePath>,
    /// Packages declared by this module, plain or problem.
    pub(crate) declared: HashMap<PackagePath, PackageId>,
    /// This module's view of packages, by path. Kept apart from the
    /// sub-package caches of bindings other modules own.
    pub(crate) visible: HashMap<PackagePath, PackageRef>,
}

impl ModuleData {
    pub(crate) fn new(id: ModuleId, name: String, unnamed: bool) -> Self {
        Self {
            id,
            name,
            unnamed,
            reads: IndexMap::new(),
            exports: Vec::new(),
            declared: HashMap::new(),
            visible: HashMap::new(),
        }
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_unnamed(&self) -> bool {
        self.unnamed
    }

    /// Modules this module reads directly, with the transitive flag.
    pub fn reads(&self) -> impl Iterator<Item = (ModuleId, bool)> + '_ {
        self.reads.iter().map(|(&id, &transitive)| (id, transitive))
    }

    pub fn exports(&self) -> &[PackagePath] {
        &self.exports
    }

    /// Whether `path` is exported. The unnamed module exports everything.
    pub fn exports_package(&self, path: &PackagePath) -> bool {
        self.unnamed || self.exports.iter().any(|e| e == path)
    }

    /// Whether `path` is exported or encloses an exported package, so that
    /// lookups can walk down to it.
    pub(crate) fn exposes_path(&self, path: &PackagePath) -> bool {
        self.unnamed || self.exports.iter().any(|e| path.is_prefix_of(e))
    }
}

impl LookupEnvironment {
    /// Add a read edge: `from` reads `to`.
    pub fn add_reads(&mut self, from: ModuleId, to: ModuleId) {
        self.modules[from.slot()].reads.entry(to).or_insert(false);
    }

    /// Add a `requires transitive` edge: `from` reads `to`, and every module
    /// reading `from` reads `to` as well.
    pub fn add_reads_transitive(&mut self, from: ModuleId, to: ModuleId) {
        self.modules[from.slot()].reads.insert(to, true);
    }

    /// Export `path` from `module`.
    pub fn add_exports(&mut self, module: ModuleId, path: PackagePath) {
        let exports = &mut self.modules[module.slot()].exports;
        if !exports.contains(&path) {
            exports.push(path);
        }
    }

    /// Check if `from` can read `to`.
    ///
    /// Readability is reflexive, the unnamed module reads every module, and
    /// a direct read of `m` extends to everything `m` reads transitively.
    pub fn can_read(&self, from: ModuleId, to: ModuleId) -> bool {
        if from == to || self.modules[from.slot()].unnamed {
            return true;
        }

        let mut visited = HashSet::new();
        let mut queue: VecDeque<ModuleId> = self.modules[from.slot()].reads.keys().copied().collect();

        while let Some(current) = queue.pop_front() {
            if current == to {
                return true;
            }
            if visited.insert(current) {
                queue.extend(
                    self.modules[current.slot()]
                        .reads
                        .iter()
                        .filter(|(_, &transitive)| transitive)
                        .map(|(&id, _)| id),
                );
            }
        }

        false
    }

    /// Check if `client` may access the contents of `package`.
    ///
    /// A plain binding is accessible to its own module, and to readers of
    /// its module when the package is exported. A split is accessible when
    /// any incarnation is. Problem bindings never are.
    pub fn can_access(&self, client: ModuleId, package: PackageId) -> bool {
        let data = self.package(package);
        if let Some(split) = data.as_split() {
            return split.incarnations.iter().any(|&inc| self.can_access(client, inc));
        }
        if !data.is_valid() {
            return false;
        }
        let owner = data.enclosing_module;
        if owner == client {
            return true;
        }
        self.can_read(client, owner) && self.modules[owner.slot()].exports_package(&data.compound_name)
    }

    /// The plain (or problem) binding `module` itself declares at `path`.
    pub fn declared_package(&self, module: ModuleId, path: &PackagePath) -> Option<PackageId> {
        self.modules[module.slot()].declared.get(path).copied()
    }

    /// The module-local visible package at `path`.
    ///
    /// Combines the module's own declaration with those of every readable
    /// module exposing the path, under `module` as primary module. Results
    /// are cached in the module's own view. A parent binding's sub-package
    /// cache is only read and written when `module` owns that parent, since
    /// a plain binding's cache records its owner's view. A path with no
    /// declaration yields the not-found sentinel.
    pub fn visible_package(&mut self, module: ModuleId, path: &PackagePath) -> Option<PackageRef> {
        if path.is_empty() {
            return None;
        }
        if let Some(&seen) = self.modules[module.slot()].visible.get(path) {
            return Some(seen);
        }
        let name = path.simple_name().to_string();

        let parent = match path.parent() {
            Some(parent_path) => match self.visible_package(module, &parent_path)? {
                PackageRef::Package(parent) => Some(parent),
                PackageRef::NotFound => return Some(self.remember_visible(module, path, PackageRef::NotFound)),
            },
            None => None,
        };
        let owned_parent = parent.filter(|&p| self.package(p).enclosing_module == module);

        if let Some(parent) = owned_parent {
            if let Some(cached) = self.get_package0(parent, &name) {
                return Some(self.remember_visible(module, path, cached));
            }
        }

        let mut candidates = Vec::new();
        if let Some(own) = self.declared_package(module, path) {
            candidates.push(Some(PackageRef::Package(own)));
        }
        let others: Vec<ModuleId> = self
            .modules
            .iter()
            .filter(|m| m.id != module && m.exposes_path(path) && self.can_read(module, m.id))
            .map(|m| m.id)
            .collect();
        for other in others {
            if let Some(declared) = self.declared_package(other, path) {
                lookup_trace!(
                    self,
                    module = %self.module_name(other),
                    candidate = %declared,
                    "readable module contributes candidate"
                );
                candidates.push(Some(PackageRef::Package(declared)));
            }
        }

        let combined = self.combine_all(&candidates, module);
        lookup_debug!(
            self,
            module = %self.module_name(module),
            path = %path,
            result = %self.describe(combined),
            "visible package"
        );

        let result = match (combined, owned_parent) {
            (Some(PackageRef::Package(found)), Some(parent)) => {
                PackageRef::Package(self.add_package(parent, found, module))
            }
            (Some(PackageRef::Package(found)), None) => PackageRef::Package(found),
            (_, Some(parent)) => {
                self.add_not_found_package(parent, &name);
                PackageRef::NotFound
            }
            (_, None) => PackageRef::NotFound,
        };
        Some(self.remember_visible(module, path, result))
    }

    fn remember_visible(&mut self, module: ModuleId, path: &PackagePath, found: PackageRef) -> PackageRef {
        self.modules[module.slot()].visible.insert(path.clone(), found);
        found
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use crate::binding::PackageRef;
    use crate::environment::LookupEnvironment;
    use crate::ids::{ModuleId, PackageId};
    use crate::path::PackagePath;

    fn path(s: &str) -> PackagePath {
        PackagePath::parse(s).unwrap()
    }

    #[test]
    fn test_can_read_is_reflexive_and_directed() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let b = env.add_module("b");
        env.add_reads(a, b);

        assert!(env.can_read(a, a));
        assert!(env.can_read(a, b));
        assert!(!env.can_read(b, a));
    }

    #[test]
    fn test_implied_readability() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let b = env.add_module("b");
        let c = env.add_module("c");
        let d = env.add_module("d");

        // a -> b =transitive=> c -> d
        env.add_reads(a, b);
        env.add_reads_transitive(b, c);
        env.add_reads(c, d);

        assert!(env.can_read(a, c));
        assert!(!env.can_read(a, d)); // c -> d is not transitive
    }

    #[test]
    fn test_unnamed_reads_everything() {
        let mut env = LookupEnvironment::new();
        let named = env.add_module("named");
        let unnamed = env.add_unnamed_module("<unnamed>");

        assert!(env.can_read(unnamed, named));
        assert!(!env.can_read(named, unnamed));
    }

    #[test]
    fn test_can_access_requires_export() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let c = env.add_module("c");
        env.add_reads(c, a);
        let hidden = env.declare_package(a, &path("com.hidden")).unwrap();
        let open = env.declare_package(a, &path("com.open")).unwrap();
        env.add_exports(a, path("com.open"));

        assert!(env.can_access(a, hidden));
        assert!(!env.can_access(c, hidden));
        assert!(env.can_access(c, open));
    }

    #[test]
    fn test_visible_package_caches_not_found() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        env.declare_package(a, &path("com.foo")).unwrap();

        assert_eq!(env.visible_package(a, &path("com.bar")), Some(PackageRef::NotFound));

        // Declaring afterwards does not invalidate the cached sentinel.
        env.declare_package(a, &path("com.bar")).unwrap();
        assert_eq!(env.visible_package(a, &path("com.bar")), Some(PackageRef::NotFound));
    }

    #[test]
    fn test_visible_package_through_enclosing_export() {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let c = env.add_module("c");
        env.add_reads(c, a);
        let bar = env.declare_package(a, &path("com.foo.bar")).unwrap();
        env.add_exports(a, path("com.foo.bar"));

        let found = env.visible_package(c, &path("com.foo.bar"));
        assert_eq!(found, Some(PackageRef::Package(bar)));
    }

    /// `a` declares the exported `com.foo` and the internal `com.secret`;
    /// `c` reads `a`.
    fn secret_world() -> (LookupEnvironment, ModuleId, ModuleId, PackageId) {
        let mut env = LookupEnvironment::new();
        let a = env.add_module("a");
        let c = env.add_module("c");
        env.add_reads(c, a);
        env.declare_package(a, &path("com.foo")).unwrap();
        env.add_exports(a, path("com.foo"));
        let secret = env.declare_package(a, &path("com.secret")).unwrap();
        (env, a, c, secret)
    }

    #[test]
    fn test_reader_miss_does_not_hide_owner_package() {
        let (mut env, a, c, secret) = secret_world();

        assert_eq!(env.resolve_package(c, &path("com.secret")), None);
        assert_eq!(env.visible_package(c, &path("com.secret")), Some(PackageRef::NotFound));
        assert_eq!(env.resolve_package(a, &path("com.secret")), Some(secret));
        assert_eq!(env.visible_package(a, &path("com.secret")), Some(PackageRef::Package(secret)));
    }

    #[test]
    fn test_owner_hit_does_not_leak_unexported_package() {
        let (mut env, a, c, secret) = secret_world();

        assert_eq!(env.resolve_package(a, &path("com.secret")), Some(secret));
        assert_eq!(env.resolve_package(c, &path("com.secret")), None);
        assert_eq!(env.visible_package(c, &path("com.secret")), Some(PackageRef::NotFound));
    }

    #[test]
    fn test_reader_leaves_owner_cache_alone() {
        let (mut env, a, c, _secret) = secret_world();
        let com = env.declared_package(a, &path("com")).unwrap();

        env.resolve_package(c, &path("com.secret"));
        env.resolve_package(c, &path("com.foo"));

        assert_eq!(env.package(com).known_package("secret"), None);
        assert_eq!(env.package(com).known_package("foo"), None);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_candidates_are_traced() {
        let (mut env, _a, c, _secret) = secret_world();
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(captured.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            env.visible_package(c, &path("com.foo"));
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("TRACE"));
        assert!(output.contains("readable module contributes candidate"));
    }
}
