//! The lookup environment.
//!
//! One [`LookupEnvironment`] owns a module graph together with every package
//! binding and type reachable from it. All entities live in arenas and are
//! addressed by id, so bindings can reference each other (parents, cached
//! children, split ↔ incarnation links) without owning each other.
//!
//! An environment is used by one task at a time. Independent workers build
//! independent environments.

use crate::binding::{PackageData, TypeData};
use crate::config::LookupConfig;
use crate::diag::DiagContext;
use crate::error::GraphError;
use crate::ids::{ModuleId, PackageId, TypeId};
use crate::module::ModuleData;
use crate::path::PackagePath;
use crate::split::SplitObserver;

/// Module graph plus package and type arenas.
pub struct LookupEnvironment {
    pub(crate) modules: Vec<ModuleData>,
    pub(crate) packages: Vec<PackageData>,
    pub(crate) types: Vec<TypeData>,
    pub(crate) config: LookupConfig,
    pub(crate) diag: DiagContext,
    pub(crate) observer: Option<Box<dyn SplitObserver>>,
}

impl Default for LookupEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LookupEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupEnvironment")
            .field("modules", &self.modules.len())
            .field("packages", &self.packages.len())
            .field("types", &self.types.len())
            .field("config", &self.config)
            .finish()
    }
}

impl LookupEnvironment {
    /// Create an empty environment with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LookupConfig::default())
    }

    /// Create an empty environment.
    pub fn with_config(config: LookupConfig) -> Self {
        let diag = DiagContext::from_config(&config);
        Self {
            modules: Vec::new(),
            packages: Vec::new(),
            types: Vec::new(),
            config,
            diag,
            observer: None,
        }
    }

    /// Create an empty environment that reports every split construction to
    /// `observer`.
    pub fn with_observer(config: LookupConfig, observer: Box<dyn SplitObserver>) -> Self {
        let mut env = Self::with_config(config);
        env.observer = Some(observer);
        env
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Add a named module.
    pub fn add_module(&mut self, name: impl Into<String>) -> ModuleId {
        self.push_module(name.into(), false)
    }

    /// Add an unnamed module. It reads every module and exports every
    /// package.
    pub fn add_unnamed_module(&mut self, name: impl Into<String>) -> ModuleId {
        self.push_module(name.into(), true)
    }

    fn push_module(&mut self, name: String, unnamed: bool) -> ModuleId {
        let id = ModuleId::new(self.modules.len() as u32);
        self.modules.push(ModuleData::new(id, name, unnamed));
        id
    }

    /// Get a module record.
    ///
    /// Panics if `id` was not allocated by this environment.
    pub fn module(&self, id: ModuleId) -> &ModuleData {
        &self.modules[id.slot()]
    }

    pub fn module_name(&self, id: ModuleId) -> &str {
        &self.modules[id.slot()].name
    }

    /// Look up a module by name. Returns the first match.
    pub fn module_by_name(&self, name: &str) -> Option<ModuleId> {
        self.modules.iter().find(|m| m.name == name).map(|m| m.id)
    }

    /// Iterate over all modules.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleData> {
        self.modules.iter()
    }

    /// Get a package binding.
    ///
    /// Panics if `id` was not allocated by this environment.
    pub fn package(&self, id: PackageId) -> &PackageData {
        &self.packages[id.slot()]
    }

    pub(crate) fn package_mut(&mut self, id: PackageId) -> &mut PackageData {
        &mut self.packages[id.slot()]
    }

    /// Get a type record.
    ///
    /// Panics if `id` was not allocated by this environment.
    pub fn type_data(&self, id: TypeId) -> &TypeData {
        &self.types[id.slot()]
    }

    /// Number of package bindings allocated so far, splits included.
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub(crate) fn alloc_package(&mut self, data: PackageData) -> PackageId {
        let id = PackageId::new(self.packages.len() as u32);
        self.packages.push(data);
        id
    }

    /// Declare `path` in `module`.
    ///
    /// Missing enclosing packages are created as placeholders without a
    /// compilation unit. Declaring an existing path returns the existing
    /// binding and marks it as holding a compilation unit.
    pub fn declare_package(&mut self, module: ModuleId, path: &PackagePath) -> Result<PackageId, GraphError> {
        let parent = self.declare_ancestors(module, path)?;
        if let Some(existing) = self.declared_package(module, path) {
            if let Some(plain) = self.package_mut(existing).as_plain_mut() {
                plain.has_compilation_unit = true;
                return Ok(existing);
            }
            return Err(self.conflict(module, path));
        }
        Ok(self.insert_declared(module, path, parent, true))
    }

    /// Declare an invalid binding for `path` in `module`.
    pub fn declare_problem_package(&mut self, module: ModuleId, path: &PackagePath) -> Result<PackageId, GraphError> {
        let parent = self.declare_ancestors(module, path)?;
        if self.declared_package(module, path).is_some() {
            return Err(self.conflict(module, path));
        }
        let id = self.alloc_package(PackageData::problem(path.clone(), parent, module));
        self.modules[module.slot()].declared.insert(path.clone(), id);
        Ok(id)
    }

    /// Declare a type given its qualified name (`com.foo.Bar`).
    pub fn declare_type(&mut self, module: ModuleId, qualified: &str) -> Result<TypeId, GraphError> {
        let (path, name) = PackagePath::split_type_name(qualified)?;
        let package = self.declare_package(module, &path)?;
        if self.package(package).known_types.contains_key(&name) {
            return Err(GraphError::DuplicateType {
                module: self.module_name(module).to_string(),
                name: qualified.to_string(),
            });
        }
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(TypeData {
            name: name.clone(),
            package,
            module,
        });
        self.package_mut(package).known_types.insert(name, id);
        Ok(id)
    }

    /// Mark a binding as tainted by a missing type. Searches skip tainted
    /// candidates.
    pub fn mark_missing_type(&mut self, package: PackageId) {
        self.package_mut(package).has_missing_type = true;
    }

    fn declare_ancestors(&mut self, module: ModuleId, path: &PackagePath) -> Result<Option<PackageId>, GraphError> {
        if path.is_empty() {
            return Err(GraphError::InvalidPath { path: String::new() });
        }
        let mut parent = None;
        for len in 1..path.len() {
            let prefix = path.prefix(len);
            let id = match self.declared_package(module, &prefix) {
                Some(id) => id,
                None => self.insert_declared(module, &prefix, parent, false),
            };
            parent = Some(id);
        }
        Ok(parent)
    }

    fn insert_declared(
        &mut self,
        module: ModuleId,
        path: &PackagePath,
        parent: Option<PackageId>,
        has_compilation_unit: bool,
    ) -> PackageId {
        let id = self.alloc_package(PackageData::plain(path.clone(), parent, module, has_compilation_unit));
        self.modules[module.slot()].declared.insert(path.clone(), id);
        id
    }

    fn conflict(&self, module: ModuleId, path: &PackagePath) -> GraphError {
        GraphError::PackageConflict {
            module: self.module_name(module).to_string(),
            path: path.to_string(),
        }
    }
}
