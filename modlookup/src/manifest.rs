//! World manifest parsing and environment construction.
//!
//! A world manifest describes a module graph in TOML: the modules, their
//! read edges and exports, and the packages and types each declares.
//!
//! # Example Manifest
//!
//! ```toml
//! [options]
//! ignore-unnamed-module-for-split-package = false
//!
//! [[module]]
//! name = "a"
//! exports = ["com.foo"]
//! packages = ["com.foo"]
//! types = ["com.foo.Bar"]
//!
//! [[module]]
//! name = "b"
//! reads = ["a"]
//! reads-transitive = []
//! packages = ["com.foo.impl"]
//! problem-packages = ["com.broken"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::config::{ConfigError, LookupConfig};
use crate::environment::LookupEnvironment;
use crate::error::GraphError;
use crate::ids::ModuleId;
use crate::path::PackagePath;
use crate::split::SplitObserver;

/// Errors that can occur when loading a world manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read world manifest: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse world manifest: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("duplicate module name: {name}")]
    DuplicateModule { name: String },

    #[error("module `{module}` reads unknown module `{name}`")]
    UnknownModule { module: String, name: String },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A module entry of the manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModuleSpec {
    /// Module name (required, unique)
    pub name: String,

    /// Marks the catch-all unnamed module
    #[serde(default)]
    pub unnamed: bool,

    #[serde(default)]
    pub reads: Vec<String>,

    /// Read edges re-exported to every reader of this module
    #[serde(default, alias = "reads_transitive")]
    pub reads_transitive: Vec<String>,

    #[serde(default)]
    pub exports: Vec<String>,

    /// Packages holding a compilation unit
    #[serde(default)]
    pub packages: Vec<String>,

    /// Packages declared as invalid bindings
    #[serde(default, alias = "problem_packages")]
    pub problem_packages: Vec<String>,

    /// Qualified type names
    #[serde(default)]
    pub types: Vec<String>,

    /// Packages whose lookups hit a missing type
    #[serde(default, alias = "missing_types")]
    pub missing_types: Vec<String>,
}

/// A complete world manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    #[serde(default)]
    pub options: LookupConfig,

    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleSpec>,
}

impl World {
    /// Parse a manifest from a TOML string.
    #[allow(clippy::should_implement_trait)] // Uses custom ManifestError, not compatible with FromStr trait
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        let world: World = toml::from_str(content)?;
        world.validate()?;
        Ok(world)
    }

    /// Load a manifest from a file path.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        self.options.validate()?;

        let mut names = HashSet::new();
        for module in &self.modules {
            if !names.insert(module.name.as_str()) {
                return Err(ManifestError::DuplicateModule {
                    name: module.name.clone(),
                });
            }
        }

        for module in &self.modules {
            for target in module.reads.iter().chain(&module.reads_transitive) {
                if !names.contains(target.as_str()) {
                    return Err(ManifestError::UnknownModule {
                        module: module.name.clone(),
                        name: target.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Build a lookup environment for this world.
    pub fn build(&self) -> Result<LookupEnvironment, ManifestError> {
        self.populate(LookupEnvironment::with_config(self.options.clone()))
    }

    /// Build a lookup environment reporting split constructions to
    /// `observer`.
    pub fn build_with_observer(&self, observer: Box<dyn SplitObserver>) -> Result<LookupEnvironment, ManifestError> {
        self.populate(LookupEnvironment::with_observer(self.options.clone(), observer))
    }

    fn populate(&self, mut env: LookupEnvironment) -> Result<LookupEnvironment, ManifestError> {
        let ids: Vec<ModuleId> = self
            .modules
            .iter()
            .map(|spec| {
                if spec.unnamed {
                    env.add_unnamed_module(spec.name.as_str())
                } else {
                    env.add_module(spec.name.as_str())
                }
            })
            .collect();

        for (spec, &id) in self.modules.iter().zip(&ids) {
            for target in &spec.reads {
                env.add_reads(id, self.lookup(&ids, &spec.name, target)?);
            }
            for target in &spec.reads_transitive {
                env.add_reads_transitive(id, self.lookup(&ids, &spec.name, target)?);
            }
            for export in &spec.exports {
                env.add_exports(id, PackagePath::parse(export)?);
            }
            for package in &spec.packages {
                env.declare_package(id, &PackagePath::parse(package)?)?;
            }
            for package in &spec.problem_packages {
                env.declare_problem_package(id, &PackagePath::parse(package)?)?;
            }
            for ty in &spec.types {
                env.declare_type(id, ty)?;
            }
            for package in &spec.missing_types {
                let path = PackagePath::parse(package)?;
                let declared = match env.declared_package(id, &path) {
                    Some(declared) => declared,
                    None => env.declare_package(id, &path)?,
                };
                env.mark_missing_type(declared);
            }
        }

        tracing::debug!(modules = ids.len(), packages = env.package_count(), "built world");
        Ok(env)
    }

    fn lookup(&self, ids: &[ModuleId], module: &str, name: &str) -> Result<ModuleId, ManifestError> {
        self.modules
            .iter()
            .position(|spec| spec.name == name)
            .map(|index| ids[index])
            .ok_or_else(|| ManifestError::UnknownModule {
                module: module.to_string(),
                name: name.to_string(),
            })
    }

    /// Serialize the manifest to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
