//! # modlookup
//!
//! Split-package resolution for a module-aware symbol table.
//!
//! In a module system in the style of Java 9, the same package path may be
//! declared independently by several modules. This crate decides what that
//! path means to each requesting module: a single module's package, an
//! aggregate *split* binding over several modules, a problem binding, or
//! nothing at all.
//!
//! ## Resolution Flow
//!
//! ```text
//! resolve(module, com.foo.bar)
//!   -> cached lookup (get_package0)
//!   -> full search across declaring modules (find_package)
//!   -> combine candidates by rank
//!   -> cache and link into the package tree (add_package)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use modlookup::{LookupEnvironment, PackagePath};
//!
//! let mut env = LookupEnvironment::new();
//! let a = env.add_module("a");
//! let b = env.add_module("b");
//! let client = env.add_module("client");
//!
//! let foo = PackagePath::parse("com.foo")?;
//! for module in [a, b] {
//!     env.declare_package(module, &foo)?;
//!     env.add_exports(module, foo.clone());
//!     env.add_reads(client, module);
//! }
//!
//! let resolved = env.resolve_package(client, &foo).unwrap();
//! assert_eq!(env.display(resolved).to_string(), "com.foo (from a, b)");
//! # Ok::<(), modlookup::GraphError>(())
//! ```
//!
//! ## Module Overview
//!
//! - [`binding`] - Package and type records
//! - [`config`] - Lookup configuration
//! - [`diag`] - Per-task diagnostic context
//! - [`environment`] - The arena-backed lookup environment
//! - [`manifest`] - TOML world manifests
//! - [`module`] - Module nodes, readability and access
//! - [`split`] - Split package merging, search and visibility

pub mod binding;
pub mod config;
pub mod diag;
pub mod display;
pub mod environment;
pub mod error;
pub mod ids;
pub mod manifest;
pub mod module;
pub mod package;
pub mod path;
pub mod resolve;
pub mod split;

// Re-export commonly used types
pub use binding::{PackageData, PackageRef, TypeData};
pub use config::{ConfigError, LookupConfig};
pub use environment::LookupEnvironment;
pub use error::{GraphError, TypeLookupError};
pub use ids::{ModuleId, PackageId, TypeId};
pub use manifest::{ManifestError, ModuleSpec, World};
pub use path::PackagePath;
pub use resolve::TypeResolution;
pub use split::SplitObserver;
