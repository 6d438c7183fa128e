//! Error types for the lookup environment.
//!
//! Expected lookup outcomes (absent, not found, problem bindings) are plain
//! values, not errors. The enums here cover malformed input to the graph
//! builders and the two ways a type lookup in a split package can fail.

use thiserror::Error;

use crate::ids::TypeId;

/// Errors raised while building the module graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("invalid package path: `{path}`")]
    InvalidPath { path: String },

    #[error("invalid qualified type name: `{name}`")]
    InvalidTypeName { name: String },

    #[error("package `{path}` is already declared in module `{module}`")]
    PackageConflict { module: String, path: String },

    #[error("type `{name}` is already declared in module `{module}`")]
    DuplicateType { module: String, name: String },
}

/// Failure of a type lookup across the incarnations of a split package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TypeLookupError {
    /// Two modules readable by the requester both declare the type.
    #[error("type is ambiguous: {first} and {second} are both accessible")]
    Ambiguous { first: TypeId, second: TypeId },

    /// The type exists, but no declaring module is accessible.
    #[error("type {ty} is not accessible from the requesting module")]
    NotAccessible { ty: TypeId },
}

impl TypeLookupError {
    /// The type the error is reported against.
    pub fn primary_type(&self) -> TypeId {
        match self {
            TypeLookupError::Ambiguous { first, .. } => *first,
            TypeLookupError::NotAccessible { ty } => *ty,
        }
    }
}
