//! Dotted package paths (`com.foo.bar`).

use std::fmt;
use std::str::FromStr;

use crate::error::GraphError;

/// A package path, stored as its segments.
///
/// This is the `compound_name` of a package binding. Every incarnation of a
/// split package carries an equal path. A path always has at least one
/// segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackagePath {
    segments: Vec<String>,
}

impl PackagePath {
    /// Create a path from segments. Empty segments are rejected.
    pub fn new<I, S>(segments: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(GraphError::InvalidPath {
                path: segments.join("."),
            });
        }
        Ok(PackagePath { segments })
    }

    /// Parse a dotted path such as `com.foo.bar`.
    pub fn parse(dotted: &str) -> Result<Self, GraphError> {
        Self::new(dotted.trim().split('.'))
    }

    /// The path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last segment (`bar` for `com.foo.bar`).
    pub fn simple_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Create a child path.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        PackagePath { segments }
    }

    /// Get the parent path, or `None` for a top-level package.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            None
        } else {
            let mut segments = self.segments.clone();
            segments.pop();
            Some(PackagePath { segments })
        }
    }

    /// The first `len` segments of this path, keeping at least the
    /// top-level segment.
    pub fn prefix(&self, len: usize) -> Self {
        PackagePath {
            segments: self.segments[..len.clamp(1, self.segments.len())].to_vec(),
        }
    }

    /// Whether `self` equals `other` or encloses it.
    pub fn is_prefix_of(&self, other: &PackagePath) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Split a qualified type name (`com.foo.Bar`) into package path and
    /// simple type name.
    pub fn split_type_name(qualified: &str) -> Result<(Self, String), GraphError> {
        match qualified.trim().rsplit_once('.') {
            Some((package, name)) if !name.is_empty() => Ok((Self::parse(package)?, name.to_string())),
            _ => Err(GraphError::InvalidTypeName {
                name: qualified.to_string(),
            }),
        }
    }
}

impl FromStr for PackagePath {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
