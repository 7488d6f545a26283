//! Namespace paths.
//!
//! Declarations live in hierarchical namespaces like `std::ranges`. The root
//! (global) namespace has no segments.

use std::fmt;

/// A namespace path such as `std::ranges`.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    segments: Vec<String>,
}

impl Namespace {
    /// The global namespace.
    pub fn global() -> Self {
        Self::default()
    }

    /// Parse a `::`-separated path. Empty segments are dropped, so both
    /// `""` and `"::"` denote the global namespace.
    pub fn new(path: &str) -> Self {
        let segments = path
            .split("::")
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Self { segments }
    }

    /// Creates a namespace from segments.
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_global(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the enclosing namespace, if any.
    pub fn parent(&self) -> Option<Namespace> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Namespace::from_segments(
                self.segments[..self.segments.len() - 1].to_vec(),
            ))
        }
    }

    /// Returns a nested namespace by appending a segment.
    pub fn child(&self, segment: impl Into<String>) -> Namespace {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Namespace::from_segments(segments)
    }

    /// Fully qualified spelling of `name` inside this namespace.
    pub fn qualify(&self, name: &str) -> String {
        if self.is_global() {
            format!("::{name}")
        } else {
            format!("{self}::{name}")
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            f.write_str("::")
        } else {
            f.write_str(&self.segments.join("::"))
        }
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace({self})")
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Namespace::new(s)
    }
}
