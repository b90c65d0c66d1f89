//! Path expression AST nodes
//!
//! A path names a chain of traversals from a root binding: forward links,
//! backward links (`<link [IS SourceType]`) and a terminal property. The
//! `Display` rendering is the canonical textual form; two occurrences of a
//! path denote the same iteration variable exactly when their canonical
//! prefixes agree, so the evaluator uses this rendering as structural
//! identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The root a path starts from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathRoot {
    /// A named binding: a type extent or a WITH alias
    Binding(String),
    /// Short form (`.prop`), rooted at the enclosing SELECT target's type
    ShortForm,
}

/// One traversal step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathStep {
    /// Scalar property access; always terminal
    Property(String),
    /// Forward link traversal
    Link(String),
    /// Backward link traversal with its required source-type filter
    Backlink { link: String, target: String },
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(name) | Self::Link(name) => write!(f, ".{name}"),
            Self::Backlink { link, target } => write!(f, ".<{link}[IS {target}]"),
        }
    }
}

/// A path expression: root plus traversal steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathExpr {
    /// Starting binding
    pub root: PathRoot,
    /// Traversal steps in source order
    pub steps: Vec<PathStep>,
}

impl PathExpr {
    /// Start a path at a named binding
    pub fn binding(name: impl Into<String>) -> Self {
        Self {
            root: PathRoot::Binding(name.into()),
            steps: Vec::new(),
        }
    }

    /// Start a short-form path (`.prop`)
    pub fn short_form() -> Self {
        Self {
            root: PathRoot::ShortForm,
            steps: Vec::new(),
        }
    }

    /// Append a property step
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.steps.push(PathStep::Property(name.into()));
        self
    }

    /// Append a forward link step
    pub fn link(mut self, name: impl Into<String>) -> Self {
        self.steps.push(PathStep::Link(name.into()));
        self
    }

    /// Append a backward link step (`<link [IS target]`)
    pub fn backlink(mut self, link: impl Into<String>, target: impl Into<String>) -> Self {
        self.steps.push(PathStep::Backlink {
            link: link.into(),
            target: target.into(),
        });
        self
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            PathRoot::Binding(name) => write!(f, "{name}")?,
            PathRoot::ShortForm => {}
        }
        for step in &self.steps {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
