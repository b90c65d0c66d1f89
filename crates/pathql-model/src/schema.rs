//! Schema metadata
//!
//! Immutable declarations of object types, their scalar properties and their
//! links. A forward link of any cardinality implies a backward link
//! (`<name [IS SourceType]`) that is always multi and optional, because many
//! instances may point at the same target.

use indexmap::IndexMap;

use crate::error::{ModelError, ModelResult};
use crate::value::ScalarKind;

/// Link cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one target (exactly one when required)
    Single,
    /// Any number of targets
    Multi,
}

/// A scalar property declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Scalar kind of the stored value
    pub kind: ScalarKind,
    /// Whether every instance must carry a value
    pub required: bool,
}

/// A link declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link name
    pub name: String,
    /// Target object type name
    pub target: String,
    /// Single or multi
    pub cardinality: Cardinality,
    /// Whether at least one target must be present
    pub required: bool,
}

/// An object type: named set of property and link declarations
#[derive(Debug, Clone)]
pub struct ObjectType {
    /// Type name
    pub name: String,
    properties: IndexMap<String, Property>,
    links: IndexMap<String, Link>,
}

impl ObjectType {
    /// Create a new object type with no members
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
            links: IndexMap::new(),
        }
    }

    /// Add an optional single property
    pub fn with_property(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        let name = name.into();
        self.properties.insert(
            name.clone(),
            Property {
                name,
                kind,
                required: false,
            },
        );
        self
    }

    /// Add a required single property
    pub fn with_required_property(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        let name = name.into();
        self.properties.insert(
            name.clone(),
            Property {
                name,
                kind,
                required: true,
            },
        );
        self
    }

    /// Add a required single link
    pub fn with_required_link(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.add_link(name, target, Cardinality::Single, true)
    }

    /// Add an optional single link
    pub fn with_optional_link(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.add_link(name, target, Cardinality::Single, false)
    }

    /// Add a multi link (always optional)
    pub fn with_multi_link(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.add_link(name, target, Cardinality::Multi, false)
    }

    fn add_link(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        cardinality: Cardinality,
        required: bool,
    ) -> Self {
        let name = name.into();
        self.links.insert(
            name.clone(),
            Link {
                name,
                target: target.into(),
                cardinality,
                required,
            },
        );
        self
    }

    /// Look up a property declaration
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Look up a link declaration
    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.get(name)
    }

    /// Iterate over property declarations in declaration order
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Iterate over link declarations in declaration order
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }
}

/// The full schema: a set of object types
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: IndexMap<String, ObjectType>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object type
    pub fn with_type(mut self, object_type: ObjectType) -> Self {
        self.types.insert(object_type.name.clone(), object_type);
        self
    }

    /// Check whether a type name is declared
    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Look up an object type, failing with `UnknownType`
    pub fn object_type(&self, name: &str) -> ModelResult<&ObjectType> {
        self.types
            .get(name)
            .ok_or_else(|| ModelError::unknown_type(name))
    }

    /// Resolve a backward link step: `<link [IS source_type]` traversed from
    /// an instance of `target_type`
    ///
    /// Validates that `source_type` declares a link of that name targeting
    /// `target_type`, and returns the forward declaration.
    pub fn backlink(
        &self,
        target_type: &str,
        link: &str,
        source_type: &str,
    ) -> ModelResult<&Link> {
        let source = self.object_type(source_type)?;
        let decl = source
            .link(link)
            .ok_or_else(|| ModelError::unknown_link(source_type, link))?;
        if decl.target != target_type {
            return Err(ModelError::LinkTargetMismatch {
                type_name: source_type.to_string(),
                link: link.to_string(),
                expected: decl.target.clone(),
                found: target_type.to_string(),
            });
        }
        Ok(decl)
    }

    /// Iterate over declared types in declaration order
    pub fn types(&self) -> impl Iterator<Item = &ObjectType> {
        self.types.values()
    }
}
