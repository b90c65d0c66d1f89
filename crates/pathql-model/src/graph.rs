//! The immutable graph snapshot
//!
//! A `Graph` is the engine's sole read channel into storage: extents,
//! property reads and link traversals over a stable point-in-time view.
//! Construction goes through [`GraphBuilder`], which validates every stored
//! property and link against the schema, so a built graph never fails a
//! schema check at read time for data it holds.

use indexmap::IndexMap;

use crate::error::{ModelError, ModelResult};
use crate::instance::{Instance, InstanceId};
use crate::schema::{Cardinality, Schema};
use crate::value::{Scalar, Value};

/// Read-only snapshot of the object graph
#[derive(Debug)]
pub struct Graph {
    schema: Schema,
    instances: Vec<Instance>,
    extents: IndexMap<String, Vec<InstanceId>>,
}

impl Graph {
    /// The schema this graph conforms to
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// All instances of a type, in insertion order
    pub fn extent(&self, type_name: &str) -> ModelResult<&[InstanceId]> {
        self.schema.object_type(type_name)?;
        Ok(self
            .extents
            .get(type_name)
            .map_or(&[], |ids| ids.as_slice()))
    }

    /// The instance behind an identity
    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id.index()]
    }

    /// The type name of an instance
    pub fn type_of(&self, id: InstanceId) -> &str {
        &self.instances[id.index()].type_name
    }

    /// Read a property: the stored scalar, or EMPTY when absent
    pub fn get_property(&self, id: InstanceId, name: &str) -> ModelResult<Value> {
        let instance = self.instance(id);
        let object_type = self.schema.object_type(&instance.type_name)?;
        if object_type.property(name).is_none() {
            return Err(ModelError::unknown_property(&instance.type_name, name));
        }
        Ok(instance
            .property(name)
            .map_or(Value::Empty, |scalar| Value::Scalar(scalar.clone())))
    }

    /// Traverse a forward link: the ordered target set (empty when unset)
    pub fn get_link(&self, id: InstanceId, name: &str) -> ModelResult<&[InstanceId]> {
        let instance = self.instance(id);
        let object_type = self.schema.object_type(&instance.type_name)?;
        if object_type.link(name).is_none() {
            return Err(ModelError::unknown_link(&instance.type_name, name));
        }
        Ok(instance.link_targets(name))
    }

    /// Traverse a backward link: all instances of `source_type` whose `link`
    /// contains `id`, in extent order
    ///
    /// Backward links are always multi and optional. The result is computed
    /// from the forward side, so the two directions cannot disagree.
    pub fn get_backlink(
        &self,
        id: InstanceId,
        link: &str,
        source_type: &str,
    ) -> ModelResult<Vec<InstanceId>> {
        self.schema
            .backlink(self.type_of(id), link, source_type)?;
        let mut sources = Vec::new();
        for &source in self.extent(source_type)? {
            if self.instance(source).link_targets(link).contains(&id) {
                sources.push(source);
            }
        }
        Ok(sources)
    }
}

/// Validating builder for [`Graph`]
#[derive(Debug)]
pub struct GraphBuilder {
    schema: Schema,
    instances: Vec<Instance>,
    extents: IndexMap<String, Vec<InstanceId>>,
}

impl GraphBuilder {
    /// Start building a graph over a schema
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            instances: Vec::new(),
            extents: IndexMap::new(),
        }
    }

    /// Insert a fresh instance of a type and return its identity
    pub fn insert(&mut self, type_name: &str) -> ModelResult<InstanceId> {
        self.schema.object_type(type_name)?;
        let id = InstanceId(self.instances.len() as u32);
        self.instances.push(Instance::new(id, type_name));
        self.extents
            .entry(type_name.to_string())
            .or_default()
            .push(id);
        Ok(id)
    }

    /// Set a property value, validating name and scalar kind
    pub fn set_property(
        &mut self,
        id: InstanceId,
        name: &str,
        value: Scalar,
    ) -> ModelResult<()> {
        let type_name = self.instances[id.index()].type_name.clone();
        let decl = self
            .schema
            .object_type(&type_name)?
            .property(name)
            .ok_or_else(|| ModelError::unknown_property(&type_name, name))?;
        if decl.kind != value.kind() {
            return Err(ModelError::PropertyKindMismatch {
                type_name,
                property: name.to_string(),
                expected: decl.kind.to_string(),
                found: value.kind().to_string(),
            });
        }
        self.instances[id.index()]
            .properties
            .insert(name.to_string(), value);
        Ok(())
    }

    /// Add a link target, validating name, target type and cardinality
    pub fn add_link(&mut self, id: InstanceId, name: &str, target: InstanceId) -> ModelResult<()> {
        let type_name = self.instances[id.index()].type_name.clone();
        let decl = self
            .schema
            .object_type(&type_name)?
            .link(name)
            .ok_or_else(|| ModelError::unknown_link(&type_name, name))?
            .clone();
        let target_type = &self.instances[target.index()].type_name;
        if decl.target != *target_type {
            return Err(ModelError::LinkTargetMismatch {
                type_name,
                link: name.to_string(),
                expected: decl.target,
                found: target_type.clone(),
            });
        }
        let targets = self.instances[id.index()]
            .links
            .entry(name.to_string())
            .or_default();
        if decl.cardinality == Cardinality::Single && !targets.is_empty() {
            return Err(ModelError::SingleLinkOverflow {
                type_name,
                link: name.to_string(),
            });
        }
        targets.push(target);
        Ok(())
    }

    /// Finish building
    pub fn build(self) -> Graph {
        Graph {
            schema: self.schema,
            instances: self.instances,
            extents: self.extents,
        }
    }
}
