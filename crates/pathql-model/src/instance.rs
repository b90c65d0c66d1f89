//! Graph instances

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::value::Scalar;

/// Opaque instance identity, stable for the duration of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub(crate) u32);

impl InstanceId {
    /// Index into the graph's instance table
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A typed instance: property values and ordered link targets
///
/// Absent optional properties and links simply have no entry; readers see
/// EMPTY or an empty target set.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Stable identity
    pub id: InstanceId,
    /// Name of the instance's object type
    pub type_name: String,
    pub(crate) properties: IndexMap<String, Scalar>,
    pub(crate) links: IndexMap<String, SmallVec<[InstanceId; 2]>>,
}

impl Instance {
    pub(crate) fn new(id: InstanceId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            properties: IndexMap::new(),
            links: IndexMap::new(),
        }
    }

    /// Stored property value, if present
    pub fn property(&self, name: &str) -> Option<&Scalar> {
        self.properties.get(name)
    }

    /// Stored link targets (empty slice when unset)
    pub fn link_targets(&self, name: &str) -> &[InstanceId] {
        self.links.get(name).map_or(&[], |targets| targets.as_slice())
    }
}
