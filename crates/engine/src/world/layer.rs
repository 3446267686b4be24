use std::fmt;

use super::entity::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Ordered group of entity references. Entities themselves live in the engine
/// arena; a layer only fixes their draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    entities: Vec<EntityId>,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            locked: false,
            entities: Vec::new(),
        }
    }

    pub fn entity_ids(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.iter().any(|entity| entity == id)
    }

    /// Appends unless already present; returns whether the id was added.
    pub(crate) fn add_entity_id(&mut self, id: EntityId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.entities.push(id);
        true
    }

    pub(crate) fn remove_entity_id(&mut self, id: &EntityId) -> bool {
        let before = self.entities.len();
        self.entities.retain(|entity| entity != id);
        self.entities.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
