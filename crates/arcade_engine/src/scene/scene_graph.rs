//! Scene graph
//!
//! The scene owns every entity. Systems refer to entities by [`EntityKey`]
//! and never take ownership; removing an entity from the scene is the only
//! way to end its lifetime.

use super::entity::Entity;
use crate::foundation::math::Transform;
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

new_key_type! {
    /// Generational handle to an entity stored in a [`Scene`]
    pub struct EntityKey;
}

/// Scene graph errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The key does not refer to a live entity
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityKey),

    /// An entity cannot be its own parent
    #[error("entity {0:?} cannot be its own parent")]
    SelfParent(EntityKey),

    /// Attaching would create a cycle
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Entity being attached
        child: EntityKey,
        /// Requested parent
        parent: EntityKey,
    },
}

struct SceneEntry {
    entity: Box<dyn Entity>,
    parent: Option<EntityKey>,
    children: Vec<EntityKey>,
}

/// Owner of all entities and their parent/child relationships
#[derive(Default)]
pub struct Scene {
    entries: SlotMap<EntityKey, SceneEntry>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity as a root and return its key
    pub fn spawn<E: Entity>(&mut self, entity: E) -> EntityKey {
        self.spawn_boxed(Box::new(entity))
    }

    /// Add an already boxed entity as a root
    pub fn spawn_boxed(&mut self, entity: Box<dyn Entity>) -> EntityKey {
        self.entries.insert(SceneEntry {
            entity,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Remove an entity; its children become roots
    pub fn despawn(&mut self, key: EntityKey) -> Option<Box<dyn Entity>> {
        let entry = self.entries.remove(key)?;

        if let Some(parent) = entry.parent {
            if let Some(parent_entry) = self.entries.get_mut(parent) {
                parent_entry.children.retain(|&child| child != key);
            }
        }
        for child in entry.children {
            if let Some(child_entry) = self.entries.get_mut(child) {
                child_entry.parent = None;
            }
        }

        Some(entry.entity)
    }

    /// Make `child` a child of `parent`, detaching it from any previous parent
    pub fn attach(&mut self, child: EntityKey, parent: EntityKey) -> Result<(), SceneError> {
        if !self.entries.contains_key(child) {
            return Err(SceneError::UnknownEntity(child));
        }
        if !self.entries.contains_key(parent) {
            return Err(SceneError::UnknownEntity(parent));
        }
        if child == parent {
            return Err(SceneError::SelfParent(child));
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(SceneError::Cycle { child, parent });
        }

        self.detach(child);
        self.entries[child].parent = Some(parent);
        self.entries[parent].children.push(child);
        Ok(())
    }

    /// Turn `child` into a root; returns whether it had a parent
    pub fn detach(&mut self, child: EntityKey) -> bool {
        let Some(parent) = self.entries.get_mut(child).and_then(|entry| entry.parent.take()) else {
            return false;
        };
        if let Some(parent_entry) = self.entries.get_mut(parent) {
            parent_entry.children.retain(|&key| key != child);
        }
        true
    }

    /// Parent of an entity, if any
    pub fn parent(&self, key: EntityKey) -> Option<EntityKey> {
        self.entries.get(key).and_then(|entry| entry.parent)
    }

    /// Children of an entity in attachment order
    pub fn children(&self, key: EntityKey) -> &[EntityKey] {
        match self.entries.get(key) {
            Some(entry) => &entry.children,
            None => &[],
        }
    }

    fn ancestors(&self, key: EntityKey) -> impl Iterator<Item = EntityKey> + '_ {
        std::iter::successors(self.parent(key), move |&current| self.parent(current))
    }

    /// Borrow an entity
    pub fn get(&self, key: EntityKey) -> Option<&dyn Entity> {
        self.entries.get(key).map(|entry| entry.entity.as_ref())
    }

    /// Mutably borrow an entity
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut dyn Entity> {
        self.entries.get_mut(key).map(|entry| entry.entity.as_mut())
    }

    /// Borrow an entity as its concrete type
    pub fn get_as<T: Entity>(&self, key: EntityKey) -> Option<&T> {
        self.get(key)?.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow an entity as its concrete type
    pub fn get_as_mut<T: Entity>(&mut self, key: EntityKey) -> Option<&mut T> {
        self.get_mut(key)?.as_any_mut().downcast_mut::<T>()
    }

    /// Mutably borrow two distinct entities at once
    ///
    /// Returns `None` if the keys are equal or either is stale.
    pub fn pair_mut(
        &mut self,
        a: EntityKey,
        b: EntityKey,
    ) -> Option<(&mut dyn Entity, &mut dyn Entity)> {
        let [first, second] = self.entries.get_disjoint_mut([a, b])?;
        Some((first.entity.as_mut(), second.entity.as_mut()))
    }

    /// Whether `key` refers to a live entity
    pub fn contains(&self, key: EntityKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the scene is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of all live entities
    pub fn keys(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.entries.keys()
    }

    /// Compose transforms down the hierarchy
    ///
    /// Writes every node's parent transform from its ancestors so that
    /// [`Entity::world_transform`] reflects the current hierarchy. Roots
    /// receive the identity.
    pub fn propagate_transforms(&mut self) {
        let mut pending: Vec<(EntityKey, Transform)> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.parent.is_none())
            .map(|(key, _)| (key, Transform::identity()))
            .collect();

        while let Some((key, parent_transform)) = pending.pop() {
            let Some(entry) = self.entries.get_mut(key) else {
                continue;
            };
            let node = entry.entity.node_mut();
            node.set_parent_transform(parent_transform);
            let world = node.world_transform();

            pending.extend(entry.children.iter().map(|&child| (child, world)));
        }
    }
}
