//! # Component Storage
//!
//! Sparse-set storage for a single component type.
//!
//! ```text
//! sparse:  [ABSENT, 1, ABSENT, 0, ...]   <- indexed by entity id
//! owners:  [#3, #1]                      <- parallel to dense
//! dense:   [C3, C1]                      <- gap-free values
//! ```
//!
//! - Insert appends to `dense`/`owners` and records the slot in `sparse`
//! - Remove moves the last element into the vacated slot and fixes up the
//!   moved owner's sparse entry, so storage stays contiguous
//! - Dense order is therefore NOT stable across removals

use std::any::Any;

use super::component::Component;
use super::entity::Entity;
use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};

/// Sparse table sentinel: the entity has no component in this store.
const ABSENT: u32 = u32::MAX;

/// Converts a dense slot to its sparse representation.
///
/// Slots are bounded by `max_entities`, which is a `u32`, so the cast never
/// truncates and never produces [`ABSENT`].
#[inline]
#[allow(clippy::cast_possible_truncation)]
const fn to_sparse(slot: usize) -> u32 {
    slot as u32
}

/// Rejects entities that can never own a component in a store bounded by
/// `max_entities`.
pub(crate) fn check_entity(entity: Entity, max_entities: u32) -> RegistryResult<()> {
    if entity.is_null() {
        return Err(RegistryError::NullEntity);
    }
    if entity.raw() >= max_entities {
        return Err(RegistryError::CapacityExceeded {
            entity,
            max_entities,
        });
    }
    Ok(())
}

/// Sparse-set storage for a single component type.
///
/// This storage guarantees:
/// - O(1) insert, replace, remove and lookup by entity
/// - Cache-friendly iteration over a gap-free dense array
/// - `owners[sparse[e]] == e` for every present entity
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust
/// use timberyard_core::{ComponentStore, Entity, Position};
///
/// let mut store: ComponentStore<Position> = ComponentStore::default();
/// let e = Entity::from_raw(1);
/// store.insert(e, Position::new(1.0, 2.0)).unwrap();
/// assert!(store.contains(e));
/// ```
pub struct ComponentStore<C: Component> {
    /// Gap-free component values.
    dense: Vec<C>,
    /// Owner of each dense slot.
    owners: Vec<Entity>,
    /// Entity id -> dense slot, or [`ABSENT`].
    sparse: Vec<u32>,
    /// Exclusive bound on entity ids accepted by this store.
    max_entities: u32,
}

impl<C: Component> ComponentStore<C> {
    /// Creates an empty store sized by `config`.
    #[must_use]
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            dense: Vec::with_capacity(config.store_capacity_hint),
            owners: Vec::with_capacity(config.store_capacity_hint),
            sparse: vec![ABSENT; config.effective_sparse_capacity()],
            max_entities: config.max_entities,
        }
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if no entity has this component.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Exclusive bound on entity ids this store accepts.
    #[inline]
    #[must_use]
    pub const fn max_entities(&self) -> u32 {
        self.max_entities
    }

    /// Dense slot of `entity`, if present.
    #[inline]
    fn slot(&self, entity: Entity) -> Option<usize> {
        match self.sparse.get(entity.index()) {
            Some(&slot) if slot != ABSENT => Some(slot as usize),
            _ => None,
        }
    }

    /// Checks if `entity` has a component in this store.
    ///
    /// Entities beyond the sparse table (and the null entity) are never
    /// present.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    pub(crate) fn not_found(entity: Entity) -> RegistryError {
        RegistryError::ComponentNotFound {
            entity,
            component: C::component_name(),
        }
    }

    /// Grows the sparse table so `index` is addressable.
    ///
    /// Doubles to amortize growth, never past `max_entities`.
    fn ensure_sparse(&mut self, index: usize) {
        if index < self.sparse.len() {
            return;
        }
        let new_len = (index + 1)
            .max(self.sparse.len() * 2)
            .min(self.max_entities as usize);
        self.sparse.resize(new_len, ABSENT);
    }

    /// Attaches a component to an entity that does not have one yet.
    ///
    /// Duplicate inserts are rejected and leave the store untouched; use
    /// [`ComponentStore::insert_or_replace`] for the permissive path.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NullEntity`] for [`Entity::NULL`]
    /// - [`RegistryError::CapacityExceeded`] if the id is `>= max_entities`
    /// - [`RegistryError::ComponentAlreadyPresent`] if the entity already
    ///   has this component
    pub fn insert(&mut self, entity: Entity, component: C) -> RegistryResult<&mut C> {
        check_entity(entity, self.max_entities)?;
        if self.contains(entity) {
            return Err(RegistryError::ComponentAlreadyPresent {
                entity,
                component: C::component_name(),
            });
        }

        self.ensure_sparse(entity.index());
        let slot = self.dense.len();
        self.dense.push(component);
        self.owners.push(entity);
        self.sparse[entity.index()] = to_sparse(slot);

        debug_assert_eq!(self.dense.len(), self.owners.len());
        debug_assert_eq!(self.owners[slot], entity);
        tracing::trace!(
            component = C::component_name(),
            %entity,
            slot,
            len = self.dense.len(),
            "component inserted"
        );
        self.trace_dump();

        Ok(&mut self.dense[slot])
    }

    /// Overwrites the component of an entity in place.
    ///
    /// No slot moves, so no other entity is affected.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ComponentNotFound`] if the entity has no
    /// component in this store.
    pub fn replace(&mut self, entity: Entity, component: C) -> RegistryResult<&mut C> {
        let slot = self.slot(entity).ok_or_else(|| Self::not_found(entity))?;
        let value = &mut self.dense[slot];
        *value = component;
        Ok(value)
    }

    /// Replaces the component if present, inserts it otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`ComponentStore::insert`] for entities that are not present
    /// yet (null entity, capacity).
    pub fn insert_or_replace(&mut self, entity: Entity, component: C) -> RegistryResult<&mut C> {
        if self.contains(entity) {
            self.replace(entity, component)
        } else {
            self.insert(entity, component)
        }
    }

    /// Detaches the component from `entity`, returning it.
    ///
    /// Removing an absent component is a no-op that returns `None`.
    ///
    /// The last dense element is swapped into the vacated slot and its
    /// owner's sparse entry is pointed at the new slot before truncating.
    pub fn remove(&mut self, entity: Entity) -> Option<C> {
        let slot = self.slot(entity)?;
        let last = self.dense.len() - 1;

        if slot != last {
            self.dense.swap(slot, last);
            self.owners.swap(slot, last);
            let moved = self.owners[slot];
            self.sparse[moved.index()] = to_sparse(slot);
            debug_assert_eq!(self.slot(moved), Some(slot));
        }

        self.owners.pop();
        let removed = self.dense.pop();
        self.sparse[entity.index()] = ABSENT;

        debug_assert_eq!(self.dense.len(), self.owners.len());
        debug_assert!(!self.contains(entity));
        tracing::trace!(
            component = C::component_name(),
            %entity,
            slot,
            len = self.dense.len(),
            "component removed"
        );
        self.trace_dump();

        removed
    }

    /// Gets the component of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ComponentNotFound`] if absent.
    #[inline]
    pub fn get(&self, entity: Entity) -> RegistryResult<&C> {
        self.try_get(entity).ok_or_else(|| Self::not_found(entity))
    }

    /// Gets a mutable component of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ComponentNotFound`] if absent.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> RegistryResult<&mut C> {
        let slot = self.slot(entity).ok_or_else(|| Self::not_found(entity))?;
        Ok(&mut self.dense[slot])
    }

    /// Gets the component of `entity`, or `None` if absent.
    #[inline]
    #[must_use]
    pub fn try_get(&self, entity: Entity) -> Option<&C> {
        self.slot(entity).map(|slot| &self.dense[slot])
    }

    /// Looks up several entities at once, skipping those without a
    /// component. Results keep the order of `entities`.
    #[must_use]
    pub fn get_many(&self, entities: &[Entity]) -> Vec<&C> {
        entities.iter().filter_map(|&e| self.try_get(e)).collect()
    }

    /// Current owners, in dense order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.owners
    }

    /// Component values, in dense order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[C] {
        &self.dense
    }

    /// Iterates over `(entity, component)` pairs in dense order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &C)> {
        self.owners.iter().copied().zip(self.dense.iter())
    }

    /// Iterates mutably over `(entity, component)` pairs in dense order.
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut C)> {
        self.owners.iter().copied().zip(self.dense.iter_mut())
    }

    /// Removes every component, keeping allocated capacity.
    pub fn clear(&mut self) {
        for owner in &self.owners {
            self.sparse[owner.index()] = ABSENT;
        }
        self.owners.clear();
        self.dense.clear();
    }

    /// Renders owners and occupied sparse entries for debugging.
    #[must_use]
    pub fn debug_dump(&self) -> String {
        let owners: Vec<String> = self.owners.iter().map(|o| o.raw().to_string()).collect();
        let sparse: Vec<String> = self
            .sparse
            .iter()
            .enumerate()
            .filter(|&(_, &slot)| slot != ABSENT)
            .map(|(id, slot)| format!("{id}->{slot}"))
            .collect();
        format!("owners: [{}] sparse: {{{}}}", owners.join(" "), sparse.join(", "))
    }

    fn trace_dump(&self) {
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(component = C::component_name(), dump = %self.debug_dump());
        }
    }
}

impl<C: Component> Default for ComponentStore<C> {
    fn default() -> Self {
        Self::new(&RegistryConfig::default())
    }
}

/// Type-erased view of a [`ComponentStore`].
///
/// Exposes only what the registry needs without knowing the component type;
/// typed access goes through [`ErasedStore::as_any`] and a downcast.
pub trait ErasedStore: Any {
    /// Removes `entity`'s component, if any. Returns whether one was removed.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Checks if `entity` has a component in this store.
    fn contains_entity(&self, entity: Entity) -> bool;

    /// Number of stored components.
    fn len(&self) -> usize;

    /// Returns `true` if the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every component.
    fn clear(&mut self);

    /// Name of the stored component type.
    fn component_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete store.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete store.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedStore for ComponentStore<C> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn clear(&mut self) {
        ComponentStore::clear(self);
    }

    fn component_name(&self) -> &'static str {
        C::component_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
