//! # ECS Registry
//!
//! The central container for all entities and components.
//!
//! One [`ComponentStore`] exists per component type, created lazily the
//! first time that type is written. Stores are held type-erased in a single
//! map keyed by [`TypeId`] and downcast on typed access.
//!
//! ## Calling convention
//!
//! Query rows borrow the registry, so the borrow checker forbids mutating
//! while rows are alive. Collect entity ids first, then mutate:
//!
//! ```rust
//! use timberyard_core::{Blocked, Registry, TileKind, TilePosition};
//!
//! let mut registry = Registry::new();
//! let tile = registry.create();
//! registry.insert(tile, TilePosition::new(0, 0)).unwrap();
//! registry.insert(tile, TileKind::Water).unwrap();
//!
//! for entity in registry.entities_with::<(TilePosition, TileKind)>() {
//!     if !registry.get::<TileKind>(entity).unwrap().is_walkable() {
//!         registry.insert_or_replace(entity, Blocked).unwrap();
//!     }
//! }
//! assert!(registry.has::<Blocked>(tile));
//! ```

use std::any::TypeId;
use std::collections::HashMap;

use super::component::Component;
use super::entity::{Entity, EntityAllocator};
use super::query::Query;
use super::storage::{check_entity, ComponentStore, ErasedStore};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};

/// Exclusive bound on allocated entity ids.
///
/// Allocation is independent of `max_entities`, which only bounds the ids a
/// store accepts.
const ID_SPACE: u32 = u32::MAX;

/// The ECS registry - owner of every component store and the entity counter.
///
/// Entities are allocated from a monotonic counter starting at 1 and are
/// never reused. There is no explicit destroy: [`Registry::remove_entity`]
/// strips every component, after which the id may still receive new ones.
pub struct Registry {
    /// One store per component type.
    stores: HashMap<TypeId, Box<dyn ErasedStore>>,
    /// Monotonic id source.
    allocator: EntityAllocator,
    /// Sizing used for every store created by this registry.
    config: RegistryConfig,
}

impl Registry {
    /// Creates a registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(RegistryConfig::default())
    }

    /// Creates a registry from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn with_config(config: RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: RegistryConfig) -> Self {
        tracing::debug!(
            max_entities = config.max_entities,
            initial_sparse_capacity = config.initial_sparse_capacity,
            store_capacity_hint = config.store_capacity_hint,
            "registry created"
        );
        Self {
            stores: HashMap::new(),
            allocator: EntityAllocator::new(ID_SPACE),
            config,
        }
    }

    /// Returns the configuration this registry was built from.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Allocates a new entity with no components.
    ///
    /// Allocation does not depend on `max_entities`; an id at or above it is
    /// handed out normally and only rejected when a component is inserted.
    ///
    /// # Panics
    ///
    /// Panics once all `u32` ids have been handed out. Use
    /// [`Registry::try_create`] to handle that case.
    pub fn create(&mut self) -> Entity {
        match self.try_create() {
            Ok(entity) => entity,
            Err(err) => panic!("{err}"),
        }
    }

    /// Allocates a new entity with no components.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::CapacityExceeded`] once every `u32` id has
    /// been handed out.
    pub fn try_create(&mut self) -> RegistryResult<Entity> {
        self.allocator
            .allocate()
            .ok_or(RegistryError::CapacityExceeded {
                entity: Entity::from_raw(ID_SPACE),
                max_entities: ID_SPACE,
            })
    }

    /// Number of entity ids handed out so far.
    #[inline]
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.allocator.allocated()
    }

    /// Removes `entity` from every store. Returns how many components were
    /// removed.
    ///
    /// This is the closest thing to destroying an entity; the id remains
    /// valid and can receive new components afterwards.
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        let mut removed = 0;
        for store in self.stores.values_mut() {
            if store.remove_entity(entity) {
                removed += 1;
            }
        }
        tracing::debug!(%entity, removed, "entity stripped of all components");
        removed
    }

    /// Checks if `entity` has at least one component.
    #[must_use]
    pub fn is_attached(&self, entity: Entity) -> bool {
        self.stores.values().any(|store| store.contains_entity(entity))
    }

    // =========================================================================
    // Stores
    // =========================================================================

    /// Returns the store for `C`, if one has been created.
    #[must_use]
    pub fn store<C: Component>(&self) -> Option<&ComponentStore<C>> {
        self.stores
            .get(&TypeId::of::<C>())?
            .as_any()
            .downcast_ref::<ComponentStore<C>>()
    }

    /// Returns the store for `C`, creating it on first use.
    pub fn store_mut<C: Component>(&mut self) -> &mut ComponentStore<C> {
        let config = &self.config;
        let store = self.stores.entry(TypeId::of::<C>()).or_insert_with(|| {
            tracing::debug!(component = C::component_name(), "component store created");
            Box::new(ComponentStore::<C>::new(config)) as Box<dyn ErasedStore>
        });
        match store.as_any_mut().downcast_mut::<ComponentStore<C>>() {
            Some(store) => store,
            None => unreachable!("store keyed by TypeId of a different component"),
        }
    }

    /// Existing store for `C`, without creating one.
    fn existing_store_mut<C: Component>(&mut self) -> Option<&mut ComponentStore<C>> {
        self.stores
            .get_mut(&TypeId::of::<C>())?
            .as_any_mut()
            .downcast_mut::<ComponentStore<C>>()
    }

    /// Number of component stores created so far.
    #[inline]
    #[must_use]
    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    /// Names of every component type that has a store, sorted.
    #[must_use]
    pub fn component_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.stores.values().map(|s| s.component_name()).collect();
        names.sort_unstable();
        names
    }

    /// Number of entities with a `C` component.
    #[must_use]
    pub fn len<C: Component>(&self) -> usize {
        self.store::<C>().map_or(0, ComponentStore::len)
    }

    /// Returns `true` if no entity has any component.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.values().all(|store| store.is_empty())
    }

    /// Removes every component from every store.
    ///
    /// Stores and the entity counter are kept; ids are still never reused.
    pub fn clear(&mut self) {
        for store in self.stores.values_mut() {
            store.clear();
        }
    }

    // =========================================================================
    // Typed component access
    // =========================================================================

    /// Attaches `component` to `entity`.
    ///
    /// # Errors
    ///
    /// See [`ComponentStore::insert`]: duplicates, the null entity and ids
    /// beyond `max_entities` are rejected. A rejected entity never creates
    /// the store.
    pub fn insert<C: Component>(&mut self, entity: Entity, component: C) -> RegistryResult<&mut C> {
        check_entity(entity, self.config.max_entities)?;
        self.store_mut::<C>().insert(entity, component)
    }

    /// Overwrites the `C` component of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ComponentNotFound`] if `entity` has no `C`.
    pub fn replace<C: Component>(
        &mut self,
        entity: Entity,
        component: C,
    ) -> RegistryResult<&mut C> {
        match self.existing_store_mut::<C>() {
            Some(store) => store.replace(entity, component),
            None => Err(ComponentStore::<C>::not_found(entity)),
        }
    }

    /// Replaces the `C` component of `entity` if present, inserts it
    /// otherwise.
    ///
    /// # Errors
    ///
    /// See [`ComponentStore::insert_or_replace`].
    pub fn insert_or_replace<C: Component>(
        &mut self,
        entity: Entity,
        component: C,
    ) -> RegistryResult<&mut C> {
        check_entity(entity, self.config.max_entities)?;
        self.store_mut::<C>().insert_or_replace(entity, component)
    }

    /// Gets the `C` component of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ComponentNotFound`] if absent, including
    /// when no `C` has ever been stored.
    pub fn get<C: Component>(&self, entity: Entity) -> RegistryResult<&C> {
        self.store::<C>()
            .ok_or_else(|| ComponentStore::<C>::not_found(entity))?
            .get(entity)
    }

    /// Gets the `C` component of `entity` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ComponentNotFound`] if absent.
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> RegistryResult<&mut C> {
        self.existing_store_mut::<C>()
            .ok_or_else(|| ComponentStore::<C>::not_found(entity))?
            .get_mut(entity)
    }

    /// Checks if `entity` has a `C` component. Never creates a store.
    #[must_use]
    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        self.store::<C>().is_some_and(|store| store.contains(entity))
    }

    /// Detaches the `C` component from `entity`, returning it.
    ///
    /// A no-op returning `None` when absent.
    pub fn remove<C: Component>(&mut self, entity: Entity) -> Option<C> {
        self.existing_store_mut::<C>()?.remove(entity)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns every entity that has all components of `Q`, with references
    /// to each of them.
    ///
    /// `Q` is a tuple of component types; rows are
    /// `(Entity, &C1, .., &Cn)`. The intersection is computed once from the
    /// smallest participating store. Row order follows that store's dense
    /// order and is not stable across removals.
    ///
    /// The empty query `()` always returns no rows.
    #[must_use]
    pub fn query<Q: Query>(&self) -> Vec<Q::Row<'_>> {
        let Some(stores) = Q::fetch(self) else {
            return Vec::new();
        };
        Q::candidates(&stores)
            .iter()
            .filter_map(|&entity| Q::row(&stores, entity))
            .collect()
    }

    /// Returns every entity that has all components of `Q`.
    ///
    /// Same intersection as [`Registry::query`] without the references, so
    /// the registry can be mutated while walking the result.
    #[must_use]
    pub fn entities_with<Q: Query>(&self) -> Vec<Entity> {
        let Some(stores) = Q::fetch(self) else {
            return Vec::new();
        };
        Q::candidates(&stores)
            .iter()
            .copied()
            .filter(|&entity| Q::contains_all(&stores, entity))
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{Blocked, Position, TileKind, TilePosition};

    #[test]
    fn test_registry_creation() {
        let registry = Registry::new();
        assert_eq!(registry.allocated(), 0);
        assert_eq!(registry.store_count(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_create_is_monotonic_from_one() {
        let mut registry = Registry::new();
        assert_eq!(registry.create(), Entity::from_raw(1));
        assert_eq!(registry.create(), Entity::from_raw(2));
        assert_eq!(registry.create(), Entity::from_raw(3));
        assert_eq!(registry.allocated(), 3);
    }

    #[test]
    fn test_create_past_default_max_entities() {
        let mut registry = Registry::new();
        let mut last = Entity::NULL;
        for _ in 0..=crate::config::DEFAULT_MAX_ENTITIES {
            last = registry.create();
        }
        assert_eq!(last, Entity::from_raw(crate::config::DEFAULT_MAX_ENTITIES + 1));
        assert_eq!(registry.allocated(), crate::config::DEFAULT_MAX_ENTITIES + 1);

        // The id is valid; only the store rejects it.
        assert!(matches!(
            registry.insert(last, Blocked),
            Err(RegistryError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_small_max_entities_limits_inserts_not_creates() {
        let config = RegistryConfig {
            max_entities: 3,
            ..RegistryConfig::default()
        };
        let mut registry = Registry::with_config(config).unwrap();
        let ids: Vec<Entity> = (0..5).map(|_| registry.create()).collect();
        assert_eq!(ids.last(), Some(&Entity::from_raw(5)));

        registry.insert(ids[1], Blocked).unwrap();
        assert_eq!(
            registry.insert(ids[2], Blocked).unwrap_err(),
            RegistryError::CapacityExceeded {
                entity: ids[2],
                max_entities: 3,
            }
        );
        assert_eq!(registry.len::<Blocked>(), 1);
    }

    #[test]
    fn test_try_create_exhaustion() {
        let mut registry = Registry::new();
        registry.allocator = EntityAllocator::new(3);
        assert!(registry.try_create().is_ok());
        assert!(registry.try_create().is_ok());
        assert!(matches!(
            registry.try_create(),
            Err(RegistryError::CapacityExceeded { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "exceeds capacity")]
    fn test_create_panics_when_exhausted() {
        let mut registry = Registry::new();
        registry.allocator = EntityAllocator::new(2);
        registry.create();
        registry.create();
    }

    #[test]
    fn test_with_invalid_config() {
        let config = RegistryConfig {
            max_entities: 0,
            ..RegistryConfig::default()
        };
        assert!(matches!(
            Registry::with_config(config),
            Err(RegistryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_stores_are_created_lazily() {
        let mut registry = Registry::new();
        let e = registry.create();

        assert!(!registry.has::<Position>(e));
        assert!(registry.get::<Position>(e).is_err());
        assert_eq!(registry.remove::<Position>(e), None);
        assert!(registry.replace(e, Position::default()).is_err());
        assert_eq!(registry.store_count(), 0);

        registry.insert(e, Position::new(1.0, 1.0)).unwrap();
        assert_eq!(registry.store_count(), 1);
        registry.insert(e, TileKind::Grass).unwrap();
        assert_eq!(registry.store_count(), 2);
        assert_eq!(registry.component_names().len(), 2);
    }

    #[test]
    fn test_rejected_insert_creates_no_store() {
        let config = RegistryConfig {
            max_entities: 4,
            ..RegistryConfig::default()
        };
        let mut registry = Registry::with_config(config).unwrap();

        assert_eq!(
            registry.insert(Entity::NULL, Blocked).unwrap_err(),
            RegistryError::NullEntity
        );
        assert!(matches!(
            registry.insert(Entity::from_raw(4), Blocked),
            Err(RegistryError::CapacityExceeded { .. })
        ));
        assert!(registry
            .insert_or_replace(Entity::NULL, TileKind::Grass)
            .is_err());
        assert!(registry
            .insert_or_replace(Entity::from_raw(9), TileKind::Grass)
            .is_err());
        assert_eq!(registry.store_count(), 0);
        assert!(registry.component_names().is_empty());
    }

    #[test]
    fn test_insert_get_has() {
        let mut registry = Registry::new();
        let e = registry.create();
        registry.insert(e, TilePosition::new(2, 3)).unwrap();
        assert!(registry.has::<TilePosition>(e));
        assert_eq!(*registry.get::<TilePosition>(e).unwrap(), TilePosition::new(2, 3));
        assert!(registry.is_attached(e));
    }

    #[test]
    fn test_get_mut() {
        let mut registry = Registry::new();
        let e = registry.create();
        registry.insert(e, Position::new(0.0, 0.0)).unwrap();
        registry.get_mut::<Position>(e).unwrap().x = 5.0;
        assert!((registry.get::<Position>(e).unwrap().x - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_replace_and_insert_or_replace() {
        let mut registry = Registry::new();
        let e = registry.create();
        registry.insert(e, TileKind::Grass).unwrap();
        registry.replace(e, TileKind::Dirt).unwrap();
        assert_eq!(*registry.get::<TileKind>(e).unwrap(), TileKind::Dirt);

        registry.insert_or_replace(e, TileKind::Water).unwrap();
        assert_eq!(*registry.get::<TileKind>(e).unwrap(), TileKind::Water);
        assert_eq!(registry.len::<TileKind>(), 1);
    }

    #[test]
    fn test_remove_entity_strips_all() {
        let mut registry = Registry::new();
        let e = registry.create();
        let other = registry.create();
        registry.insert(e, TilePosition::new(0, 0)).unwrap();
        registry.insert(e, TileKind::Cliff).unwrap();
        registry.insert(e, Blocked).unwrap();
        registry.insert(other, TileKind::Grass).unwrap();

        assert_eq!(registry.remove_entity(e), 3);
        assert!(!registry.is_attached(e));
        assert!(registry.has::<TileKind>(other));
        assert_eq!(registry.remove_entity(e), 0);

        // The id is not invalidated.
        registry.insert(e, Blocked).unwrap();
        assert!(registry.has::<Blocked>(e));
    }

    #[test]
    fn test_clear_keeps_counter() {
        let mut registry = Registry::new();
        let e = registry.create();
        registry.insert(e, Blocked).unwrap();
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.store_count(), 1);
        assert_eq!(registry.create(), Entity::from_raw(2));
    }

    #[test]
    fn test_query_intersection() {
        let mut registry = Registry::new();
        let a = registry.create();
        let b = registry.create();
        let c = registry.create();
        registry.insert(a, TilePosition::new(0, 0)).unwrap();
        registry.insert(b, TilePosition::new(1, 0)).unwrap();
        registry.insert(c, TilePosition::new(2, 0)).unwrap();
        registry.insert(b, TileKind::Water).unwrap();
        registry.insert(c, TileKind::Grass).unwrap();

        let mut rows = registry.query::<(TilePosition, TileKind)>();
        rows.sort_by_key(|(e, _, _)| *e);
        assert_eq!(
            rows,
            vec![
                (b, &TilePosition::new(1, 0), &TileKind::Water),
                (c, &TilePosition::new(2, 0), &TileKind::Grass),
            ]
        );
    }

    #[test]
    fn test_query_with_missing_store_is_empty() {
        let mut registry = Registry::new();
        let e = registry.create();
        registry.insert(e, TileKind::Grass).unwrap();
        assert!(registry.query::<(TileKind, Blocked)>().is_empty());
        assert!(registry.entities_with::<(TileKind, Blocked)>().is_empty());
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let mut registry = Registry::new();
        let e = registry.create();
        registry.insert(e, Blocked).unwrap();
        assert!(registry.query::<()>().is_empty());
        assert!(registry.entities_with::<()>().is_empty());
    }
}
