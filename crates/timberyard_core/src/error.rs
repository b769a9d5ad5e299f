//! # Registry Error Types
//!
//! All errors that can occur in the entity-component runtime. None of them
//! are transient: the caller is expected to treat them as bugs.

use thiserror::Error;

use crate::ecs::Entity;

/// Errors that can occur when operating on a registry or component store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// `get`, `get_mut` or `replace` on an entity without that component.
    #[error("entity {entity} has no {component} component")]
    ComponentNotFound {
        /// The entity that was looked up.
        entity: Entity,
        /// The component type name.
        component: &'static str,
    },

    /// `insert` on an entity that already has that component.
    #[error("entity {entity} already has a {component} component")]
    ComponentAlreadyPresent {
        /// The entity that was targeted.
        entity: Entity,
        /// The component type name.
        component: &'static str,
    },

    /// Entity id beyond a store's bound, or no ids left to allocate.
    #[error("entity {entity} exceeds capacity: max_entities is {max_entities}")]
    CapacityExceeded {
        /// The offending entity.
        entity: Entity,
        /// The exclusive bound that was hit.
        max_entities: u32,
    },

    /// The null entity was passed to a mutating operation.
    #[error("the null entity cannot own components")]
    NullEntity,

    /// Invalid configuration file or values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
