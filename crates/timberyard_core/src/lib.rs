//! # Timberyard Core
//!
//! The entity-component runtime behind the Timberyard tile editor and game
//! systems:
//! - Entities are opaque, never-recycled ids
//! - Each component type lives in its own sparse-set store
//! - Queries intersect stores and hand back rows of component references
//!
//! ## Architecture Rules
//!
//! 1. **The core owns data, not behaviour** - systems live with the caller
//! 2. **No ambient globals** - all state is owned by a [`Registry`]
//! 3. **No undefined behaviour on misuse** - missing components are errors
//!
//! ## Example
//!
//! ```rust
//! use timberyard_core::{Entity, Registry, TilePosition};
//!
//! #[derive(Debug, PartialEq)]
//! struct Tag;
//!
//! let mut registry = Registry::new();
//! let e1 = registry.create();
//! let e2 = registry.create();
//! registry.insert(e1, TilePosition::new(0, 0)).unwrap();
//! registry.insert(e2, TilePosition::new(1, 1)).unwrap();
//! registry.insert(e2, Tag).unwrap();
//!
//! let rows = registry.query::<(TilePosition, Tag)>();
//! assert_eq!(rows, vec![(e2, &TilePosition::new(1, 1), &Tag)]);
//! assert_eq!(e1, Entity::from_raw(1));
//! ```

#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::RegistryConfig;
pub use ecs::{
    Blocked, Component, ComponentStore, Entity, ErasedStore, Position, Query, Registry, TileKind,
    TilePosition,
};
pub use error::{RegistryError, RegistryResult};
