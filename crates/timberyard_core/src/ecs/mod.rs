//! # Entity Component System
//!
//! A sparse-set ECS for single-threaded, once-per-frame consumers.
//!
//! ## Design Philosophy
//!
//! - One sparse-set store per component type, created on first write
//! - Components are stored in dense, gap-free arrays for cache efficiency
//! - Entity IDs are plain counters and are never reused
//! - Queries intersect stores starting from the smallest one

mod component;
mod entity;
pub mod query;
mod registry;
mod storage;

pub use component::{Blocked, Component, Position, TileKind, TilePosition};
pub use entity::Entity;
pub use query::Query;
pub use registry::Registry;
pub use storage::{ComponentStore, ErasedStore};
