//! # Component System
//!
//! Components are plain values with no behavior. Any `'static` type can be
//! attached to an entity; one store is kept per distinct type.
//!
//! A handful of common components used by the tile editor and movement code
//! are defined here so that every consumer agrees on their layout.

use bytemuck::{Pod, Zeroable};

/// Marker trait for ECS components.
///
/// Implemented for every `'static` type. The bound exists so stores can be
/// keyed by [`std::any::TypeId`] and held behind a type-erased box.
pub trait Component: 'static {
    /// Human readable name used in errors and logs.
    #[must_use]
    fn component_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<T: 'static> Component for T {}

/// Position component in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Position {
    /// X coordinate in world space.
    pub x: f32,
    /// Y coordinate in world space.
    pub y: f32,
}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Integer grid coordinate of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct TilePosition {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl TilePosition {
    /// Creates a new tile coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate offset by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Terrain kind of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TileKind {
    /// Nothing painted yet.
    #[default]
    Empty,
    /// Walkable grass.
    Grass,
    /// Walkable dirt path.
    Dirt,
    /// Impassable water.
    Water,
    /// Impassable cliff.
    Cliff,
}

impl TileKind {
    /// Whether units can walk over this tile.
    #[inline]
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Grass | Self::Dirt)
    }
}

/// Tag component: the entity blocks movement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blocked;
