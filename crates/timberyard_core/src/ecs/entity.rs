//! # Entity Management
//!
//! Entities are plain identifiers that join components across stores:
//! - A strictly positive index into every store's sparse table
//! - `0` is reserved as the null entity
//! - Ids are handed out by a monotonic counter and never recycled

use std::fmt;

/// Unique identifier for an entity.
///
/// An entity carries no data of its own. It only exists as a key that
/// component stores agree on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(u32);

impl Entity {
    /// Null/invalid entity. Never returned by the allocator.
    pub const NULL: Self = Self(0);

    /// Creates an entity from its raw id.
    ///
    /// Intended for callers that persist raw ids (level files, tests). The
    /// registry never validates that such an id was allocated.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the id as an index into sparse tables.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks if this is the null entity.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic entity id allocator.
///
/// Starts at 1 and only ever counts up. Ids are bounded by `limit`
/// (exclusive); once the limit is reached every further allocation fails.
#[derive(Clone, Debug)]
pub(crate) struct EntityAllocator {
    next: u32,
    limit: u32,
}

impl EntityAllocator {
    /// Creates an allocator that hands out ids in `1..limit`.
    pub(crate) const fn new(limit: u32) -> Self {
        Self { next: 1, limit }
    }

    /// Allocates the next id, or `None` when the id space is exhausted.
    #[inline]
    pub(crate) fn allocate(&mut self) -> Option<Entity> {
        if self.next >= self.limit {
            return None;
        }
        let entity = Entity(self.next);
        self.next += 1;
        Some(entity)
    }

    /// Number of ids handed out so far.
    #[inline]
    pub(crate) const fn allocated(&self) -> u32 {
        self.next - 1
    }
}
