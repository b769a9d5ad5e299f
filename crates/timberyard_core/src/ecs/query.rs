//! # Multi-component Queries
//!
//! A query is a tuple of component types, `(C1, .., Cn)` with `n <= 8`.
//! Running it intersects the entity sets of the participating stores:
//!
//! 1. Fetch every participating store; a missing store means no matches
//! 2. Take the owners of the smallest store as candidates
//! 3. Keep candidates present in every other store
//!
//! The empty tuple `()` is a valid query that never matches anything.

use super::component::Component;
use super::entity::Entity;
use super::registry::Registry;
use super::storage::ComponentStore;

/// A set of component types that can be intersected.
///
/// Implemented for tuples of up to eight [`Component`] types and for `()`.
pub trait Query {
    /// Borrowed stores taking part in the query.
    type Stores<'r>;

    /// One result row: the entity and a reference to each component.
    type Row<'r>;

    /// Looks up every participating store. `None` if any has never been
    /// created.
    fn fetch(registry: &Registry) -> Option<Self::Stores<'_>>;

    /// Owners of the smallest participating store.
    fn candidates<'r>(stores: &Self::Stores<'r>) -> &'r [Entity];

    /// Checks if `entity` is present in every participating store.
    fn contains_all(stores: &Self::Stores<'_>, entity: Entity) -> bool;

    /// Builds the row for `entity`, or `None` if a component is missing.
    fn row<'r>(stores: &Self::Stores<'r>, entity: Entity) -> Option<Self::Row<'r>>;
}

impl Query for () {
    type Stores<'r> = ();
    type Row<'r> = (Entity,);

    fn fetch(_registry: &Registry) -> Option<Self::Stores<'_>> {
        None
    }

    fn candidates<'r>(_stores: &Self::Stores<'r>) -> &'r [Entity] {
        &[]
    }

    fn contains_all(_stores: &Self::Stores<'_>, _entity: Entity) -> bool {
        false
    }

    fn row<'r>(_stores: &Self::Stores<'r>, _entity: Entity) -> Option<Self::Row<'r>> {
        None
    }
}

macro_rules! impl_query {
    ($($c:ident),+) => {
        #[allow(non_snake_case)]
        impl<$($c: Component),+> Query for ($($c,)+) {
            type Stores<'r> = ($(&'r ComponentStore<$c>,)+);
            type Row<'r> = (Entity, $(&'r $c,)+);

            fn fetch(registry: &Registry) -> Option<Self::Stores<'_>> {
                Some(($(registry.store::<$c>()?,)+))
            }

            fn candidates<'r>(stores: &Self::Stores<'r>) -> &'r [Entity] {
                let ($($c,)+) = *stores;
                [$($c.entities(),)+]
                    .into_iter()
                    .min_by_key(|owners| owners.len())
                    .unwrap_or(&[])
            }

            fn contains_all(stores: &Self::Stores<'_>, entity: Entity) -> bool {
                let ($($c,)+) = *stores;
                $($c.contains(entity))&&+
            }

            fn row<'r>(stores: &Self::Stores<'r>, entity: Entity) -> Option<Self::Row<'r>> {
                let ($($c,)+) = *stores;
                Some((entity, $($c.try_get(entity)?,)+))
            }
        }
    };
}

impl_query!(A);
impl_query!(A, B);
impl_query!(A, B, C);
impl_query!(A, B, C, D);
impl_query!(A, B, C, D, E);
impl_query!(A, B, C, D, E, F);
impl_query!(A, B, C, D, E, F, G);
impl_query!(A, B, C, D, E, F, G, H);
