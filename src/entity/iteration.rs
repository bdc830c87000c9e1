//! Joins over component stores, driven by the first store given.
//!
//! The stores are anything with `iter_entity`/`get`/`has` keyed by entity index, usually
//! [`StoreRef`](crate::entity::StoreRef) and [`StoreMut`](crate::entity::StoreMut) borrowed from a world.
//! Only the driving store can be walked mutably; the rest are read.
//! A `not` prefix turns a store into an exclusion filter.

#[doc(hidden)]
#[macro_export]
macro_rules! expand_iteration {
    // every store joined, shape the item
    (@finish components $index:ident [$($joined:ident),*]) => {{
        let _ = $index;
        Some(($($joined,)*))
    }};
    (@finish entities $index:ident [$($joined:ident),*]) => {{
        let _ = ($($joined,)*);
        Some($index)
    }};
    (@finish (handles $world:expr) $index:ident [$($joined:ident),*]) => {
        Some(($world.handle_at($index)?, $($joined),*))
    };

    (@join $shape:tt $index:ident [$($joined:ident),*]) => {
        $crate::expand_iteration!(@finish $shape $index [$($joined),*])
    };
    (@join $shape:tt $index:ident [$($joined:ident),*] not $store:expr $(, $($rest:tt)+)?) => {{
        if $store.has($index) {
            return None;
        }
        $crate::expand_iteration!(@join $shape $index [$($joined),*] $($($rest)+)?)
    }};
    (@join $shape:tt $index:ident [$($joined:ident),*] $store:expr $(, $($rest:tt)+)?) => {{
        let value = $store.get($index)?;
        $crate::expand_iteration!(@join $shape $index [$($joined,)* value] $($($rest)+)?)
    }};

    ($shape:tt, $driver:expr $(, $($rest:tt)+)?) => {
        $driver.filter_map(|(index, first)| {
            $crate::expand_iteration!(@join $shape index [first] $($($rest)+)?)
        })
    };
}

/// Yields `(entity handle, &first, &rest...)` for every entity present in all given stores.
///
/// syntax: `iterate_over_entities_components!(world, (mut)? first_store, (not)? store, ...)`
#[macro_export]
macro_rules! iterate_over_entities_components {
    ($world:expr, mut $first_store:expr $(, $($rest:tt)+)?) => {
        $crate::expand_iteration!((handles $world), $first_store.iter_entity_mut() $(, $($rest)+)?)
    };

    ($world:expr, $first_store:expr $(, $($rest:tt)+)?) => {
        $crate::expand_iteration!((handles $world), $first_store.iter_entity() $(, $($rest)+)?)
    };
}

/// Like [`iterate_over_entities_components!`] without the entity.
#[macro_export]
macro_rules! iterate_over_components {
    (mut $first_store:expr $(, $($rest:tt)+)?) => {
        $crate::expand_iteration!(components, $first_store.iter_entity_mut() $(, $($rest)+)?)
    };

    ($first_store:expr $(, $($rest:tt)+)?) => {
        $crate::expand_iteration!(components, $first_store.iter_entity() $(, $($rest)+)?)
    };
}

/// Entity indices present in all given stores.
#[macro_export]
macro_rules! iterate_over_entities {
    ($first_store:expr $(, $($rest:tt)+)?) => {
        $crate::expand_iteration!(entities, $first_store.iter_entity() $(, $($rest)+)?)
    };
}

#[cfg(test)]
mod tests {
    use crate::entity::*;

    #[derive(Debug, PartialEq)]
    struct Pos(i32);
    #[derive(Debug, PartialEq)]
    struct Vel(i32);
    #[derive(Debug, PartialEq)]
    struct Frozen;

    crate::component_table! {
        fn register_iteration_components;
        Pos => LinearStore,
        Vel => DenseStore,
        Frozen => HashStore,
    }

    fn world() -> (World, Vec<EntityHandle>) {
        let mut world = World::new();
        register_iteration_components(&mut world).unwrap();
        let handles: Vec<_> = (0..4).map(|_| world.create().unwrap()).collect();
        for (i, entity) in handles.iter().enumerate() {
            world.add_comp(*entity, Pos(i as i32)).unwrap();
        }
        world.add_comp(handles[1], Vel(10)).unwrap();
        world.add_comp(handles[2], Vel(20)).unwrap();
        world.add_comp(handles[3], Vel(30)).unwrap();
        world.add_comp(handles[3], Frozen).unwrap();
        (world, handles)
    }

    #[test]
    fn mutable_join_with_exclusion() {
        let (world, handles) = world();
        {
            let mut pos = world.store_mut::<Pos>().unwrap();
            let vel = world.store::<Vel>().unwrap();
            let frozen = world.store::<Frozen>().unwrap();
            for (p, v) in crate::iterate_over_components!(mut pos, vel, not frozen) {
                p.0 += v.0;
            }
        }
        let moved: Vec<_> = handles.iter().map(|e| world.get_comp::<Pos>(*e).unwrap().0).collect();
        assert_eq!(moved, vec![0, 11, 22, 3]);
    }

    #[test]
    fn entities_and_handles() {
        let (world, handles) = world();
        let pos = world.store::<Pos>().unwrap();
        let vel = world.store::<Vel>().unwrap();

        let mut indices: Vec<_> = crate::iterate_over_entities!(vel, pos).collect();
        indices.sort();
        assert_eq!(indices, vec![1, 2, 3]);

        let frozen = world.store::<Frozen>().unwrap();
        let mut thawed: Vec<_> = crate::iterate_over_entities!(pos, not frozen, vel).collect();
        thawed.sort();
        assert_eq!(thawed, vec![1, 2]);

        let single: Vec<_> = crate::iterate_over_components!(frozen).map(|(marker,)| marker).collect();
        assert_eq!(single, vec![&Frozen]);

        let mut joined: Vec<_> = crate::iterate_over_entities_components!(world, vel, pos)
            .map(|(entity, v, p)| (entity, v.0, p.0))
            .collect();
        joined.sort_by_key(|(entity, _, _)| entity.index());
        assert_eq!(joined, vec![(handles[1], 10, 1), (handles[2], 20, 2), (handles[3], 30, 3)]);
    }
}
