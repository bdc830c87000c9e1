pub mod entity;
pub mod collision;
pub mod app;
pub mod config;
pub mod error;

pub use app::{FrameContext, FrameDriver, PhysicsStep, ScriptFailure, TickReport};
pub use collision::{CollisionIndex, CollisionInfo, Contact};
pub use config::{DriverConfig, WorldConfig};
pub use entity::{CommandBuffer, Component, EntityHandle, World};
pub use error::{EcsError, Result};

pub type Vf32x2 = cgmath::Vector2<f32>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::default_components::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Health {
        cur: i32,
        max: i32,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Bullet {
        damage: i32,
    }

    crate::component_table! {
        fn register_game_components;
        Health => LinearStore,
        Bullet => DenseStore,
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn game_world() -> World {
        let mut world = World::new();
        register_default_components(&mut world).unwrap();
        register_game_components(&mut world).unwrap();
        world
    }

    fn health_script(entity: EntityHandle, health: &mut Health, frame: &mut FrameContext<'_>) -> Result<()> {
        for other in frame.collisions.touching(entity.index()) {
            let Some(bullet_entity) = frame.world.handle_at(other) else {
                continue;
            };
            if !frame.world.has_comp::<Bullet>(bullet_entity)? {
                continue;
            }
            let bullet = frame.world.get_comp::<Bullet>(bullet_entity)?;
            health.cur = (health.cur - bullet.damage).max(0);
            frame.commands.destroy(bullet_entity);
        }
        Ok(())
    }

    #[test]
    fn bullet_hit_costs_health() {
        init_logger();
        let mut world = game_world();
        let target = world.create().unwrap();
        world.entity(target).unwrap().with(Health{cur: 100, max: 100}).unwrap().spawn().unwrap();
        let bullet = world.create().unwrap();
        world.entity(bullet).unwrap().with(Bullet{damage: 10}).unwrap().spawn().unwrap();

        let mut driver = FrameDriver::new(world, DriverConfig::default().with_logger(false));
        let mut fed = false;
        driver.set_physics(move |_: &mut World, _: f32| {
            if std::mem::replace(&mut fed, true) {
                Vec::new()
            } else {
                vec![CollisionInfo::new(target.index(), bullet.index())]
            }
        });
        driver.add_script::<Health, _>("health", health_script);

        let report = driver.tick();
        assert!(report.is_clean());
        assert_eq!(report.collision_pairs, 1);
        let world = driver.world();
        assert_eq!(*world.get_comp::<Health>(target).unwrap(), Health{cur: 90, max: 100});
        assert!(!world.is_valid(bullet));

        let report = driver.tick();
        assert_eq!(report.collision_pairs, 0);
        assert_eq!(driver.world().get_comp::<Health>(target).unwrap().cur, 90);
    }

    #[test]
    fn scripts_destroy_through_commands_and_move_through_components() {
        init_logger();
        let mut world = game_world();
        let mut handles = Vec::new();
        for i in 0..5 {
            let entity = world.create().unwrap();
            world
                .entity(entity)
                .unwrap()
                .with(Transform::default())
                .unwrap()
                .with(Velocity(Vf32x2::new(1.0, 0.0)))
                .unwrap()
                .with(Lifetime{remaining: 0.1 * i as f32 - 0.05})
                .unwrap()
                .spawn()
                .unwrap();
            handles.push(entity);
        }

        let config = DriverConfig::default().with_logger(false).with_fixed_delta_time(std::time::Duration::from_millis(100));
        let mut driver = FrameDriver::new(world, config);
        driver.set_physics(|world: &mut World, delta_time: f32| {
            let mut transforms = world.store_mut::<Transform>().unwrap();
            let velocities = world.store::<Velocity>().unwrap();
            for (transform, velocity) in crate::iterate_over_components!(mut transforms, velocities) {
                transform.position += velocity.0 * delta_time;
            }
            Vec::new()
        });
        driver.add_script::<Lifetime, _>("lifetime", |entity, lifetime, frame| {
            lifetime.remaining -= frame.delta_time;
            if lifetime.remaining <= 0.0 {
                frame.commands.destroy(entity);
            }
            Ok(())
        });

        let report = driver.tick();
        assert!(report.is_clean());
        assert_eq!(report.script_calls, 5);
        let world = driver.world();
        assert_eq!(world.entity_count(), 3);
        assert!(!world.is_valid(handles[0]) && !world.is_valid(handles[1]));
        let moved = world.get_comp::<Transform>(handles[4]).unwrap().position.x;
        assert!((moved - 0.1).abs() < 1e-6);
        assert_eq!(world.component_count::<Velocity>(), 3);
    }

    #[test]
    fn destroyed_slot_is_reused_with_new_version() {
        let mut world = game_world();
        let first = world.create().unwrap();
        world.add_comp(first, Name("first".into())).unwrap();
        world.destroy(first).unwrap();
        let second = world.create().unwrap();
        assert_eq!(second.index(), first.index());
        assert_ne!(second.version(), first.version());
        assert_eq!(world.get_comp::<Name>(first).err(), Some(EcsError::StaleHandle(first)));
        assert!(!world.has_comp::<Name>(second).unwrap());
    }
}
