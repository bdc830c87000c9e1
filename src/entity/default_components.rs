use cgmath::{Vector2, Vector4};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector2<f32>,
    pub rotation: f32,
    pub scale: Vector2<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self{
            position: Vector2::new(0.0, 0.0),
            rotation: 0.0,
            scale: Vector2::new(1.0, 1.0),
        }
    }
}

/// Transform as of the previous tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OldTransform {
    pub position: Vector2<f32>,
    pub rotation: f32,
}

impl Default for OldTransform {
    fn default() -> Self {
        Self{
            position: Vector2::new(0.0, 0.0),
            rotation: 0.0,
        }
    }
}

impl From<Transform> for OldTransform {
    fn from(transform: Transform) -> Self {
        Self{
            position: transform.position,
            rotation: transform.rotation,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectRenderable {
    pub size: Vector2<f32>,
    pub color: Vector4<f32>,
}

impl Default for RectRenderable {
    fn default() -> Self {
        Self{
            size: Vector2::new(1.0, 1.0),
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// Units per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Velocity(pub Vector2<f32>);

/// Axis aligned box around the entity's position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub half_extents: Vector2<f32>,
    pub layer: u32,
}

impl Collider {
    pub fn new(half_extents: Vector2<f32>) -> Self {
        Self{half_extents, layer: 0}
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Name(pub String);

/// Seconds left before the entity should be destroyed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lifetime {
    pub remaining: f32,
}

crate::component_table! {
    pub fn register_default_components;
    Transform => LinearStore,
    OldTransform => LinearStore,
    RectRenderable => LinearStore,
    Velocity => DenseStore,
    Collider => DenseStore,
    Name => HashStore,
    Lifetime => LookupStore,
}
