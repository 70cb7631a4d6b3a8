//! Physics query contract (shape casts and overlaps)
//!
//! The combat core never talks to a physics engine directly. Perception,
//! blast propagation and the tick loop only see [`PhysicsQuery`], which the
//! Rapier-backed [`PhysicsWorld`](crate::world::PhysicsWorld) implements.

use crate::layers::{ColliderTag, CollisionLayer, LayerMask};
use bomber_core::EntityId;
use bomber_math::Vec2;

/// One hit along a shape cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeCastHit {
    /// Entity owning the collider that was hit
    pub entity: EntityId,
    /// Tag of the collider
    pub tag: ColliderTag,
    /// Layer of the collider
    pub layer: CollisionLayer,
    /// Distance travelled along the cast before contact
    pub distance: f32,
    /// Centre of the cast shape at contact
    pub point: Vec2,
}

/// A collider overlapping a point or shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapHit {
    /// Entity owning the collider
    pub entity: EntityId,
    /// Tag of the collider
    pub tag: ColliderTag,
    /// Layer of the collider
    pub layer: CollisionLayer,
}

/// Options for shape cast queries
#[derive(Debug, Clone)]
pub struct ShapeCastOptions {
    /// Maximum distance for the cast
    pub max_distance: f32,
    /// Radius of the swept circle
    pub radius: f32,
    /// Layers the cast can hit
    pub filter: LayerMask,
    /// Only hit solid colliders (not sensors)
    pub solid_only: bool,
    /// Entities to ignore
    pub exclude: Vec<EntityId>,
}

impl Default for ShapeCastOptions {
    fn default() -> Self {
        Self {
            max_distance: f32::MAX,
            radius: 0.1,
            filter: LayerMask::ALL,
            solid_only: true,
            exclude: Vec::new(),
        }
    }
}

impl ShapeCastOptions {
    /// Set maximum distance
    pub fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_distance = distance;
        self
    }

    /// Set the swept circle radius
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Set collision filter
    pub fn with_filter(mut self, filter: LayerMask) -> Self {
        self.filter = filter;
        self
    }

    /// Set whether to hit sensors
    pub fn with_sensors(mut self, include_sensors: bool) -> Self {
        self.solid_only = !include_sensors;
        self
    }

    /// Add an entity to ignore
    pub fn exclude(mut self, entity: EntityId) -> Self {
        self.exclude.push(entity);
        self
    }
}

/// Query interface consumed by the combat core
pub trait PhysicsQuery {
    /// Sweep a circle from `origin` along `direction`; hits are ordered by
    /// distance, nearest first.
    fn shape_cast(
        &self,
        origin: Vec2,
        direction: Vec2,
        options: &ShapeCastOptions,
    ) -> Vec<ShapeCastHit>;

    /// Colliders (sensors included) containing `point`
    fn overlap_point(&self, point: Vec2, filter: LayerMask) -> Vec<OverlapHit>;

    /// Colliders (sensors included) intersecting an axis-aligned box
    fn overlap_box(&self, center: Vec2, half_extents: Vec2, filter: LayerMask) -> Vec<OverlapHit>;

    /// Whether any collider in `filter` contains `point`
    fn is_blocked(&self, point: Vec2, filter: LayerMask) -> bool {
        !self.overlap_point(point, filter).is_empty()
    }
}

/// Sort hits nearest first
pub fn sort_hits(hits: &mut [ShapeCastHit]) {
    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
