//! Query world backed by Rapier 2D
//!
//! Only the collision side of Rapier is used: colliders are free-standing
//! (no rigid bodies) and moved by the game loop. The query pipeline answers
//! shape casts and overlap tests for the combat core.

use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::layers::{ColliderTag, CollisionLayer, LayerMask};
use crate::query::{sort_hits, OverlapHit, PhysicsQuery, ShapeCastHit, ShapeCastOptions};
use bomber_core::EntityId;
use bomber_math::Vec2;
use rapier2d::parry::query::ShapeCastOptions as RapierShapeCastOptions;
use rapier2d::parry::shape::{Ball, Cuboid};
use rapier2d::prelude as rapier;
use std::collections::{HashMap, HashSet};

/// Shape of a collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    /// Circle with a radius
    Circle { radius: f32 },
    /// Axis-aligned box with half extents
    Box { half_extents: Vec2 },
}

impl ColliderShape {
    /// Box covering one grid tile
    pub fn tile(half_extent: f32) -> Self {
        Self::Box {
            half_extents: Vec2::splat(half_extent),
        }
    }

    fn to_rapier(self) -> rapier::SharedShape {
        match self {
            Self::Circle { radius } => rapier::SharedShape::ball(radius),
            Self::Box { half_extents } => rapier::SharedShape::cuboid(half_extents.x, half_extents.y),
        }
    }
}

/// Description of a collider to insert
#[derive(Debug, Clone, Copy)]
pub struct ColliderDesc {
    /// Collider shape
    pub shape: ColliderShape,
    /// World position of the shape centre
    pub position: Vec2,
    /// Game object kind
    pub tag: ColliderTag,
    /// Collision layer
    pub layer: CollisionLayer,
    /// Whether this is a sensor
    pub is_sensor: bool,
}

impl ColliderDesc {
    /// Create a description using the tag's default layer and sensor flag
    pub fn new(tag: ColliderTag, shape: ColliderShape, position: Vec2) -> Self {
        Self {
            shape,
            position,
            tag,
            layer: tag.default_layer(),
            is_sensor: tag.is_sensor(),
        }
    }

    /// Override the layer
    pub fn with_layer(mut self, layer: CollisionLayer) -> Self {
        self.layer = layer;
        self
    }

    /// Override the sensor flag
    pub fn with_sensor(mut self, is_sensor: bool) -> Self {
        self.is_sensor = is_sensor;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct ColliderInfo {
    entity: EntityId,
    tag: ColliderTag,
    layer: CollisionLayer,
}

/// Collider storage and spatial queries
pub struct PhysicsWorld {
    config: PhysicsConfig,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,
    islands: rapier::IslandManager,
    query_pipeline: rapier::QueryPipeline,
    entity_to_collider: HashMap<EntityId, rapier::ColliderHandle>,
    info: HashMap<rapier::ColliderHandle, ColliderInfo>,
    disabled: HashSet<rapier::ColliderHandle>,
    dirty: bool,
}

impl PhysicsWorld {
    /// Create an empty world
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            islands: rapier::IslandManager::new(),
            query_pipeline: rapier::QueryPipeline::new(),
            entity_to_collider: HashMap::new(),
            info: HashMap::new(),
            disabled: HashSet::new(),
            dirty: false,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Insert the collider of an entity
    pub fn insert(&mut self, entity: EntityId, desc: ColliderDesc) -> Result<()> {
        if self.entity_to_collider.contains_key(&entity) {
            return Err(PhysicsError::DuplicateEntity(entity));
        }

        let collider = rapier::ColliderBuilder::new(desc.shape.to_rapier())
            .translation(rapier::Vector::new(desc.position.x, desc.position.y))
            .sensor(desc.is_sensor)
            .collision_groups(rapier::InteractionGroups::new(
                rapier::Group::from_bits_truncate(desc.layer.as_mask()),
                rapier::Group::ALL,
            ))
            .user_data(entity.to_user_data())
            .build();

        let handle = self.colliders.insert(collider);
        self.entity_to_collider.insert(entity, handle);
        self.info.insert(
            handle,
            ColliderInfo {
                entity,
                tag: desc.tag,
                layer: desc.layer,
            },
        );
        self.mark_dirty_and_sync();
        log::trace!("Inserted {:?} collider for {}", desc.tag, entity);
        Ok(())
    }

    /// Remove the collider of an entity
    pub fn remove(&mut self, entity: EntityId) -> Result<()> {
        let handle = self
            .entity_to_collider
            .remove(&entity)
            .ok_or(PhysicsError::ColliderNotFound(entity))?;
        self.colliders
            .remove(handle, &mut self.islands, &mut self.bodies, true);
        self.info.remove(&handle);
        self.disabled.remove(&handle);
        self.mark_dirty_and_sync();
        log::trace!("Removed collider of {}", entity);
        Ok(())
    }

    /// Whether the entity has a collider
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entity_to_collider.contains_key(&entity)
    }

    /// Number of colliders
    pub fn len(&self) -> usize {
        self.entity_to_collider.len()
    }

    /// Whether the world has no colliders
    pub fn is_empty(&self) -> bool {
        self.entity_to_collider.is_empty()
    }

    /// Move an entity's collider. Queries see the new position after [`sync`](Self::sync).
    pub fn set_position(&mut self, entity: EntityId, position: Vec2) -> Result<()> {
        let handle = self.handle(entity)?;
        let collider = self
            .colliders
            .get_mut(handle)
            .ok_or(PhysicsError::ColliderNotFound(entity))?;
        collider.set_translation(rapier::Vector::new(position.x, position.y));
        self.dirty = true;
        Ok(())
    }

    /// Current position of an entity's collider
    pub fn position(&self, entity: EntityId) -> Result<Vec2> {
        let handle = self.handle(entity)?;
        let collider = self
            .colliders
            .get(handle)
            .ok_or(PhysicsError::ColliderNotFound(entity))?;
        let t = collider.translation();
        Ok(Vec2::new(t.x, t.y))
    }

    /// Enable or disable an entity's collider. Disabled colliders never
    /// show up in query results.
    pub fn set_enabled(&mut self, entity: EntityId, enabled: bool) -> Result<()> {
        let handle = self.handle(entity)?;
        if enabled {
            self.disabled.remove(&handle);
        } else {
            self.disabled.insert(handle);
        }
        Ok(())
    }

    /// Whether an entity's collider is enabled
    pub fn is_enabled(&self, entity: EntityId) -> bool {
        self.entity_to_collider
            .get(&entity)
            .map(|h| !self.disabled.contains(h))
            .unwrap_or(false)
    }

    /// Tag of an entity's collider
    pub fn tag(&self, entity: EntityId) -> Option<ColliderTag> {
        self.entity_to_collider
            .get(&entity)
            .and_then(|h| self.info.get(h))
            .map(|info| info.tag)
    }

    /// Whether positions changed since the last sync
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the query acceleration structure if anything moved
    pub fn sync(&mut self) {
        if self.dirty {
            self.query_pipeline.update(&self.colliders);
            self.dirty = false;
        }
    }

    /// Every collider intersecting the collider of `entity` (itself excluded)
    pub fn overlapping(&self, entity: EntityId, filter: LayerMask) -> Result<Vec<OverlapHit>> {
        let handle = self.handle(entity)?;
        let collider = self
            .colliders
            .get(handle)
            .ok_or(PhysicsError::ColliderNotFound(entity))?;
        if self.disabled.contains(&handle) {
            return Ok(Vec::new());
        }

        let exclude = [handle];
        let predicate = |h: rapier::ColliderHandle, _: &rapier::Collider| self.accepts(h, &exclude);
        let query_filter = Self::layer_filter(filter).predicate(&predicate);

        let mut hits = Vec::new();
        self.query_pipeline.intersections_with_shape(
            &self.bodies,
            &self.colliders,
            collider.position(),
            collider.shape(),
            query_filter,
            |h| {
                if let Some(hit) = self.overlap_hit(h) {
                    hits.push(hit);
                }
                true
            },
        );
        Ok(hits)
    }

    fn handle(&self, entity: EntityId) -> Result<rapier::ColliderHandle> {
        self.entity_to_collider
            .get(&entity)
            .copied()
            .ok_or(PhysicsError::ColliderNotFound(entity))
    }

    fn mark_dirty_and_sync(&mut self) {
        self.dirty = true;
        self.sync();
    }

    fn accepts(&self, handle: rapier::ColliderHandle, exclude: &[rapier::ColliderHandle]) -> bool {
        !self.disabled.contains(&handle) && !exclude.contains(&handle)
    }

    fn layer_filter<'a>(filter: LayerMask) -> rapier::QueryFilter<'a> {
        rapier::QueryFilter::new().groups(rapier::InteractionGroups::new(
            rapier::Group::ALL,
            rapier::Group::from_bits_truncate(filter.bits()),
        ))
    }

    fn overlap_hit(&self, handle: rapier::ColliderHandle) -> Option<OverlapHit> {
        self.info.get(&handle).map(|info| OverlapHit {
            entity: info.entity,
            tag: info.tag,
            layer: info.layer,
        })
    }
}

impl PhysicsQuery for PhysicsWorld {
    fn shape_cast(
        &self,
        origin: Vec2,
        direction: Vec2,
        options: &ShapeCastOptions,
    ) -> Vec<ShapeCastHit> {
        let dir = direction.normalize();
        if dir == Vec2::ZERO || options.filter.is_empty() {
            return Vec::new();
        }

        let ball = Ball::new(options.radius.max(f32::EPSILON));
        let pos = rapier::Isometry::translation(origin.x, origin.y);
        let vel = rapier::Vector::new(dir.x, dir.y);
        let mut exclude: Vec<rapier::ColliderHandle> = options
            .exclude
            .iter()
            .filter_map(|e| self.entity_to_collider.get(e).copied())
            .collect();
        let mut hits = Vec::new();

        // Rapier reports the nearest hit only; repeat with the previous hits
        // excluded to collect everything along the path.
        while hits.len() < self.config.max_cast_hits {
            let predicate =
                |h: rapier::ColliderHandle, _: &rapier::Collider| self.accepts(h, &exclude);
            let mut filter = Self::layer_filter(options.filter).predicate(&predicate);
            if options.solid_only {
                filter = filter.exclude_sensors();
            }

            let cast_options = RapierShapeCastOptions {
                max_time_of_impact: options.max_distance,
                stop_at_penetration: true,
                ..Default::default()
            };

            let Some((handle, hit)) = self.query_pipeline.cast_shape(
                &self.bodies,
                &self.colliders,
                &pos,
                &vel,
                &ball,
                cast_options,
                filter,
            ) else {
                break;
            };

            if let Some(info) = self.info.get(&handle) {
                let point = origin + dir * hit.time_of_impact;
                hits.push(ShapeCastHit {
                    entity: info.entity,
                    tag: info.tag,
                    layer: info.layer,
                    distance: hit.time_of_impact,
                    point,
                });
            }
            exclude.push(handle);
        }

        sort_hits(&mut hits);
        hits
    }

    fn overlap_point(&self, point: Vec2, filter: LayerMask) -> Vec<OverlapHit> {
        if filter.is_empty() {
            return Vec::new();
        }
        let predicate = |h: rapier::ColliderHandle, _: &rapier::Collider| self.accepts(h, &[]);
        let query_filter = Self::layer_filter(filter).predicate(&predicate);

        let mut hits = Vec::new();
        self.query_pipeline.intersections_with_point(
            &self.bodies,
            &self.colliders,
            &rapier::Point::new(point.x, point.y),
            query_filter,
            |h| {
                if let Some(hit) = self.overlap_hit(h) {
                    hits.push(hit);
                }
                true
            },
        );
        hits
    }

    fn overlap_box(&self, center: Vec2, half_extents: Vec2, filter: LayerMask) -> Vec<OverlapHit> {
        if filter.is_empty() {
            return Vec::new();
        }
        let shape = Cuboid::new(rapier::Vector::new(half_extents.x, half_extents.y));
        let pos = rapier::Isometry::translation(center.x, center.y);
        let predicate = |h: rapier::ColliderHandle, _: &rapier::Collider| self.accepts(h, &[]);
        let query_filter = Self::layer_filter(filter).predicate(&predicate);

        let mut hits = Vec::new();
        self.query_pipeline.intersections_with_shape(
            &self.bodies,
            &self.colliders,
            &pos,
            &shape,
            query_filter,
            |h| {
                if let Some(hit) = self.overlap_hit(h) {
                    hits.push(hit);
                }
                true
            },
        );
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(PhysicsConfig::default()).unwrap()
    }

    fn wall(world: &mut PhysicsWorld, raw: u64, x: f32, y: f32) -> EntityId {
        let id = EntityId::from_raw(raw);
        world
            .insert(
                id,
                ColliderDesc::new(ColliderTag::Unbreakable, ColliderShape::tile(0.5), Vec2::new(x, y)),
            )
            .unwrap();
        id
    }

    #[test]
    fn test_insert_and_remove() {
        let mut world = world();
        let id = wall(&mut world, 1, 0.0, 0.0);
        assert!(world.contains(id));
        assert_eq!(world.tag(id), Some(ColliderTag::Unbreakable));
        assert!(matches!(
            world.insert(id, ColliderDesc::new(ColliderTag::Breakable, ColliderShape::tile(0.5), Vec2::ZERO)),
            Err(PhysicsError::DuplicateEntity(_))
        ));

        world.remove(id).unwrap();
        assert!(world.is_empty());
        assert!(matches!(world.remove(id), Err(PhysicsError::ColliderNotFound(_))));
    }

    #[test]
    fn test_shape_cast_orders_hits() {
        let mut world = world();
        let far = wall(&mut world, 1, 4.0, 0.0);
        let near = wall(&mut world, 2, 2.0, 0.0);

        let hits = world.shape_cast(
            Vec2::ZERO,
            Vec2::X,
            &ShapeCastOptions::default().with_max_distance(10.0),
        );
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entity, near);
        assert_eq!(hits[1].entity, far);
        assert_relative_eq!(hits[0].distance, 1.4, epsilon = 1e-3);
    }

    #[test]
    fn test_shape_cast_respects_filter_and_exclusion() {
        let mut world = world();
        let wall_id = wall(&mut world, 1, 2.0, 0.0);
        let enemy = EntityId::from_raw(2);
        world
            .insert(
                enemy,
                ColliderDesc::new(ColliderTag::Enemy, ColliderShape::tile(0.35), Vec2::new(1.0, 0.0)),
            )
            .unwrap();

        let options = ShapeCastOptions::default()
            .with_max_distance(5.0)
            .with_filter(LayerMask::obstacles());
        let hits = world.shape_cast(Vec2::ZERO, Vec2::X, &options);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, wall_id);

        let hits = world.shape_cast(Vec2::ZERO, Vec2::X, &options.exclude(wall_id));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_disabled_collider_is_invisible() {
        let mut world = world();
        let id = wall(&mut world, 1, 0.0, 0.0);
        assert!(world.is_blocked(Vec2::ZERO, LayerMask::obstacles()));

        world.set_enabled(id, false).unwrap();
        assert!(!world.is_blocked(Vec2::ZERO, LayerMask::obstacles()));
        assert!(!world.is_enabled(id));
    }

    #[test]
    fn test_moved_collider_after_sync() {
        let mut world = world();
        let id = wall(&mut world, 1, 0.0, 0.0);
        world.set_position(id, Vec2::new(3.0, 0.0)).unwrap();
        assert!(world.is_dirty());
        world.sync();

        assert!(!world.is_blocked(Vec2::ZERO, LayerMask::obstacles()));
        assert!(world.is_blocked(Vec2::new(3.0, 0.0), LayerMask::obstacles()));
        assert_relative_eq!(world.position(id).unwrap().x, 3.0);
    }

    #[test]
    fn test_overlapping_sensor() {
        let mut world = world();
        let fire = EntityId::from_raw(1);
        let player = EntityId::from_raw(2);
        world
            .insert(fire, ColliderDesc::new(ColliderTag::Fire, ColliderShape::tile(0.5), Vec2::ZERO))
            .unwrap();
        world
            .insert(
                player,
                ColliderDesc::new(ColliderTag::Player, ColliderShape::tile(0.35), Vec2::new(0.5, 0.0)),
            )
            .unwrap();

        let hits = world.overlapping(fire, LayerMask::actors()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, player);
        assert_eq!(hits[0].tag, ColliderTag::Player);
    }

    #[test]
    fn test_overlap_box() {
        let mut world = world();
        wall(&mut world, 1, 1.0, 0.0);
        wall(&mut world, 2, 5.0, 0.0);
        let hits = world.overlap_box(Vec2::ZERO, Vec2::new(1.0, 0.2), LayerMask::obstacles());
        assert_eq!(hits.len(), 1);
    }
}
