//! Line-of-sight perception
//!
//! An observer sees a target when the target is inside its detection radius
//! and a thin circle swept from the observer toward the target reaches the
//! target before any obstacle.

use bomber_core::{CombatError, EntityId};
use bomber_math::Vec2;
use bomber_physics::{LayerMask, PhysicsQuery, ShapeCastOptions};
use serde::{Deserialize, Serialize};

/// Outcome of one visibility evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionResult {
    /// Whether the target is visible
    pub visible: bool,
    /// Distance between observer and target
    pub distance: f32,
}

impl PerceptionResult {
    /// Target not visible at `distance`
    pub fn hidden(distance: f32) -> Self {
        Self {
            visible: false,
            distance,
        }
    }
}

/// Sight settings of an observer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SightConfig {
    /// Detection radius
    pub radius: f32,
    /// Radius of the swept circle
    pub cast_radius: f32,
    /// Layers that block sight
    pub obstacle_mask: LayerMask,
}

impl Default for SightConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            cast_radius: 0.1,
            obstacle_mask: LayerMask::obstacles(),
        }
    }
}

impl SightConfig {
    /// Set detection radius
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Set the obstacle mask
    pub fn with_obstacle_mask(mut self, mask: LayerMask) -> Self {
        self.obstacle_mask = mask;
        self
    }

    /// Configuration problems worth a warning. Never fatal.
    pub fn warnings(&self) -> Vec<CombatError> {
        let mut warnings = Vec::new();
        if self.obstacle_mask.is_empty() {
            warnings.push(CombatError::Configuration(
                "obstacle mask is empty, nothing blocks line of sight".into(),
            ));
        }
        if self.radius <= 0.0 {
            warnings.push(CombatError::Configuration(format!(
                "detection radius {} never sees anything",
                self.radius
            )));
        }
        warnings
    }
}

/// Evaluate visibility of `target` from `observer`
pub fn perceive<Q: PhysicsQuery + ?Sized>(
    query: &Q,
    observer: EntityId,
    from: Vec2,
    target: EntityId,
    to: Vec2,
    config: &SightConfig,
) -> PerceptionResult {
    let distance = from.distance(to);
    if distance > config.radius {
        return PerceptionResult::hidden(distance);
    }
    if distance <= f32::EPSILON {
        // Same spot: nothing can lie in between
        return PerceptionResult {
            visible: true,
            distance,
        };
    }

    let options = ShapeCastOptions::default()
        .with_max_distance(distance)
        .with_radius(config.cast_radius)
        .with_filter(LayerMask::ALL)
        .exclude(observer);
    let hits = query.shape_cast(from, to - from, &options);

    let Some(target_hit) = hits.iter().find(|h| h.entity == target) else {
        return PerceptionResult::hidden(distance);
    };

    let blocked = hits.iter().any(|h| {
        h.entity != observer
            && h.entity != target
            && config.obstacle_mask.contains(h.layer)
            && h.distance < target_hit.distance
    });

    PerceptionResult {
        visible: !blocked,
        distance,
    }
}

/// Whether `target` is visible from `observer`
pub fn can_see<Q: PhysicsQuery + ?Sized>(
    query: &Q,
    observer: EntityId,
    from: Vec2,
    target: EntityId,
    to: Vec2,
    config: &SightConfig,
) -> bool {
    perceive(query, observer, from, target, to, config).visible
}

/// Per-observer perception state
#[derive(Debug, Clone)]
pub struct Perceiver {
    /// Observer entity
    pub observer: EntityId,
    /// Sight settings
    pub config: SightConfig,
    last: Option<PerceptionResult>,
}

impl Perceiver {
    /// Create a perceiver, logging configuration warnings once
    pub fn new(observer: EntityId, config: SightConfig) -> Self {
        for warning in config.warnings() {
            log::warn!("{}: {}", observer, warning);
        }
        Self {
            observer,
            config,
            last: None,
        }
    }

    /// Evaluate visibility for this tick and remember the result
    pub fn evaluate<Q: PhysicsQuery + ?Sized>(
        &mut self,
        query: &Q,
        from: Vec2,
        target: EntityId,
        to: Vec2,
    ) -> PerceptionResult {
        let result = perceive(query, self.observer, from, target, to, &self.config);
        if self.last.map(|l| l.visible) != Some(result.visible) {
            log::debug!(
                "{} {} {} at {:.2}",
                self.observer,
                if result.visible { "sees" } else { "lost" },
                target,
                result.distance
            );
        }
        self.last = Some(result);
        result
    }

    /// Result of the last evaluation
    pub fn last(&self) -> Option<PerceptionResult> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomber_physics::{ColliderTag, CollisionLayer, OverlapHit, ShapeCastHit};

    /// Returns a fixed hit list, trimmed to the cast distance and exclusions
    struct ScriptedQuery {
        hits: Vec<ShapeCastHit>,
    }

    impl ScriptedQuery {
        fn new(hits: &[(u64, ColliderTag, f32)]) -> Self {
            Self {
                hits: hits
                    .iter()
                    .map(|&(raw, tag, distance)| ShapeCastHit {
                        entity: EntityId::from_raw(raw),
                        tag,
                        layer: tag.default_layer(),
                        distance,
                        point: Vec2::ZERO,
                    })
                    .collect(),
            }
        }
    }

    impl PhysicsQuery for ScriptedQuery {
        fn shape_cast(&self, _: Vec2, _: Vec2, options: &ShapeCastOptions) -> Vec<ShapeCastHit> {
            self.hits
                .iter()
                .filter(|h| h.distance <= options.max_distance)
                .filter(|h| !options.exclude.contains(&h.entity))
                .filter(|h| options.filter.contains(h.layer))
                .copied()
                .collect()
        }

        fn overlap_point(&self, _: Vec2, _: LayerMask) -> Vec<OverlapHit> {
            Vec::new()
        }

        fn overlap_box(&self, _: Vec2, _: Vec2, _: LayerMask) -> Vec<OverlapHit> {
            Vec::new()
        }
    }

    const ENEMY: u64 = 1;
    const PLAYER: u64 = 2;

    fn look(query: &ScriptedQuery, to: Vec2) -> PerceptionResult {
        perceive(
            query,
            EntityId::from_raw(ENEMY),
            Vec2::ZERO,
            EntityId::from_raw(PLAYER),
            to,
            &SightConfig::default(),
        )
    }

    #[test]
    fn test_out_of_radius_is_not_visible() {
        let query = ScriptedQuery::new(&[(PLAYER, ColliderTag::Player, 5.5)]);
        let result = look(&query, Vec2::new(6.0, 0.0));
        assert!(!result.visible);
        assert_eq!(result.distance, 6.0);
    }

    #[test]
    fn test_clear_line_is_visible() {
        let query = ScriptedQuery::new(&[
            (ENEMY, ColliderTag::Enemy, 0.0),
            (PLAYER, ColliderTag::Player, 2.5),
        ]);
        assert!(look(&query, Vec2::new(3.0, 0.0)).visible);
    }

    #[test]
    fn test_obstacle_in_front_blocks() {
        let query = ScriptedQuery::new(&[
            (5, ColliderTag::Unbreakable, 1.4),
            (PLAYER, ColliderTag::Player, 2.5),
        ]);
        assert!(!look(&query, Vec2::new(3.0, 0.0)).visible);
    }

    #[test]
    fn test_obstacle_at_same_distance_does_not_block() {
        let query = ScriptedQuery::new(&[
            (5, ColliderTag::Breakable, 2.5),
            (PLAYER, ColliderTag::Player, 2.5),
        ]);
        assert!(look(&query, Vec2::new(3.0, 0.0)).visible);
    }

    #[test]
    fn test_non_obstacles_do_not_block() {
        let query = ScriptedQuery::new(&[
            (7, ColliderTag::Minion, 0.8),
            (8, ColliderTag::Bomb, 1.2),
            (PLAYER, ColliderTag::Player, 2.5),
        ]);
        assert!(look(&query, Vec2::new(3.0, 0.0)).visible);
    }

    #[test]
    fn test_empty_query_is_not_visible() {
        let query = ScriptedQuery::new(&[]);
        assert!(!look(&query, Vec2::new(3.0, 0.0)).visible);
    }

    #[test]
    fn test_empty_mask_warns_and_nothing_blocks() {
        let config = SightConfig::default().with_obstacle_mask(LayerMask::NONE);
        assert_eq!(config.warnings().len(), 1);

        let query = ScriptedQuery::new(&[
            (5, ColliderTag::Unbreakable, 1.0),
            (PLAYER, ColliderTag::Player, 2.5),
        ]);
        let mut perceiver = Perceiver::new(EntityId::from_raw(ENEMY), config);
        let result = perceiver.evaluate(&query, Vec2::ZERO, EntityId::from_raw(PLAYER), Vec2::new(3.0, 0.0));
        assert!(result.visible);
        assert_eq!(perceiver.last(), Some(result));
        assert_eq!(CollisionLayer::GROUND, ColliderTag::Unbreakable.default_layer());
    }
}
