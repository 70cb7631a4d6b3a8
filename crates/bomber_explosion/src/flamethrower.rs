//! Flamethrower spray pattern
//!
//! One shot sprays rows of three flames (centre, left, right) along the
//! facing direction, then optionally up, down and backwards. Spawns are
//! staggered in time; each one is checked against obstacles when it is due.

use bomber_math::{Direction, Vec2};
use bomber_physics::{LayerMask, PhysicsQuery, ShapeCastOptions};
use serde::{Deserialize, Serialize};

/// Flamethrower configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlameConfig {
    /// Rows per direction
    pub length: u32,
    /// Spread of the side flames, in tiles
    pub spread_width: f32,
    /// Distance between rows
    pub spawn_offset: f32,
    /// Delay between two rows; flames inside a row are a third apart
    pub stagger: f32,
    /// Lifetime of one flame
    pub lifetime: f32,
    /// Spray forward only (1) or in all four directions (4)
    pub directions: u32,
    /// Half extent of the obstacle check around a spawn point
    pub clearance: f32,
}

impl Default for FlameConfig {
    fn default() -> Self {
        Self {
            length: 3,
            spread_width: 3.0,
            spawn_offset: 1.0,
            stagger: 0.1,
            lifetime: 2.0,
            directions: 4,
            clearance: 0.4,
        }
    }
}

/// One scheduled flame, relative to the shooter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlameSpawn {
    /// Unit direction from the shooter
    pub direction: Vec2,
    /// Distance from the shooter
    pub distance: f32,
    /// Seconds after the trigger
    pub delay: f32,
}

impl FlameSpawn {
    /// Spawn position for a shooter standing at `origin`
    pub fn position(&self, origin: Vec2) -> Vec2 {
        origin + self.direction * self.distance
    }
}

fn spray_line(
    main: Vec2,
    side: Vec2,
    start: f32,
    config: &FlameConfig,
    out: &mut Vec<FlameSpawn>,
) {
    let spread = config.spread_width / 2.0;
    let third = config.stagger / 3.0;
    let directions = [main, main + side * spread, main - side * spread];

    for row in 0..config.length {
        let distance = (row + 1) as f32 * config.spawn_offset;
        let row_start = start + row as f32 * config.stagger;
        for (i, direction) in directions.iter().enumerate() {
            out.push(FlameSpawn {
                direction: direction.normalize(),
                distance,
                delay: row_start + i as f32 * third,
            });
        }
    }
}

/// Every flame of one shot, ordered by delay
pub fn flame_pattern(facing: Direction, config: &FlameConfig) -> Vec<FlameSpawn> {
    let forward = facing.to_vec2();
    let side = forward.perpendicular();
    let mut spawns = Vec::with_capacity(12 * config.length as usize);

    spray_line(forward, side, 0.0, config, &mut spawns);

    if config.directions >= 4 {
        // The other lines start once the forward line has finished
        let gap = config.stagger * 2.0;
        let first = config.length as f32 * config.stagger + gap;
        spray_line(Vec2::Y, Vec2::X, first, config, &mut spawns);
        spray_line(-Vec2::Y, Vec2::X, first + gap, config, &mut spawns);
        spray_line(-forward, side, first + 2.0 * gap, config, &mut spawns);
    }

    spawns.sort_by(|a, b| a.delay.partial_cmp(&b.delay).unwrap_or(std::cmp::Ordering::Equal));
    spawns
}

/// Whether an obstacle lies between `origin` and the spawn point, or at it
pub fn is_spawn_blocked<Q: PhysicsQuery + ?Sized>(
    query: &Q,
    origin: Vec2,
    spawn: &FlameSpawn,
    obstacles: LayerMask,
    clearance: f32,
) -> bool {
    let options = ShapeCastOptions::default()
        .with_max_distance(spawn.distance)
        .with_radius(0.0)
        .with_filter(obstacles);
    if !query.shape_cast(origin, spawn.direction, &options).is_empty() {
        return true;
    }
    !query
        .overlap_box(spawn.position(origin), Vec2::splat(clearance), obstacles)
        .is_empty()
}
