//! Blast propagation
//!
//! A blast covers its origin cell and travels up to `power` cells in each
//! cardinal direction. A blocked cell still receives a tile, the last one in
//! that direction.

use bomber_math::{Cell, Direction, Vec2};
use bomber_physics::{LayerMask, PhysicsQuery};
use serde::{Deserialize, Serialize};

/// Reports whether a grid cell stops a blast
pub trait ObstacleProbe {
    /// Whether `cell` holds an obstacle
    fn is_blocked(&self, cell: Cell) -> bool;
}

impl<F> ObstacleProbe for F
where
    F: Fn(Cell) -> bool,
{
    fn is_blocked(&self, cell: Cell) -> bool {
        self(cell)
    }
}

/// Probes cells by point-querying the physics world at their centres
pub struct PhysicsObstacles<'a, Q: PhysicsQuery + ?Sized> {
    query: &'a Q,
    mask: LayerMask,
}

impl<'a, Q: PhysicsQuery + ?Sized> PhysicsObstacles<'a, Q> {
    /// Probe `mask` layers through `query`
    pub fn new(query: &'a Q, mask: LayerMask) -> Self {
        Self { query, mask }
    }
}

impl<Q: PhysicsQuery + ?Sized> ObstacleProbe for PhysicsObstacles<'_, Q> {
    fn is_blocked(&self, cell: Cell) -> bool {
        self.query.is_blocked(cell.center(), self.mask)
    }
}

/// Timing of blast fire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    /// Lifetime of the origin tile
    pub base_lifetime: f32,
    /// Extra lifetime per step away from the origin
    pub step_extension: f32,
    /// Collision is disabled this long before a tile is removed
    pub collision_lead: f32,
    /// Damage dealt to actors touching the fire
    pub damage: f32,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            base_lifetime: 0.7,
            step_extension: 0.2,
            collision_lead: 0.05,
            damage: 50.0,
        }
    }
}

impl ExplosionConfig {
    /// Lifetime of a tile `step` cells away from the origin
    pub fn lifetime(&self, step: u32) -> f32 {
        self.base_lifetime + step as f32 * self.step_extension
    }
}

/// One fire tile produced by a blast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlastTile {
    /// Grid cell
    pub cell: Cell,
    /// Cells away from the origin (0 for the origin)
    pub step: u32,
    /// Ray the tile belongs to; `None` for the origin
    pub direction: Option<Direction>,
    /// Whether the ray stopped on this cell because it is an obstacle
    pub terminal: bool,
}

impl BlastTile {
    /// World position of the tile
    pub fn position(&self) -> Vec2 {
        self.cell.center()
    }
}

/// Every tile of one blast, origin first then rays in Up/Down/Left/Right order
#[derive(Debug, Clone, PartialEq)]
pub struct BlastPattern {
    /// Centre of the blast
    pub origin: Cell,
    /// Radius in cells
    pub power: u32,
    /// Tiles
    pub tiles: Vec<BlastTile>,
}

impl BlastPattern {
    /// Number of tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether there are no tiles
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Whether a tile covers `cell`
    pub fn contains(&self, cell: Cell) -> bool {
        self.tiles.iter().any(|t| t.cell == cell)
    }

    /// Cells covered, in tile order
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.tiles.iter().map(|t| t.cell)
    }

    /// Tiles of one ray, nearest first
    pub fn ray(&self, direction: Direction) -> impl Iterator<Item = &BlastTile> + '_ {
        self.tiles
            .iter()
            .filter(move |t| t.direction == Some(direction))
    }
}

/// Compute the tiles of a blast of `power` centred on `origin`
pub fn explode<P: ObstacleProbe + ?Sized>(origin: Cell, power: u32, obstacles: &P) -> BlastPattern {
    let mut tiles = Vec::with_capacity(1 + 4 * power as usize);
    tiles.push(BlastTile {
        cell: origin,
        step: 0,
        direction: None,
        terminal: false,
    });

    for direction in Direction::CARDINALS {
        for step in 1..=power {
            let cell = origin + direction.offset() * step as i32;
            let blocked = obstacles.is_blocked(cell);
            tiles.push(BlastTile {
                cell,
                step,
                direction: Some(direction),
                terminal: blocked,
            });
            if blocked {
                log::trace!("Blast from {} stopped {:?} at {}", origin, direction, cell);
                break;
            }
        }
    }

    BlastPattern {
        origin,
        power,
        tiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn open(_: Cell) -> bool {
        false
    }

    #[test]
    fn test_power_two_open_field() {
        let pattern = explode(Cell::ORIGIN, 2, &open);
        let mut cells: Vec<_> = pattern.cells().collect();
        cells.sort();

        let mut expected = vec![
            Cell::new(0, 0),
            Cell::new(0, 1),
            Cell::new(0, 2),
            Cell::new(0, -1),
            Cell::new(0, -2),
            Cell::new(-1, 0),
            Cell::new(-2, 0),
            Cell::new(1, 0),
            Cell::new(2, 0),
        ];
        expected.sort();
        assert_eq!(cells, expected);
        assert!(pattern.tiles.iter().all(|t| !t.terminal));
    }

    #[test]
    fn test_obstacle_truncates_ray() {
        let wall = |cell: Cell| cell == Cell::new(1, 0);
        let pattern = explode(Cell::ORIGIN, 3, &wall);

        let right: Vec<_> = pattern.ray(Direction::Right).collect();
        assert_eq!(right.len(), 1);
        assert_eq!(right[0].cell, Cell::new(1, 0));
        assert!(right[0].terminal);
        assert!(!pattern.contains(Cell::new(2, 0)));

        for direction in [Direction::Up, Direction::Down, Direction::Left] {
            assert_eq!(pattern.ray(direction).count(), 3);
        }
        assert_eq!(pattern.len(), 1 + 1 + 3 * 3);
    }

    #[test]
    fn test_tiles_per_direction() {
        for power in 0..5u32 {
            let pattern = explode(Cell::new(4, -2), power, &open);
            assert_eq!(pattern.len(), 1 + 4 * power as usize);
            for direction in Direction::CARDINALS {
                // power + 1 counting the origin
                assert_eq!(pattern.ray(direction).count() + 1, power as usize + 1);
            }
        }
    }

    #[test]
    fn test_tile_order_and_lifetimes() {
        let pattern = explode(Cell::ORIGIN, 1, &open);
        let directions: Vec<_> = pattern.tiles.iter().map(|t| t.direction).collect();
        assert_eq!(
            directions,
            vec![
                None,
                Some(Direction::Up),
                Some(Direction::Down),
                Some(Direction::Left),
                Some(Direction::Right)
            ]
        );

        let config = ExplosionConfig::default();
        assert_relative_eq!(config.lifetime(0), 0.7);
        assert_relative_eq!(config.lifetime(2), 1.1, epsilon = 1e-6);
    }
}
