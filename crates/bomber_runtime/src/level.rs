//! Text level layouts
//!
//! One character per cell, first line at the top:
//!
//! | char | content              |
//! |------|----------------------|
//! | `#`  | unbreakable wall     |
//! | `C`  | chest                |
//! | `x`  | crate                |
//! | `r`  | rubble               |
//! | `P`  | player spawn         |
//! | `E`  | enemy                |
//! | `S`  | enemy that summons   |
//! | `.`  | empty (also space)   |

use crate::error::{RuntimeError, RuntimeResult};
use bomber_explosion::TerrainKind;
use bomber_math::Cell;

/// An enemy placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemySpawn {
    /// Cell the enemy starts on
    pub cell: Cell,
    /// Whether it spawns minions
    pub summoner: bool,
}

/// Parsed level
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Terrain tiles
    pub terrain: Vec<(Cell, TerrainKind)>,
    /// Player spawn
    pub player: Cell,
    /// Enemy placements
    pub enemies: Vec<EnemySpawn>,
}

impl Level {
    /// Parse a layout
    pub fn parse(text: &str) -> RuntimeResult<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .skip_while(|l| l.trim().is_empty())
            .collect();
        let rows = lines.len();

        let mut terrain = Vec::new();
        let mut players = Vec::new();
        let mut enemies = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let y = (rows - 1 - row) as i32;
            for (column, ch) in line.chars().enumerate() {
                let cell = Cell::new(column as i32, y);
                match ch {
                    '#' => terrain.push((cell, TerrainKind::Unbreakable)),
                    'C' => terrain.push((cell, TerrainKind::Chest)),
                    'x' => terrain.push((cell, TerrainKind::Crate)),
                    'r' => terrain.push((cell, TerrainKind::Rubble)),
                    'P' => players.push(cell),
                    'E' => enemies.push(EnemySpawn { cell, summoner: false }),
                    'S' => enemies.push(EnemySpawn { cell, summoner: true }),
                    '.' | ' ' => {}
                    _ => {
                        return Err(RuntimeError::UnknownTile {
                            ch,
                            line: row + 1,
                            column: column + 1,
                        })
                    }
                }
            }
        }

        match players.as_slice() {
            [player] => Ok(Self {
                terrain,
                player: *player,
                enemies,
            }),
            _ => Err(RuntimeError::PlayerSpawns(players.len())),
        }
    }
}

/// Arena used by the headless runner
pub const DEMO_LEVEL: &str = "\
#########
#P.x.C..#
#.#.#.#.#
#..x..E.#
#.#r#.#.#
#...S...#
#########";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let level = Level::parse(
            "###\n\
             #P#\n\
             #E#\n\
             #Cx",
        )
        .unwrap();
        // Bottom line is y = 0
        assert_eq!(level.player, Cell::new(1, 2));
        assert_eq!(level.enemies, vec![EnemySpawn { cell: Cell::new(1, 1), summoner: false }]);
        assert!(level.terrain.contains(&(Cell::new(1, 0), TerrainKind::Chest)));
        assert!(level.terrain.contains(&(Cell::new(2, 0), TerrainKind::Crate)));
        assert_eq!(level.terrain.len(), 10);
    }

    #[test]
    fn test_player_count() {
        assert!(matches!(Level::parse("#..#"), Err(RuntimeError::PlayerSpawns(0))));
        assert!(matches!(Level::parse("PP"), Err(RuntimeError::PlayerSpawns(2))));
    }

    #[test]
    fn test_unknown_tile() {
        let err = Level::parse("P\n?").unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownTile { ch: '?', line: 2, column: 1 }));
    }

    #[test]
    fn test_demo_level() {
        let level = Level::parse(DEMO_LEVEL).unwrap();
        assert_eq!(level.enemies.len(), 2);
        assert!(level.enemies.iter().any(|e| e.summoner));
    }
}
