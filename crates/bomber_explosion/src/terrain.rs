//! Destructible terrain
//!
//! The tile map is shared between every fire tile of a tick, so it lives
//! behind a lock and clearing a cell is a single check-and-remove.

use crate::explosion::ObstacleProbe;
use bomber_math::Cell;
use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Kind of a terrain tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Indestructible wall
    Unbreakable,
    /// Always drops a pickup
    Chest,
    /// Sometimes drops a pickup
    Crate,
    /// Never drops anything
    Rubble,
}

impl TerrainKind {
    /// Whether fire can destroy this tile
    pub fn is_breakable(&self) -> bool {
        !matches!(self, Self::Unbreakable)
    }
}

/// Access to the terrain grid
pub trait TerrainProvider {
    /// Whether a tile occupies `cell`
    fn has_tile(&self, cell: Cell) -> bool;

    /// Kind of the tile at `cell`
    fn kind(&self, cell: Cell) -> Option<TerrainKind>;

    /// Destroy a breakable tile. Returns `true` only for the call that
    /// actually removed it; unbreakable or empty cells return `false`.
    fn clear_tile(&self, cell: Cell) -> bool;
}

/// Plain tile storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileMap {
    tiles: HashMap<Cell, TerrainKind>,
}

impl TileMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a tile, replacing what was there
    pub fn insert(&mut self, cell: Cell, kind: TerrainKind) -> Option<TerrainKind> {
        self.tiles.insert(cell, kind)
    }

    /// Tile at `cell`
    pub fn get(&self, cell: Cell) -> Option<TerrainKind> {
        self.tiles.get(&cell).copied()
    }

    /// Remove a breakable tile, returning its kind
    pub fn take_breakable(&mut self, cell: Cell) -> Option<TerrainKind> {
        match self.tiles.get(&cell) {
            Some(kind) if kind.is_breakable() => self.tiles.remove(&cell),
            _ => None,
        }
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// All tiles
    pub fn iter(&self) -> impl Iterator<Item = (Cell, TerrainKind)> + '_ {
        self.tiles.iter().map(|(c, k)| (*c, *k))
    }
}

impl FromIterator<(Cell, TerrainKind)> for TileMap {
    fn from_iter<I: IntoIterator<Item = (Cell, TerrainKind)>>(iter: I) -> Self {
        Self {
            tiles: iter.into_iter().collect(),
        }
    }
}

/// Tile map shared by the world and every fire tile
#[derive(Debug, Clone, Default)]
pub struct SharedTerrain {
    inner: Arc<RwLock<TileMap>>,
}

impl SharedTerrain {
    /// Wrap a tile map
    pub fn new(map: TileMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Remove a breakable tile under a single write lock, returning its kind
    pub fn take_breakable(&self, cell: Cell) -> Option<TerrainKind> {
        self.inner.write().take_breakable(cell)
    }

    /// Place a tile
    pub fn insert(&self, cell: Cell, kind: TerrainKind) {
        self.inner.write().insert(cell, kind);
    }

    /// Copy of the current map
    pub fn snapshot(&self) -> TileMap {
        self.inner.read().clone()
    }

    /// Number of tiles left
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no tiles are left
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl TerrainProvider for SharedTerrain {
    fn has_tile(&self, cell: Cell) -> bool {
        self.inner.read().get(cell).is_some()
    }

    fn kind(&self, cell: Cell) -> Option<TerrainKind> {
        self.inner.read().get(cell)
    }

    fn clear_tile(&self, cell: Cell) -> bool {
        self.take_breakable(cell).is_some()
    }
}

impl ObstacleProbe for SharedTerrain {
    fn is_blocked(&self, cell: Cell) -> bool {
        self.has_tile(cell)
    }
}

/// Chance that a destroyed tile drops a pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropPolicy {
    /// Chest drop chance
    pub chest: f64,
    /// Crate drop chance
    pub crate_chance: f64,
    /// Rubble drop chance
    pub rubble: f64,
}

impl Default for DropPolicy {
    fn default() -> Self {
        Self {
            chest: 1.0,
            crate_chance: 0.3,
            rubble: 0.0,
        }
    }
}

impl DropPolicy {
    /// Drop chance of a tile kind. A NaN chance never drops.
    pub fn chance(&self, kind: TerrainKind) -> f64 {
        let chance = match kind {
            TerrainKind::Unbreakable => 0.0,
            TerrainKind::Chest => self.chest,
            TerrainKind::Crate => self.crate_chance,
            TerrainKind::Rubble => self.rubble,
        };
        if chance.is_nan() {
            0.0
        } else {
            chance.clamp(0.0, 1.0)
        }
    }

    /// First chance that is not a finite number, by field name
    pub fn non_finite(&self) -> Option<(&'static str, f64)> {
        [
            ("chest", self.chest),
            ("crate_chance", self.crate_chance),
            ("rubble", self.rubble),
        ]
        .into_iter()
        .find(|(_, chance)| !chance.is_finite())
    }

    /// Roll whether a destroyed tile of `kind` drops a pickup
    pub fn rolls_drop<R: Rng>(&self, kind: TerrainKind, rng: &mut R) -> bool {
        let chance = self.chance(kind);
        chance > 0.0 && rng.gen_bool(chance)
    }
}
