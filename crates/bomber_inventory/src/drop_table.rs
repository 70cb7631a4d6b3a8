//! Weighted choice of the pickup a destroyed tile drops

use crate::pickup::PickupKind;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One weighted entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    /// Pickup kind
    pub kind: PickupKind,
    /// Relative weight
    pub weight: u32,
}

/// Weighted pickup table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropTable {
    /// Entries
    pub entries: Vec<DropEntry>,
}

impl Default for DropTable {
    fn default() -> Self {
        Self::new()
            .with(PickupKind::ExtraSpeed, 3)
            .with(PickupKind::ExtraBomb, 3)
            .with(PickupKind::ExtraPower, 3)
            .with(PickupKind::ExtraLife, 1)
            .with(PickupKind::FlameThrowerAmmo, 1)
            .with(PickupKind::HandgunAmmo, 1)
    }
}

impl DropTable {
    /// Empty table
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry
    pub fn with(mut self, kind: PickupKind, weight: u32) -> Self {
        self.entries.push(DropEntry { kind, weight });
        self
    }

    /// Pick a kind. `None` when the table is empty or all weights are zero.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Option<PickupKind> {
        let index = WeightedIndex::new(self.entries.iter().map(|e| e.weight)).ok()?;
        self.entries.get(index.sample(rng)).map(|e| e.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_empty_table_drops_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(DropTable::new().pick(&mut rng), None);
        assert_eq!(DropTable::new().with(PickupKind::ExtraLife, 0).pick(&mut rng), None);
    }

    #[test]
    fn test_single_entry_always_wins() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let table = DropTable::new()
            .with(PickupKind::ExtraPower, 5)
            .with(PickupKind::ExtraLife, 0);
        assert!((0..20).all(|_| table.pick(&mut rng) == Some(PickupKind::ExtraPower)));
    }

    #[test]
    fn test_default_table_covers_every_kind() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let table = DropTable::default();
        let seen: std::collections::HashSet<_> = (0..500).filter_map(|_| table.pick(&mut rng)).collect();
        assert_eq!(seen.len(), PickupKind::ALL.len());
    }
}
