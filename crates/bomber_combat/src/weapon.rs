//! Player weapons: bomb pouch, flamethrower and handgun
//!
//! Bombs are always available while charges remain. The flamethrower and
//! the handgun share a single "active weapon" slot that is cycled in one
//! canonical order: `None -> FlameThrower -> Handgun -> None`.

use bomber_core::{CombatError, Result};
use serde::{Deserialize, Serialize};

/// Ammo-based weapon kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Spawns a short-lived flame pattern in front of the player
    FlameThrower,
    /// Fires a bullet
    Handgun,
}

/// Currently selected weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveWeapon {
    /// No weapon; attacking places a bomb
    None,
    /// Flamethrower
    FlameThrower,
    /// Handgun
    Handgun,
}

impl Default for ActiveWeapon {
    fn default() -> Self {
        Self::None
    }
}

impl ActiveWeapon {
    /// Canonical switching order
    pub const CYCLE: [ActiveWeapon; 3] = [Self::None, Self::FlameThrower, Self::Handgun];

    /// Weapon kind behind this selection
    pub fn kind(self) -> Option<WeaponKind> {
        match self {
            Self::None => None,
            Self::FlameThrower => Some(WeaponKind::FlameThrower),
            Self::Handgun => Some(WeaponKind::Handgun),
        }
    }

    /// Next selection in the cycle, ignoring availability
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::FlameThrower,
            Self::FlameThrower => Self::Handgun,
            Self::Handgun => Self::None,
        }
    }
}

impl From<WeaponKind> for ActiveWeapon {
    fn from(kind: WeaponKind) -> Self {
        match kind {
            WeaponKind::FlameThrower => Self::FlameThrower,
            WeaponKind::Handgun => Self::Handgun,
        }
    }
}

/// How the attack input drives a weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerMode {
    /// One shot per press
    Pressed,
    /// Repeats at the fire rate while held
    Held,
}

/// State of the attack input for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerState {
    /// Went down this tick
    pub pressed: bool,
    /// Is down this tick
    pub held: bool,
    /// Went up this tick
    pub released: bool,
}

impl TriggerState {
    /// Input that went down this tick
    pub fn press() -> Self {
        Self {
            pressed: true,
            held: true,
            released: false,
        }
    }

    /// Input kept down
    pub fn hold() -> Self {
        Self {
            pressed: false,
            held: true,
            released: false,
        }
    }

    /// Whether `mode` triggers on this input
    pub fn triggers(&self, mode: TriggerMode) -> bool {
        match mode {
            TriggerMode::Pressed => self.pressed,
            TriggerMode::Held => self.pressed || self.held,
        }
    }
}

/// Weapon statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponStats {
    /// Damage per hit
    pub damage: f32,
    /// Shots per second
    pub fire_rate: f32,
    /// Input edge that fires the weapon
    pub trigger: TriggerMode,
    /// Ammo granted by a pickup
    pub pickup_ammo: u32,
}

impl WeaponStats {
    /// Flamethrower defaults
    pub fn flamethrower() -> Self {
        Self {
            damage: 50.0,
            fire_rate: 1.0,
            trigger: TriggerMode::Held,
            pickup_ammo: 5,
        }
    }

    /// Handgun defaults
    pub fn handgun() -> Self {
        Self {
            damage: 10.0,
            fire_rate: 4.0,
            trigger: TriggerMode::Pressed,
            pickup_ammo: 10,
        }
    }

    /// Seconds between two shots
    pub fn cooldown(&self) -> f64 {
        if self.fire_rate > 0.0 {
            1.0 / f64::from(self.fire_rate)
        } else {
            0.0
        }
    }
}

/// An ammo-based weapon the player may own
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponSlot {
    /// Which weapon
    pub kind: WeaponKind,
    /// Statistics
    pub stats: WeaponStats,
    /// Whether the player picked it up
    pub owned: bool,
    /// Remaining ammo
    pub ammo: u32,
    /// Earliest time the next shot may happen
    #[serde(skip)]
    pub next_fire_at: f64,
}

impl WeaponSlot {
    /// Create an unowned slot
    pub fn new(kind: WeaponKind, stats: WeaponStats) -> Self {
        Self {
            kind,
            stats,
            owned: false,
            ammo: 0,
            next_fire_at: 0.0,
        }
    }

    /// Owned with ammo left
    pub fn is_available(&self) -> bool {
        self.owned && self.ammo > 0
    }

    /// Whether a shot is allowed at `now`
    pub fn can_fire(&self, now: f64) -> bool {
        self.is_available() && now >= self.next_fire_at
    }

    /// Consume one ammo and start the cooldown
    pub fn fire(&mut self, now: f64) -> Result<()> {
        if !self.is_available() {
            return Err(CombatError::OutOfResource("ammo"));
        }
        if now < self.next_fire_at {
            return Err(CombatError::OutOfResource("weapon cooldown"));
        }
        self.ammo -= 1;
        self.next_fire_at = now + self.stats.cooldown();
        Ok(())
    }

    /// Grant the weapon and add ammo
    pub fn grant(&mut self, ammo: u32) {
        self.owned = true;
        self.ammo = self.ammo.saturating_add(ammo);
    }
}

/// Bomb charges and explosion power
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BombPouch {
    /// Bombs that can be placed right now
    pub charges: u32,
    /// Explosion radius in tiles
    pub power: u32,
}

impl Default for BombPouch {
    fn default() -> Self {
        Self {
            charges: 3,
            power: 1,
        }
    }
}

impl BombPouch {
    /// Create a pouch
    pub fn new(charges: u32, power: u32) -> Self {
        Self { charges, power }
    }

    /// Take a charge for a new bomb. Returns the power captured for it.
    pub fn take_charge(&mut self) -> Result<u32> {
        if self.charges == 0 {
            return Err(CombatError::OutOfResource("bomb charges"));
        }
        self.charges -= 1;
        Ok(self.power)
    }

    /// A placed bomb exploded and gives its charge back
    pub fn return_charge(&mut self) {
        self.charges = self.charges.saturating_add(1);
    }

    /// Extra bomb pickup
    pub fn add_charge(&mut self) {
        self.charges = self.charges.saturating_add(1);
    }

    /// Extra power pickup
    pub fn add_power(&mut self) {
        self.power = self.power.saturating_add(1);
    }
}

/// Result of an attack input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackAction {
    /// Place a bomb with the captured power
    PlaceBomb { power: u32 },
    /// Fire a weapon dealing `damage`
    Fire { kind: WeaponKind, damage: f32 },
}

/// Everything the player can attack with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arsenal {
    active: ActiveWeapon,
    /// Flamethrower slot
    pub flamethrower: WeaponSlot,
    /// Handgun slot
    pub handgun: WeaponSlot,
    /// Bombs
    pub bombs: BombPouch,
}

impl Default for Arsenal {
    fn default() -> Self {
        Self::new(
            BombPouch::default(),
            WeaponStats::flamethrower(),
            WeaponStats::handgun(),
        )
    }
}

impl Arsenal {
    /// Create an arsenal with no ammo weapons owned
    pub fn new(bombs: BombPouch, flamethrower: WeaponStats, handgun: WeaponStats) -> Self {
        Self {
            active: ActiveWeapon::None,
            flamethrower: WeaponSlot::new(WeaponKind::FlameThrower, flamethrower),
            handgun: WeaponSlot::new(WeaponKind::Handgun, handgun),
            bombs,
        }
    }

    /// Selected weapon
    pub fn active(&self) -> ActiveWeapon {
        self.active
    }

    /// Slot of a weapon kind
    pub fn slot(&self, kind: WeaponKind) -> &WeaponSlot {
        match kind {
            WeaponKind::FlameThrower => &self.flamethrower,
            WeaponKind::Handgun => &self.handgun,
        }
    }

    /// Mutable slot of a weapon kind
    pub fn slot_mut(&mut self, kind: WeaponKind) -> &mut WeaponSlot {
        match kind {
            WeaponKind::FlameThrower => &mut self.flamethrower,
            WeaponKind::Handgun => &mut self.handgun,
        }
    }

    fn is_selectable(&self, weapon: ActiveWeapon) -> bool {
        match weapon.kind() {
            None => true,
            Some(kind) => self.slot(kind).is_available(),
        }
    }

    /// Advance to the next selectable weapon in the cycle
    pub fn switch_next(&mut self) -> ActiveWeapon {
        let mut candidate = self.active.next();
        while !self.is_selectable(candidate) {
            candidate = candidate.next();
        }
        if candidate != self.active {
            log::debug!("Weapon switched {:?} -> {:?}", self.active, candidate);
        }
        self.active = candidate;
        candidate
    }

    /// Select a weapon directly; falls back to `None` if it is not available
    pub fn select(&mut self, weapon: ActiveWeapon) -> ActiveWeapon {
        self.active = if self.is_selectable(weapon) {
            weapon
        } else {
            ActiveWeapon::None
        };
        self.active
    }

    /// Give the player a weapon with some ammo
    pub fn grant(&mut self, kind: WeaponKind, ammo: u32) {
        self.slot_mut(kind).grant(ammo);
    }

    /// Resolve the attack input for this tick.
    ///
    /// Returns `Ok(None)` when the input does not trigger anything and
    /// `OutOfResource` when it does but nothing is left to use.
    pub fn attack(&mut self, trigger: TriggerState, now: f64) -> Result<Option<AttackAction>> {
        let Some(kind) = self.active.kind() else {
            if !trigger.pressed {
                return Ok(None);
            }
            let power = self.bombs.take_charge()?;
            return Ok(Some(AttackAction::PlaceBomb { power }));
        };

        let slot = self.slot_mut(kind);
        if !trigger.triggers(slot.stats.trigger) {
            return Ok(None);
        }
        slot.fire(now)?;
        let damage = slot.stats.damage;
        if slot.ammo == 0 {
            log::debug!("{:?} out of ammo, deactivated", kind);
            self.active = ActiveWeapon::None;
        }
        Ok(Some(AttackAction::Fire { kind, damage }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_skips_unowned_weapons() {
        let mut arsenal = Arsenal::default();
        assert_eq!(arsenal.switch_next(), ActiveWeapon::None);

        arsenal.grant(WeaponKind::Handgun, 2);
        assert_eq!(arsenal.switch_next(), ActiveWeapon::Handgun);
        assert_eq!(arsenal.switch_next(), ActiveWeapon::None);

        arsenal.grant(WeaponKind::FlameThrower, 1);
        assert_eq!(arsenal.switch_next(), ActiveWeapon::FlameThrower);
        assert_eq!(arsenal.switch_next(), ActiveWeapon::Handgun);
        assert_eq!(arsenal.switch_next(), ActiveWeapon::None);
    }

    #[test]
    fn test_bomb_placement_uses_charges() {
        let mut arsenal = Arsenal::default();
        for _ in 0..3 {
            let action = arsenal.attack(TriggerState::press(), 0.0).unwrap();
            assert_eq!(action, Some(AttackAction::PlaceBomb { power: 1 }));
        }
        let err = arsenal.attack(TriggerState::press(), 0.0).unwrap_err();
        assert!(err.is_silent());

        // Holding does not place more bombs
        arsenal.bombs.return_charge();
        assert_eq!(arsenal.attack(TriggerState::hold(), 0.0).unwrap(), None);
    }

    #[test]
    fn test_handgun_fires_on_press_and_deactivates_when_empty() {
        let mut arsenal = Arsenal::default();
        arsenal.grant(WeaponKind::Handgun, 2);
        arsenal.select(ActiveWeapon::Handgun);

        assert_eq!(arsenal.attack(TriggerState::hold(), 0.0).unwrap(), None);
        let action = arsenal.attack(TriggerState::press(), 0.0).unwrap();
        assert!(matches!(action, Some(AttackAction::Fire { kind: WeaponKind::Handgun, .. })));

        // Cooldown of 0.25s
        assert!(arsenal.attack(TriggerState::press(), 0.125).is_err());
        arsenal.attack(TriggerState::press(), 0.25).unwrap();
        assert_eq!(arsenal.handgun.ammo, 0);
        assert_eq!(arsenal.active(), ActiveWeapon::None);
    }

    #[test]
    fn test_flamethrower_fires_while_held() {
        let mut arsenal = Arsenal::default();
        arsenal.grant(WeaponKind::FlameThrower, 3);
        arsenal.select(ActiveWeapon::FlameThrower);

        assert!(arsenal.attack(TriggerState::hold(), 0.0).unwrap().is_some());
        assert!(arsenal.attack(TriggerState::hold(), 0.5).is_err());
        assert!(arsenal.attack(TriggerState::hold(), 1.0).unwrap().is_some());
        assert_eq!(arsenal.flamethrower.ammo, 1);
    }

    #[test]
    fn test_select_unavailable_falls_back() {
        let mut arsenal = Arsenal::default();
        assert_eq!(arsenal.select(ActiveWeapon::FlameThrower), ActiveWeapon::None);
    }
}
