//! Collaborators of the game world
//!
//! The world never reaches for engine singletons. Spawning, presentation
//! and input come in through these traits; headless implementations are
//! provided for the binary and the tests.

use bomber_combat::TriggerState;
use bomber_core::{EntityId, IdGenerator};
use bomber_math::Vec2;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Creates and destroys engine-side objects
pub trait SpawnProvider {
    /// Instantiate `prefab` and return the id of the new entity
    fn instantiate(&mut self, prefab: &str, position: Vec2, rotation: f32) -> EntityId;

    /// Destroy an entity after `delay` seconds
    fn destroy(&mut self, entity: EntityId, delay: f32);
}

/// Sprite color multiplier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tint {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Tint {
    /// No tint
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Damage flash
    pub const HIT: Self = Self::new(1.0, 0.3, 0.3, 1.0);
    /// Invulnerable flicker
    pub const FADED: Self = Self::new(1.0, 1.0, 1.0, 0.5);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Receives visual and audio notifications
pub trait PresentationSink {
    /// Set a boolean animation parameter of an actor
    fn set_animation_flag(&mut self, actor: EntityId, name: &str, value: bool);

    /// Tint the sprite of an actor
    fn set_sprite_tint(&mut self, actor: EntityId, tint: Tint);

    /// Play a named sound
    fn play_sound(&mut self, name: &str);
}

/// Input state for one tick
pub trait InputProvider {
    /// Movement axis, each component in `[-1, 1]`
    fn movement(&self) -> Vec2;

    /// Attack button edges
    fn attack(&self) -> TriggerState;

    /// Whether the weapon switch button went down this tick
    fn switch_pressed(&self) -> bool;
}

/// Plain input snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    /// Movement axis
    pub movement: Vec2,
    /// Attack button
    pub attack: TriggerState,
    /// Weapon switch button
    pub switch_weapon: bool,
}

impl InputFrame {
    /// No input
    pub fn idle() -> Self {
        Self::default()
    }

    /// Move along `direction`
    pub fn moving(direction: Vec2) -> Self {
        Self {
            movement: direction,
            ..Self::default()
        }
    }

    /// Attack button went down
    pub fn attack_pressed() -> Self {
        Self {
            attack: TriggerState::press(),
            ..Self::default()
        }
    }

    /// Attack button kept down
    pub fn attack_held() -> Self {
        Self {
            attack: TriggerState::hold(),
            ..Self::default()
        }
    }

    /// Weapon switch went down
    pub fn switch() -> Self {
        Self {
            switch_weapon: true,
            ..Self::default()
        }
    }
}

impl InputProvider for InputFrame {
    fn movement(&self) -> Vec2 {
        self.movement
    }

    fn attack(&self) -> TriggerState {
        self.attack
    }

    fn switch_pressed(&self) -> bool {
        self.switch_weapon
    }
}

/// Headless spawner that only hands out ids and remembers what exists.
///
/// Nothing is rendered, so destruction is immediate: a destroyed entity
/// leaves the live set at once and the requested delay is only recorded in
/// [`destroyed`](Self::destroyed).
#[derive(Debug, Default)]
pub struct HeadlessSpawner {
    ids: IdGenerator,
    live: HashMap<EntityId, String>,
    destroyed: Vec<(EntityId, f32)>,
}

impl HeadlessSpawner {
    /// Create an empty spawner
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefab name of a live entity
    pub fn prefab(&self, entity: EntityId) -> Option<&str> {
        self.live.get(&entity).map(String::as_str)
    }

    /// Number of live entities created from `prefab`
    pub fn count(&self, prefab: &str) -> usize {
        self.live.values().filter(|p| *p == prefab).count()
    }

    /// Number of live entities
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Every destroy request with its delay
    pub fn destroyed(&self) -> &[(EntityId, f32)] {
        &self.destroyed
    }
}

impl SpawnProvider for HeadlessSpawner {
    fn instantiate(&mut self, prefab: &str, position: Vec2, _rotation: f32) -> EntityId {
        let entity = self.ids.next();
        log::trace!("Spawned {} {} at ({:.2}, {:.2})", prefab, entity, position.x, position.y);
        self.live.insert(entity, prefab.to_string());
        entity
    }

    fn destroy(&mut self, entity: EntityId, delay: f32) {
        // Immediate; the delay only matters to a renderer
        self.live.remove(&entity);
        self.destroyed.push((entity, delay));
    }
}

/// A recorded presentation notification
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationCall {
    AnimationFlag {
        actor: EntityId,
        name: String,
        value: bool,
    },
    Tint {
        actor: EntityId,
        tint: Tint,
    },
    Sound(String),
}

/// Presentation sink that records every call. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresentation {
    calls: Arc<Mutex<Vec<PresentationCall>>>,
}

impl RecordingPresentation {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every call so far
    pub fn calls(&self) -> Vec<PresentationCall> {
        self.calls.lock().clone()
    }

    /// Sounds played so far, in order
    pub fn sounds(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                PresentationCall::Sound(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Last value set for an animation flag
    pub fn flag(&self, actor: EntityId, name: &str) -> Option<bool> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            PresentationCall::AnimationFlag {
                actor: a,
                name: n,
                value,
            } if *a == actor && n == name => Some(*value),
            _ => None,
        })
    }

    /// Last tint set on an actor
    pub fn tint(&self, actor: EntityId) -> Option<Tint> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            PresentationCall::Tint { actor: a, tint } if *a == actor => Some(*tint),
            _ => None,
        })
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl PresentationSink for RecordingPresentation {
    fn set_animation_flag(&mut self, actor: EntityId, name: &str, value: bool) {
        self.calls.lock().push(PresentationCall::AnimationFlag {
            actor,
            name: name.to_string(),
            value,
        });
    }

    fn set_sprite_tint(&mut self, actor: EntityId, tint: Tint) {
        self.calls.lock().push(PresentationCall::Tint { actor, tint });
    }

    fn play_sound(&mut self, name: &str) {
        self.calls.lock().push(PresentationCall::Sound(name.to_string()));
    }
}

/// Presentation sink that writes to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresentation;

impl PresentationSink for LogPresentation {
    fn set_animation_flag(&mut self, actor: EntityId, name: &str, value: bool) {
        log::debug!("{} {} = {}", actor, name, value);
    }

    fn set_sprite_tint(&mut self, actor: EntityId, tint: Tint) {
        log::trace!("{} tint {:?}", actor, tint);
    }

    fn play_sound(&mut self, name: &str) {
        log::info!("Sound: {}", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_spawner() {
        let mut spawner = HeadlessSpawner::new();
        let a = spawner.instantiate("Fire", Vec2::ZERO, 0.0);
        let b = spawner.instantiate("Fire", Vec2::X, 0.0);
        assert_ne!(a, b);
        assert_eq!(spawner.count("Fire"), 2);

        // Delayed destruction still leaves the live set at once
        spawner.destroy(a, 0.5);
        assert_eq!(spawner.count("Fire"), 1);
        assert_eq!(spawner.prefab(a), None);
        assert_eq!(spawner.prefab(b), Some("Fire"));
        assert_eq!(spawner.live_count(), 1);
        assert_eq!(spawner.destroyed(), &[(a, 0.5)]);
    }

    #[test]
    fn test_recording_clones_share_calls() {
        let recorder = RecordingPresentation::new();
        let mut sink = recorder.clone();
        let actor = EntityId::from_raw(3);

        sink.set_animation_flag(actor, "Stunned", true);
        sink.set_animation_flag(actor, "Stunned", false);
        sink.set_sprite_tint(actor, Tint::HIT);
        sink.play_sound("Ouch");

        assert_eq!(recorder.flag(actor, "Stunned"), Some(false));
        assert_eq!(recorder.flag(actor, "Dead"), None);
        assert_eq!(recorder.tint(actor), Some(Tint::HIT));
        assert_eq!(recorder.sounds(), vec!["Ouch".to_string()]);
        assert_eq!(recorder.calls().len(), 4);
    }

    #[test]
    fn test_input_frame() {
        let frame = InputFrame::attack_pressed();
        assert!(frame.attack().pressed);
        assert!(!frame.switch_pressed());
        assert_eq!(InputFrame::moving(Vec2::X).movement(), Vec2::X);
    }
}
