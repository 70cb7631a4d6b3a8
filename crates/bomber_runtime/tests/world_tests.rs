//! Full ticks of the game world with headless collaborators

use approx::assert_relative_eq;
use bomber_combat::{ActiveWeapon, DamageInfo, DamageType, WeaponKind};
use bomber_core::EntityId;
use bomber_explosion::TerrainProvider;
use bomber_inventory::PickupKind;
use bomber_math::{Cell, Vec2};
use bomber_runtime::prelude::*;

const DT: f64 = 0.02;

type World = GameWorld<HeadlessSpawner, RecordingPresentation>;

/// A one-row corridor: `row` between two solid walls
fn corridor(row: &str) -> String {
    let wall = "#".repeat(row.len());
    format!("{wall}\n{row}\n{wall}")
}

fn build(row: &str, config: GameConfig) -> (World, RecordingPresentation) {
    let level = Level::parse(&corridor(row)).unwrap();
    let recorder = RecordingPresentation::new();
    let world = GameWorld::from_level(config, &level, HeadlessSpawner::new(), recorder.clone()).unwrap();
    (world, recorder)
}

fn run(world: &mut World, seconds: f64, input: InputFrame) {
    let ticks = (seconds / DT).round() as usize;
    for _ in 0..ticks {
        world.update(DT, &input);
    }
}

/// Tick until the clock reaches `time`
fn run_until(world: &mut World, time: f64) {
    for _ in 0..1000 {
        if world.now() >= time {
            return;
        }
        world.update(DT, &InputFrame::idle());
    }
    panic!("clock stuck before {time}");
}

fn player_id(world: &World) -> EntityId {
    world.player().unwrap().entity
}

fn first_enemy(world: &World) -> EntityId {
    world.enemies().next().unwrap().entity
}

#[test]
fn test_bomb_destroys_chest_and_drops_pickup() {
    let mut config = GameConfig::default();
    config.player.power = 2;
    let (mut world, recorder) = build("#C.P....#", config);

    world.update(DT, &InputFrame::attack_pressed());
    assert_eq!(world.bombs().count(), 1);
    assert_eq!(world.hud().bombs, 2);

    // Walk out of range and wait for the fuse
    run(&mut world, 1.0, InputFrame::moving(Vec2::X));
    run(&mut world, 1.5, InputFrame::idle());

    assert_eq!(world.bombs().count(), 0);
    assert!(recorder.sounds().contains(&"Explosion".to_string()));
    assert_eq!(world.terrain().kind(Cell::new(1, 1)), None);

    let player = world.player().unwrap();
    assert!(player.position.x > 6.0);
    assert!(player.health.is_alive());
    assert_eq!(player.lives, 3);
    assert_eq!(world.hud().bombs, 3);

    // Chests always drop; the fresh pickup outlives the fire around it
    let pickups: Vec<_> = world.pickups().collect();
    assert_eq!(pickups.len(), 1);
    assert_eq!(pickups[0].position, Vec2::new(1.0, 1.0));
    assert!(world
        .spawner()
        .destroyed()
        .iter()
        .any(|(_, delay)| *delay == 1.0));

    run(&mut world, 1.5, InputFrame::idle());
    assert_eq!(world.fires().count(), 0);
    assert_eq!(world.pickups().count(), 1);
}

#[test]
fn test_pickup_without_immunity_burns() {
    let mut config = GameConfig::default();
    config.player.power = 2;
    config.pickups.immunity = 0.0;
    let (mut world, _) = build("#C.P....#", config);

    world.update(DT, &InputFrame::attack_pressed());
    run(&mut world, 1.0, InputFrame::moving(Vec2::X));
    run(&mut world, 1.5, InputFrame::idle());

    assert_eq!(world.terrain().kind(Cell::new(1, 1)), None);
    assert_eq!(world.pickups().count(), 0);
}

#[test]
fn test_own_bomb_kills_and_player_respawns() {
    let (mut world, recorder) = build("#P...#", GameConfig::default());
    let player = player_id(&world);

    world.update(DT, &InputFrame::attack_pressed());
    run(&mut world, 2.5, InputFrame::idle());

    let state = world.player().unwrap();
    assert!(state.health.is_dead());
    assert_eq!(state.lives, 2);
    assert_eq!(recorder.flag(player, "Dead"), Some(true));
    assert!(recorder.sounds().contains(&"Ouch".to_string()));
    assert_eq!(world.status(), GameStatus::Playing);

    run(&mut world, 1.0, InputFrame::idle());

    let state = world.player().unwrap();
    assert!(state.health.is_alive());
    assert!(state.health.is_invulnerable(world.now()));
    assert_relative_eq!(state.position.x, 1.0);
    assert_relative_eq!(state.position.y, 1.0);
    assert!(world.physics().is_enabled(player));
    assert_eq!(recorder.flag(player, "Dead"), Some(false));
    assert_eq!(recorder.flag(player, "Invulnerable"), Some(true));
}

#[test]
fn test_last_life_ends_the_game() {
    let mut config = GameConfig::default();
    config.player.lives = 1;
    let (mut world, recorder) = build("#P...#", config);

    world.update(DT, &InputFrame::attack_pressed());
    run(&mut world, 2.5, InputFrame::idle());

    assert_eq!(world.status(), GameStatus::Lost);
    assert_eq!(world.hud().lives, 0);
    assert!(recorder.sounds().contains(&"GameOver".to_string()));

    // A finished game no longer ticks
    let now = world.now();
    world.update(DT, &InputFrame::idle());
    assert_eq!(world.now(), now);
}

#[test]
fn test_enemy_chases_and_hits_player() {
    let (mut world, recorder) = build("#P...E#", GameConfig::default());
    let enemy = first_enemy(&world);

    world.update(DT, &InputFrame::idle());
    assert_eq!(recorder.flag(enemy, "Moving"), Some(true));

    run(&mut world, 1.0, InputFrame::idle());

    assert!(world.enemy(enemy).unwrap().position.x < 3.0);
    assert_eq!(world.player().unwrap().lives, 2);
    assert!(recorder.sounds().contains(&"Ouch".to_string()));
}

#[test]
fn test_wall_blocks_enemy_sight() {
    let (mut world, _) = build("#P.#.E#", GameConfig::default());
    let enemy = first_enemy(&world);

    run(&mut world, 1.0, InputFrame::idle());

    assert_eq!(world.enemy(enemy).unwrap().position, Vec2::new(5.0, 1.0));
    assert_eq!(world.player().unwrap().lives, 3);
}

#[test]
fn test_handgun_bullet_stuns_enemy() {
    let (mut world, recorder) = build("#P.....E#", GameConfig::default());
    let enemy = first_enemy(&world);

    world
        .player_mut()
        .unwrap()
        .arsenal
        .grant(WeaponKind::Handgun, 3);
    world.update(DT, &InputFrame::switch());
    assert_eq!(world.hud().active_weapon, ActiveWeapon::Handgun);

    world.update(DT, &InputFrame::attack_pressed());
    assert_eq!(world.projectiles().count(), 1);
    assert_eq!(world.hud().ammo, 2);
    assert!(recorder.sounds().contains(&"Shot".to_string()));

    run(&mut world, 0.5, InputFrame::idle());

    let hit = world.enemy(enemy).unwrap();
    assert_relative_eq!(hit.health.current(), 90.0);
    assert!(hit.health.is_stunned(world.now()));
    assert_eq!(recorder.flag(enemy, "Stunned"), Some(true));
    assert_eq!(world.projectiles().count(), 0);
    assert!(world
        .spawner()
        .destroyed()
        .iter()
        .any(|(_, delay)| *delay == 0.5));
}

#[test]
fn test_summoner_respects_minion_cap() {
    let mut config = GameConfig::default();
    config.enemy.speed = 0.0;
    let (mut world, _) = build("#P...S#", config);
    let summoner = first_enemy(&world);

    run(&mut world, 10.0, InputFrame::idle());

    let minions: Vec<_> = world.enemies().filter(|e| e.is_minion()).collect();
    assert_eq!(minions.len(), 2);
    assert!(minions.iter().all(|m| m.parent == Some(summoner)));
    assert!(minions.iter().all(|m| m.health.max() == 50.0));
    assert_eq!(world.enemy(summoner).unwrap().brain.minions().len(), 2);
    assert_eq!(world.spawner().count("Minion"), 2);
}

#[test]
fn test_pickups_are_collected() {
    let (mut world, recorder) = build("#P....#", GameConfig::default());

    world.spawn_pickup(PickupKind::ExtraBomb, Vec2::new(2.0, 1.0)).unwrap();
    world.spawn_pickup(PickupKind::HandgunAmmo, Vec2::new(3.0, 1.0)).unwrap();

    run(&mut world, 0.6, InputFrame::moving(Vec2::X));

    assert_eq!(world.pickups().count(), 0);
    let player = world.player().unwrap();
    assert_eq!(player.arsenal.bombs.charges, 4);
    assert_eq!(player.arsenal.handgun.ammo, 10);
    assert!(player.arsenal.handgun.owned);
    assert_eq!(
        recorder
            .sounds()
            .iter()
            .filter(|s| s.as_str() == "Pickup")
            .count(),
        2
    );
}

#[test]
fn test_flamethrower_kills_enemy_and_wins() {
    let mut config = GameConfig::default();
    config.enemy.speed = 0.0;
    config.enemy.attack_range = 0.5;
    let (mut world, recorder) = build("#P..E.#", config);
    let enemy = first_enemy(&world);

    world
        .player_mut()
        .unwrap()
        .arsenal
        .grant(WeaponKind::FlameThrower, 5);
    world.update(DT, &InputFrame::switch());
    assert_eq!(world.hud().active_weapon, ActiveWeapon::FlameThrower);

    // First shot: the far flame reaches the enemy
    run(&mut world, 0.5, InputFrame::attack_held());
    assert_relative_eq!(world.enemy(enemy).unwrap().health.current(), 50.0);
    assert!(world.fires().count() >= 3);
    assert_eq!(world.status(), GameStatus::Playing);

    // Second shot after the cooldown finishes it
    run(&mut world, 1.0, InputFrame::attack_held());
    assert!(world.enemy(enemy).unwrap().health.is_dead());
    assert_eq!(world.status(), GameStatus::Won);
    assert_eq!(world.player().unwrap().arsenal.flamethrower.ammo, 3);
    assert!(recorder.sounds().contains(&"Victory".to_string()));
    assert!(world.player().unwrap().health.is_alive());
}

#[test]
fn test_hud_snapshot() {
    let (world, _) = build("#P.E#", GameConfig::default());
    let hud = world.hud();
    assert_eq!(hud.lives, 3);
    assert_eq!(hud.bombs, 3);
    assert_eq!(hud.power, 1);
    assert_eq!(hud.active_weapon, ActiveWeapon::None);
    assert_eq!(hud.enemies_left, 1);
    assert_eq!(hud.status, GameStatus::Playing);
    assert!(hud.summary().contains("lives 3"));
}

#[test]
fn test_second_bomb_on_same_cell_is_refused() {
    let (mut world, _) = build("#P....#", GameConfig::default());

    world.update(DT, &InputFrame::attack_pressed());
    world.update(DT, &InputFrame::attack_pressed());

    assert_eq!(world.bombs().count(), 1);
    assert_eq!(world.spawner().count("Bomb"), 1);
    assert_eq!(world.hud().bombs, 2);
}

#[test]
fn test_bullet_hits_at_low_frame_rate() {
    const SLOW_DT: f64 = 0.08;

    for row in ["#P......E#", "#P.....E.#"] {
        let (mut world, _) = build(row, GameConfig::default());
        let enemy = first_enemy(&world);
        world
            .player_mut()
            .unwrap()
            .arsenal
            .grant(WeaponKind::Handgun, 3);

        world.update(SLOW_DT, &InputFrame::switch());
        world.update(SLOW_DT, &InputFrame::attack_pressed());
        assert_eq!(world.projectiles().count(), 1);
        for _ in 0..6 {
            world.update(SLOW_DT, &InputFrame::idle());
        }

        assert_relative_eq!(world.enemy(enemy).unwrap().health.current(), 90.0);
        assert_eq!(world.projectiles().count(), 0);
    }
}

#[test]
fn test_new_hit_restarts_damage_flash() {
    let mut config = GameConfig::default();
    config.enemy.speed = 0.0;
    let (mut world, recorder) = build("#P...E#", config);
    let enemy = first_enemy(&world);
    let hit = DamageInfo::new(10.0, DamageType::Bullet);

    world.update(DT, &InputFrame::idle());
    world.damage_actor(enemy, hit).unwrap();
    assert_eq!(recorder.tint(enemy), Some(Tint::HIT));

    // Second hit halfway through the flash
    run(&mut world, 0.06, InputFrame::idle());
    world.damage_actor(enemy, hit).unwrap();
    assert_relative_eq!(world.enemy(enemy).unwrap().health.current(), 80.0);

    // The first flash would have ended by now
    run(&mut world, 0.06, InputFrame::idle());
    assert_eq!(recorder.tint(enemy), Some(Tint::HIT));

    run(&mut world, 0.06, InputFrame::idle());
    assert_eq!(recorder.tint(enemy), Some(Tint::WHITE));
}

#[test]
fn test_dead_minion_frees_slot_and_is_removed_later() {
    let mut config = GameConfig::default();
    config.enemy.speed = 0.0;
    let (mut world, _) = build("#P...S#", config);
    let summoner = first_enemy(&world);

    run(&mut world, 3.1, InputFrame::idle());
    let minion = world.enemies().find(|e| e.is_minion()).unwrap().entity;

    world
        .damage_actor(minion, DamageInfo::new(1000.0, DamageType::Explosion))
        .unwrap();
    let killed_at = world.now();

    // Slot frees at once, the body stays for the death delay
    assert!(world.enemy(summoner).unwrap().brain.minions().is_empty());
    assert!(world.enemy(minion).unwrap().health.is_dead());
    assert!(!world.physics().is_enabled(minion));
    assert_eq!(world.status(), GameStatus::Playing);

    let delay = f64::from(world.config().feedback.enemy_death_delay);
    run_until(&mut world, killed_at + delay * 0.5);
    assert!(world.enemy(minion).is_some());

    run_until(&mut world, killed_at + delay);
    assert!(world.enemy(minion).is_none());
    assert!(!world.physics().contains(minion));
    assert_eq!(world.spawner().count("Minion"), 0);
    assert!(world.enemy(summoner).unwrap().health.is_alive());
}

#[test]
fn test_fire_stops_colliding_before_removal() {
    let mut config = GameConfig::default();
    config.explosion.collision_lead = 0.3;
    let (mut world, _) = build("#P......#", config);

    world.update(DT, &InputFrame::attack_pressed());
    run(&mut world, 1.0, InputFrame::moving(Vec2::X));
    run_until(&mut world, 2.1);

    let (fire, off_at, expires_at) = world
        .fires()
        .min_by(|a, b| a.expires_at.total_cmp(&b.expires_at))
        .map(|f| (f.entity, f.collision_off_at(), f.expires_at))
        .unwrap();
    assert!(world.physics().is_enabled(fire));
    assert!(off_at < expires_at);

    run_until(&mut world, off_at);
    assert!(!world.physics().is_enabled(fire));
    assert!(world.fires().any(|f| f.entity == fire));

    run_until(&mut world, expires_at);
    assert!(!world.fires().any(|f| f.entity == fire));
    assert!(!world.physics().contains(fire));
}
