//! Game world and the per-tick update
//!
//! `GameWorld::update` runs one frame in a fixed order:
//!
//! 1. advance the clock, integrate movement in fixed steps, sync colliders
//! 2. after each fixed step, turn sensor overlaps into contact events and
//!    drain them
//! 3. fire due timers (fuses, staggered flames, fire expiry, feedback)
//! 4. end expired stun/invulnerability states
//! 5. enemies perceive, move and attack
//! 6. player switches weapons and attacks
//! 7. remove entities whose destruction is due
//!
//! A failing actor is logged and skipped for the tick; nothing in the loop
//! aborts the frame.

use crate::config::GameConfig;
use crate::context::{InputProvider, PresentationSink, SpawnProvider, Tint};
use crate::error::{RuntimeError, RuntimeResult};
use crate::hud::{GameStatus, HudSnapshot};
use crate::level::Level;
use crate::player::Player;
use bomber_ai::{EnemyBrain, EnemyConfig};
use bomber_combat::{
    ActiveWeapon, AttackAction, DamageInfo, DamageType, HealthComponent, HealthEvent, HitReaction,
    Projectile, WeaponKind,
};
use bomber_core::{CombatError, EntityId, GameClock, TimerQueue};
use bomber_explosion::{
    flame_pattern, is_spawn_blocked, Bomb, FireSource, FireTile, FlameSpawn, PhysicsObstacles,
    SharedTerrain, TerrainKind, TerrainProvider, TileMap,
};
use bomber_inventory::{PickupComponent, PickupEffect, PickupKind};
use bomber_math::{Cell, Direction, Vec2};
use bomber_physics::{
    ColliderDesc, ColliderShape, ColliderTag, CollisionLayer, ContactEvent, ContactTracker,
    EventQueue, LayerMask, PhysicsQuery, PhysicsWorld,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// An enemy or minion
#[derive(Debug, Clone)]
pub struct Enemy {
    /// Enemy entity
    pub entity: EntityId,
    /// Current position
    pub position: Vec2,
    /// Current velocity
    pub velocity: Vec2,
    /// Health state machine
    pub health: HealthComponent,
    /// Decision making
    pub brain: EnemyBrain,
    /// Summoner of a minion
    pub parent: Option<EntityId>,
}

impl Enemy {
    /// Whether this enemy was spawned by another one
    pub fn is_minion(&self) -> bool {
        self.parent.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TimerAction {
    /// Bomb fuse burnt down
    Detonate,
    /// Staggered flamethrower flame
    SpawnFlame {
        origin: Vec2,
        spawn: FlameSpawn,
        damage: f32,
    },
    /// Fire tile stops colliding
    FireCollisionOff,
    /// Delayed destruction
    Remove,
    /// Damage flash is over
    EndFlash,
    /// Player comes back after dying
    Respawn,
}

impl TimerAction {
    fn is_feedback(&self) -> bool {
        matches!(self, Self::EndFlash)
    }
}

fn terrain_prefab(kind: TerrainKind) -> &'static str {
    match kind {
        TerrainKind::Unbreakable => "Unbreakable",
        TerrainKind::Chest => "Chest",
        TerrainKind::Crate => "Crate",
        TerrainKind::Rubble => "Rubble",
    }
}

/// Move by `delta` unless the box would end up inside an obstacle; falls
/// back to each axis alone so actors slide along walls
fn slide<Q: PhysicsQuery + ?Sized>(
    query: &Q,
    from: Vec2,
    delta: Vec2,
    half_extents: Vec2,
    obstacles: LayerMask,
) -> Vec2 {
    let candidates = [
        from + delta,
        from + Vec2::new(delta.x, 0.0),
        from + Vec2::new(0.0, delta.y),
    ];
    for candidate in candidates {
        if candidate != from && query.overlap_box(candidate, half_extents, obstacles).is_empty() {
            return candidate;
        }
    }
    from
}

/// The combat world
pub struct GameWorld<S: SpawnProvider, P: PresentationSink> {
    config: GameConfig,
    clock: GameClock,
    physics: PhysicsWorld,
    terrain: SharedTerrain,
    terrain_cells: HashMap<EntityId, Cell>,
    contacts: ContactTracker,
    events: EventQueue,
    timers: TimerQueue<TimerAction>,
    player: Option<Player>,
    enemies: BTreeMap<EntityId, Enemy>,
    enemies_spawned: usize,
    bombs: BTreeMap<EntityId, Bomb>,
    fires: BTreeMap<EntityId, FireTile>,
    projectiles: BTreeMap<EntityId, Projectile>,
    pickups: BTreeMap<EntityId, PickupComponent>,
    pending_removal: BTreeSet<EntityId>,
    rng: ChaCha8Rng,
    status: GameStatus,
    spawner: S,
    presentation: P,
}

impl<S: SpawnProvider, P: PresentationSink> GameWorld<S, P> {
    /// Create an empty world
    pub fn new(config: GameConfig, spawner: S, presentation: P) -> RuntimeResult<Self> {
        config.validate()?;
        for warning in config.warnings() {
            log::warn!("Configuration warning: {}", warning);
        }
        let physics = PhysicsWorld::new(config.physics.clone())?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(Self {
            config,
            clock: GameClock::new(),
            physics,
            terrain: SharedTerrain::new(TileMap::new()),
            terrain_cells: HashMap::new(),
            contacts: ContactTracker::new(),
            events: EventQueue::new(),
            timers: TimerQueue::new(),
            player: None,
            enemies: BTreeMap::new(),
            enemies_spawned: 0,
            bombs: BTreeMap::new(),
            fires: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            pickups: BTreeMap::new(),
            pending_removal: BTreeSet::new(),
            rng,
            status: GameStatus::Playing,
            spawner,
            presentation,
        })
    }

    /// Create a world populated from a level layout
    pub fn from_level(
        config: GameConfig,
        level: &Level,
        spawner: S,
        presentation: P,
    ) -> RuntimeResult<Self> {
        let mut world = Self::new(config, spawner, presentation)?;
        for (cell, kind) in &level.terrain {
            world.add_terrain(*cell, *kind)?;
        }
        world.spawn_player(level.player.center())?;
        for spawn in &level.enemies {
            let mut enemy = world.config.enemy.clone();
            if spawn.summoner {
                enemy.minions = Some(world.config.summoner.clone());
            }
            world.spawn_enemy(spawn.cell.center(), enemy)?;
        }
        log::info!(
            "Level loaded: {} terrain tiles, {} enemies",
            level.terrain.len(),
            level.enemies.len()
        );
        Ok(world)
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    /// Insert a collider for a freshly instantiated entity, destroying the
    /// entity again when that fails
    fn attach(&mut self, entity: EntityId, desc: ColliderDesc) -> RuntimeResult<()> {
        if let Err(e) = self.physics.insert(entity, desc) {
            self.spawner.destroy(entity, 0.0);
            return Err(e.into());
        }
        Ok(())
    }

    /// Place a terrain tile
    pub fn add_terrain(&mut self, cell: Cell, kind: TerrainKind) -> RuntimeResult<EntityId> {
        let position = cell.center();
        let entity = self.spawner.instantiate(terrain_prefab(kind), position, 0.0);
        let tag = if kind.is_breakable() {
            ColliderTag::Breakable
        } else {
            ColliderTag::Unbreakable
        };
        let shape = ColliderShape::tile(self.config.physics.tile_half_extent);
        self.attach(entity, ColliderDesc::new(tag, shape, position))?;
        self.terrain.insert(cell, kind);
        self.terrain_cells.insert(entity, cell);
        Ok(entity)
    }

    /// Spawn the player
    pub fn spawn_player(&mut self, position: Vec2) -> RuntimeResult<EntityId> {
        if self.player.is_some() {
            return Err(RuntimeError::PlayerExists);
        }
        let entity = self.spawner.instantiate("Player", position, 0.0);
        let shape = ColliderShape::tile(self.config.physics.actor_half_extent);
        self.attach(entity, ColliderDesc::new(ColliderTag::Player, shape, position))?;
        self.player = Some(Player::new(
            entity,
            position,
            &self.config.player,
            &self.config.weapons,
        ));
        Ok(entity)
    }

    /// Spawn an enemy
    pub fn spawn_enemy(&mut self, position: Vec2, config: EnemyConfig) -> RuntimeResult<EntityId> {
        self.insert_enemy("Enemy", ColliderTag::Enemy, position, config, None)
    }

    fn insert_enemy(
        &mut self,
        prefab: &str,
        tag: ColliderTag,
        position: Vec2,
        config: EnemyConfig,
        parent: Option<EntityId>,
    ) -> RuntimeResult<EntityId> {
        let entity = self.spawner.instantiate(prefab, position, 0.0);
        let shape = ColliderShape::tile(self.config.physics.actor_half_extent);
        self.attach(entity, ColliderDesc::new(tag, shape, position))?;

        let health = HealthComponent::new(entity, config.max_health).with_reaction(
            HitReaction::Stun {
                duration: config.stun_duration,
            },
        );
        self.enemies.insert(
            entity,
            Enemy {
                entity,
                position,
                velocity: Vec2::ZERO,
                health,
                brain: EnemyBrain::new(entity, config),
                parent,
            },
        );
        self.enemies_spawned += 1;
        Ok(entity)
    }

    fn spawn_minion(&mut self, parent: EntityId) -> RuntimeResult<EntityId> {
        let summoner = self
            .enemies
            .get(&parent)
            .ok_or(CombatError::missing("summoner", parent))?;
        let mut config = summoner.brain.config.clone();
        config.max_health = summoner.brain.minion_health();
        config.minions = None;
        let position = summoner.position;

        let minion = self.insert_enemy("Minion", ColliderTag::Minion, position, config, Some(parent))?;
        if let Some(summoner) = self.enemies.get_mut(&parent) {
            summoner.brain.register_minion(minion);
        }
        log::debug!("{} summoned minion {}", parent, minion);
        Ok(minion)
    }

    /// Drop a pickup into the world
    pub fn spawn_pickup(&mut self, kind: PickupKind, position: Vec2) -> RuntimeResult<EntityId> {
        let entity = self.spawner.instantiate(kind.name(), position, 0.0);
        let shape = ColliderShape::tile(self.config.physics.actor_half_extent);
        self.attach(entity, ColliderDesc::new(ColliderTag::Pickup, shape, position))?;
        let pickup = PickupComponent::new(entity, kind, position, self.clock.now())
            .with_immunity(self.config.pickups.immunity);
        self.pickups.insert(entity, pickup);
        Ok(entity)
    }

    fn spawn_fire(
        &mut self,
        position: Vec2,
        source: FireSource,
        damage: f32,
        lifetime: f32,
    ) -> RuntimeResult<EntityId> {
        let prefab = match source {
            FireSource::Bomb { .. } => "Fire",
            FireSource::FlameThrower { .. } => "Flame",
        };
        let entity = self.spawner.instantiate(prefab, position, 0.0);
        let shape = ColliderShape::tile(self.config.physics.fire_half_extent);
        self.attach(entity, ColliderDesc::new(ColliderTag::Fire, shape, position))?;

        let fire = FireTile::new(
            entity,
            position,
            source,
            damage,
            self.clock.now(),
            lifetime,
            self.config.explosion.collision_lead,
        );
        self.timers
            .schedule(entity, fire.collision_off_at(), TimerAction::FireCollisionOff);
        self.timers.schedule(entity, fire.expires_at, TimerAction::Remove);
        self.fires.insert(entity, fire);
        Ok(entity)
    }

    /// Place a bomb for `owner`. `None` when the cell already holds one.
    fn place_bomb(&mut self, owner: EntityId, position: Vec2, power: u32) -> RuntimeResult<Option<EntityId>> {
        let cell = Cell::from_world(position);
        if self.bombs.values().any(|b| b.cell == cell) {
            log::trace!("{} already holds a bomb", cell);
            if let Some(player) = self.player.as_mut().filter(|p| p.entity == owner) {
                player.arsenal.bombs.return_charge();
            }
            return Ok(None);
        }

        let entity = self.spawner.instantiate("Bomb", cell.center(), 0.0);
        let bomb = Bomb::place(entity, owner, position, power, self.clock.now(), &self.config.bomb);
        let shape = ColliderShape::tile(self.config.physics.actor_half_extent);
        self.attach(entity, ColliderDesc::new(ColliderTag::Bomb, shape, bomb.position()))?;
        self.timers.schedule(entity, bomb.explodes_at, TimerAction::Detonate);
        self.bombs.insert(entity, bomb);
        Ok(Some(entity))
    }

    fn fire_flamethrower(&mut self, shooter: EntityId, origin: Vec2, facing: Direction, damage: f32) {
        let now = self.clock.now();
        for spawn in flame_pattern(facing, &self.config.flame) {
            self.timers.schedule(
                shooter,
                now + f64::from(spawn.delay),
                TimerAction::SpawnFlame {
                    origin,
                    spawn,
                    damage,
                },
            );
        }
        self.presentation.play_sound("FlameThrower");
    }

    fn fire_handgun(
        &mut self,
        shooter: EntityId,
        origin: Vec2,
        facing: Direction,
        damage: f32,
    ) -> RuntimeResult<EntityId> {
        let direction = facing.to_vec2();
        let radius = self.config.projectile.radius;
        let start = origin + direction * (self.config.physics.actor_half_extent + radius);
        let entity = self.spawner.instantiate("Bullet", start, direction.angle());
        self.attach(
            entity,
            ColliderDesc::new(ColliderTag::Bullet, ColliderShape::Circle { radius }, start),
        )?;
        let bullet = Projectile::new(
            entity,
            shooter,
            start,
            direction,
            damage,
            &self.config.projectile,
            self.clock.now(),
        );
        self.projectiles.insert(entity, bullet);
        self.presentation.play_sound("Shot");
        Ok(entity)
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Run one frame of `dt` seconds
    pub fn update<I: InputProvider + ?Sized>(&mut self, dt: f64, input: &I) {
        if self.status.is_over() {
            return;
        }

        // 1-2. movement, with contacts sampled after every fixed step
        self.clock.advance(dt);
        self.steer_player(input.movement());
        let step = self.config.physics.timestep;
        let steps = self
            .clock
            .fixed_steps(f64::from(step), self.config.physics.max_substeps);
        for _ in 0..steps {
            self.integrate(step);
            self.physics.sync();
            self.gather_contacts();
            self.process_contacts();
        }
        if steps == 0 {
            // Sensors spawned last frame still need sampling
            self.physics.sync();
            self.gather_contacts();
            self.process_contacts();
        }

        // 3. timers
        self.run_timers();

        // 4. health state expiry
        self.update_health();

        // 5. enemies
        self.update_enemies();

        // 6. player actions
        self.update_player_actions(input);

        // 7. removals
        self.flush_removals();
        self.physics.sync();

        self.check_victory();
    }

    fn steer_player(&mut self, movement: Vec2) {
        let now = self.clock.now();
        if let Some(player) = self.player.as_mut() {
            if player.health.can_act(now) {
                player.steer(movement);
            } else {
                player.velocity = Vec2::ZERO;
            }
        }
    }

    fn integrate(&mut self, dt: f32) {
        let now = self.clock.now();
        let obstacles = LayerMask::obstacles();
        let half = Vec2::splat(self.config.physics.actor_half_extent);
        let mut moved = Vec::new();

        if let Some(player) = self.player.as_mut() {
            if player.velocity != Vec2::ZERO {
                let next = slide(&self.physics, player.position, player.velocity * dt, half, obstacles);
                if next != player.position {
                    player.position = next;
                    moved.push((player.entity, next));
                }
            }
        }

        for enemy in self.enemies.values_mut() {
            if enemy.velocity == Vec2::ZERO || !enemy.health.can_act(now) {
                continue;
            }
            let next = slide(&self.physics, enemy.position, enemy.velocity * dt, half, obstacles);
            if next != enemy.position {
                enemy.position = next;
                moved.push((enemy.entity, next));
            }
        }

        for bullet in self.projectiles.values_mut() {
            bullet.advance(dt);
            moved.push((bullet.entity, bullet.position));
            if bullet.is_expired(now) {
                self.pending_removal.insert(bullet.entity);
            }
        }

        for (entity, position) in moved {
            if let Err(e) = self.physics.set_position(entity, position) {
                log::warn!("Could not move {}: {}", entity, e);
            }
        }
    }

    fn gather_contacts(&mut self) {
        let now = self.clock.now();
        let fire_mask = LayerMask::actors()
            | LayerMask::obstacles()
            | LayerMask::of(CollisionLayer::PICKUPS);
        let pickup_mask = LayerMask::of(CollisionLayer::PLAYER);
        let bullet_mask = LayerMask::actors() | LayerMask::obstacles();

        let mut sensors = Vec::new();
        sensors.extend(
            self.fires
                .values()
                .filter(|f| f.is_burning(now))
                .map(|f| (f.entity, ColliderTag::Fire, fire_mask)),
        );
        sensors.extend(
            self.pickups
                .keys()
                .map(|id| (*id, ColliderTag::Pickup, pickup_mask)),
        );
        sensors.extend(
            self.projectiles
                .keys()
                .map(|id| (*id, ColliderTag::Bullet, bullet_mask)),
        );

        for (sensor, tag, mask) in sensors {
            if self.pending_removal.contains(&sensor) {
                continue;
            }
            match self.physics.overlapping(sensor, mask) {
                Ok(hits) => self.contacts.update(
                    sensor,
                    tag,
                    hits.into_iter().map(|h| (h.entity, h.tag)),
                    &mut self.events,
                ),
                Err(e) => log::warn!("Contact query for {} failed: {}", sensor, e),
            }
        }
    }

    fn process_contacts(&mut self) {
        for event in self.events.drain() {
            if !event.is_started() {
                continue;
            }
            match event.sensor_tag {
                ColliderTag::Fire => self.fire_contact(event),
                ColliderTag::Pickup => self.pickup_contact(event),
                ColliderTag::Bullet => self.bullet_contact(event),
                _ => {}
            }
        }
    }

    fn fire_contact(&mut self, event: ContactEvent) {
        let now = self.clock.now();
        let Some(fire) = self.fires.get_mut(&event.sensor) else {
            return;
        };
        if !fire.is_burning(now) {
            return;
        }

        match event.other_tag {
            ColliderTag::Breakable => self.break_terrain(event.other),
            ColliderTag::Pickup => self.burn_pickup(event.other),
            tag if tag.is_actor() => {
                if let Some(damage) = fire.touch(event.other, now) {
                    if let Err(e) = self.damage_actor(event.other, damage) {
                        log::warn!("Fire {} skipped {}: {}", event.sensor, event.other, e);
                    }
                }
            }
            _ => {}
        }
    }

    fn break_terrain(&mut self, entity: EntityId) {
        let Some(&cell) = self.terrain_cells.get(&entity) else {
            return;
        };
        let Some(kind) = self.terrain.kind(cell) else {
            return;
        };
        if !self.terrain.clear_tile(cell) {
            return;
        }
        log::debug!("{:?} at {} destroyed", kind, cell);
        self.pending_removal.insert(entity);

        let effect = self.spawner.instantiate("BreakEffect", cell.center(), 0.0);
        self.spawner.destroy(effect, self.config.feedback.break_effect);

        if !self.config.drops.rolls_drop(kind, &mut self.rng) {
            return;
        }
        if let Some(pickup) = self.config.drop_table.pick(&mut self.rng) {
            if let Err(e) = self.spawn_pickup(pickup, cell.center()) {
                log::warn!("Could not drop {} at {}: {}", pickup.name(), cell, e);
            }
        }
    }

    fn burn_pickup(&mut self, entity: EntityId) {
        let now = self.clock.now();
        if let Some(pickup) = self.pickups.get(&entity) {
            if pickup.burns(now) {
                log::debug!("{} burnt", pickup.kind.name());
                self.pending_removal.insert(entity);
            }
        }
    }

    fn pickup_contact(&mut self, event: ContactEvent) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        if player.entity != event.other || player.health.is_dead() {
            return;
        }
        let Some(pickup) = self.pickups.get_mut(&event.sensor) else {
            return;
        };
        let Some(effect) = pickup.collect(&self.config.pickups) else {
            return;
        };

        match effect {
            PickupEffect::Speed(bonus) => player.speed += bonus,
            PickupEffect::Lives(lives) => player.lives = player.lives.saturating_add(lives),
            PickupEffect::BombCharge => player.arsenal.bombs.add_charge(),
            PickupEffect::Power => player.arsenal.bombs.add_power(),
            PickupEffect::Weapon(kind) => {
                let ammo = player.arsenal.slot(kind).stats.pickup_ammo;
                player.arsenal.grant(kind, ammo);
            }
        }
        self.pending_removal.insert(event.sensor);
        self.presentation.play_sound("Pickup");
    }

    fn bullet_contact(&mut self, event: ContactEvent) {
        let now = self.clock.now();
        if self.pending_removal.contains(&event.sensor) {
            return;
        }
        let Some(bullet) = self.projectiles.get(&event.sensor) else {
            return;
        };
        if bullet.ignores(event.other, now) {
            return;
        }
        let damage = bullet.damage_info();
        let position = bullet.position;

        self.pending_removal.insert(event.sensor);
        let impact = self.spawner.instantiate("BulletImpact", position, 0.0);
        self.spawner
            .destroy(impact, self.config.projectile.impact_effect_duration);

        if event.other_tag.is_actor() {
            if let Err(e) = self.damage_actor(event.other, damage) {
                log::warn!("Bullet {} skipped {}: {}", event.sensor, event.other, e);
            }
        }
    }

    fn run_timers(&mut self) {
        let now = self.clock.now();
        for timer in self.timers.poll(now) {
            let owner = timer.owner;
            match timer.payload {
                TimerAction::Detonate => self.detonate(owner),
                TimerAction::SpawnFlame {
                    origin,
                    spawn,
                    damage,
                } => self.spawn_flame(owner, origin, &spawn, damage),
                TimerAction::FireCollisionOff => {
                    if let Err(e) = self.physics.set_enabled(owner, false) {
                        log::debug!("Fire {} already gone: {}", owner, e);
                    }
                    self.contacts.forget(owner);
                }
                TimerAction::Remove => {
                    self.pending_removal.insert(owner);
                }
                TimerAction::EndFlash => self.end_flash(owner),
                TimerAction::Respawn => self.respawn_player(),
            }
        }
    }

    fn detonate(&mut self, bomb: EntityId) {
        let Some(bomb) = self.bombs.remove(&bomb) else {
            return;
        };
        let pattern = bomb.detonate(&PhysicsObstacles::new(&self.physics, LayerMask::obstacles()));
        self.pending_removal.insert(bomb.entity);
        self.presentation.play_sound("Explosion");

        let source = FireSource::Bomb { owner: bomb.owner };
        for tile in &pattern.tiles {
            let lifetime = self.config.explosion.lifetime(tile.step);
            let damage = self.config.explosion.damage;
            if let Err(e) = self.spawn_fire(tile.position(), source, damage, lifetime) {
                log::warn!("Could not spawn fire at {}: {}", tile.cell, e);
            }
        }

        if let Some(player) = self.player.as_mut().filter(|p| p.entity == bomb.owner) {
            player.arsenal.bombs.return_charge();
        }
    }

    fn spawn_flame(&mut self, shooter: EntityId, origin: Vec2, spawn: &FlameSpawn, damage: f32) {
        let obstacles = LayerMask::obstacles();
        if is_spawn_blocked(&self.physics, origin, spawn, obstacles, self.config.flame.clearance) {
            log::trace!("Flame at {:?} blocked", spawn.position(origin));
            return;
        }
        let source = FireSource::FlameThrower { owner: shooter };
        let lifetime = self.config.flame.lifetime;
        if let Err(e) = self.spawn_fire(spawn.position(origin), source, damage, lifetime) {
            log::warn!("Could not spawn flame: {}", e);
        }
    }

    fn end_flash(&mut self, actor: EntityId) {
        let now = self.clock.now();
        if let Some(health) = self.health(actor) {
            let tint = if health.is_invulnerable(now) {
                Tint::FADED
            } else {
                Tint::WHITE
            };
            self.presentation.set_sprite_tint(actor, tint);
        }
    }

    fn respawn_player(&mut self) {
        let now = self.clock.now();
        let invulnerable_for = self.config.player.respawn_invulnerability;
        let Some(player) = self.player.as_mut() else {
            return;
        };
        if player.health.is_alive() {
            return;
        }
        player.reset_position();
        let (entity, position, lives) = (player.entity, player.position, player.lives);
        let events = player.health.revive(now, invulnerable_for);

        let restored = self
            .physics
            .set_position(entity, position)
            .and_then(|_| self.physics.set_enabled(entity, true));
        if let Err(e) = restored {
            log::warn!("Could not restore player collider: {}", e);
        }
        for event in events {
            self.on_health_event(event);
        }
        log::info!("Player respawned, {} lives left", lives);
    }

    fn update_health(&mut self) {
        let now = self.clock.now();
        let mut events = Vec::new();
        if let Some(player) = self.player.as_mut() {
            events.extend(player.health.update(now));
        }
        for enemy in self.enemies.values_mut() {
            events.extend(enemy.health.update(now));
        }
        for event in events {
            self.on_health_event(event);
        }
    }

    fn update_enemies(&mut self) {
        let now = self.clock.now();
        let target = self.player.as_ref().map(|p| (p.entity, p.position));
        let mut attacks = Vec::new();
        let mut summoners = Vec::new();

        for (id, enemy) in self.enemies.iter_mut() {
            if enemy.health.is_dead() {
                continue;
            }
            match enemy
                .brain
                .think(&self.physics, enemy.position, &enemy.health, target, now)
            {
                Ok(decision) => {
                    let was_moving = enemy.velocity != Vec2::ZERO;
                    enemy.velocity = decision.velocity;
                    if decision.is_moving() != was_moving {
                        self.presentation
                            .set_animation_flag(*id, "Moving", decision.is_moving());
                    }
                    if let Some(attack) = decision.attack {
                        attacks.push(attack);
                    }
                    if decision.spawn_minion {
                        summoners.push(*id);
                    }
                }
                Err(e) => {
                    log::warn!("Enemy {} skipped: {}", id, e);
                    enemy.velocity = Vec2::ZERO;
                }
            }
        }

        if let Some((player, _)) = target {
            for attack in attacks {
                if let Err(e) = self.damage_actor(player, attack) {
                    log::warn!("Enemy attack skipped: {}", e);
                }
            }
        }
        for summoner in summoners {
            if let Err(e) = self.spawn_minion(summoner) {
                log::warn!("Minion spawn failed for {}: {}", summoner, e);
            }
        }
    }

    fn update_player_actions<I: InputProvider + ?Sized>(&mut self, input: &I) {
        let now = self.clock.now();
        let Some(player) = self.player.as_mut() else {
            return;
        };
        if !player.health.can_act(now) {
            return;
        }

        if input.switch_pressed() {
            let weapon = player.arsenal.switch_next();
            log::debug!("Active weapon: {:?}", weapon);
        }

        let action = match player.arsenal.attack(input.attack(), now) {
            Ok(Some(action)) => action,
            Ok(None) => return,
            Err(e) if e.is_silent() => {
                log::trace!("Attack ignored: {}", e);
                return;
            }
            Err(e) => {
                log::warn!("Attack failed: {}", e);
                return;
            }
        };

        let (entity, position, facing) = (player.entity, player.position, player.facing);
        let result = match action {
            AttackAction::PlaceBomb { power } => self.place_bomb(entity, position, power).map(|_| ()),
            AttackAction::Fire {
                kind: WeaponKind::FlameThrower,
                damage,
            } => {
                self.fire_flamethrower(entity, position, facing, damage);
                Ok(())
            }
            AttackAction::Fire {
                kind: WeaponKind::Handgun,
                damage,
            } => self.fire_handgun(entity, position, facing, damage).map(|_| ()),
        };
        if let Err(e) = result {
            log::warn!("Player attack failed: {}", e);
        }
    }

    fn flush_removals(&mut self) {
        for entity in std::mem::take(&mut self.pending_removal) {
            self.fires.remove(&entity);
            self.pickups.remove(&entity);
            self.projectiles.remove(&entity);
            self.bombs.remove(&entity);
            self.terrain_cells.remove(&entity);
            if let Some(enemy) = self.enemies.remove(&entity) {
                if let Some(summoner) = enemy.parent.and_then(|p| self.enemies.get_mut(&p)) {
                    summoner.brain.minion_removed(entity);
                }
            }

            self.timers.cancel_owner(entity);
            self.contacts.forget(entity);
            self.contacts.forget_other(entity);
            if self.physics.contains(entity) {
                if let Err(e) = self.physics.remove(entity) {
                    log::warn!("Could not remove collider of {}: {}", entity, e);
                }
            }
            self.spawner.destroy(entity, 0.0);
        }
    }

    fn check_victory(&mut self) {
        if self.status.is_over() || self.enemies_spawned == 0 {
            return;
        }
        if self.enemies.values().all(|e| e.health.is_dead()) {
            self.status = GameStatus::Won;
            self.presentation.play_sound("Victory");
            log::info!("All enemies defeated");
        }
    }

    // ------------------------------------------------------------------
    // Damage
    // ------------------------------------------------------------------

    /// Apply a hit to an actor through its health state machine
    pub fn damage_actor(&mut self, target: EntityId, damage: DamageInfo) -> bomber_core::Result<()> {
        let now = self.clock.now();
        let events = if let Some(player) = self.player.as_mut().filter(|p| p.entity == target) {
            player.health.apply_damage(&damage, now)
        } else if let Some(enemy) = self.enemies.get_mut(&target) {
            enemy.health.apply_damage(&damage, now)
        } else {
            return Err(CombatError::missing("damage target", target));
        };
        if events.is_empty() {
            return Ok(());
        }

        // A new hit restarts the visual feedback
        self.timers.cancel_owner_where(target, TimerAction::is_feedback);
        for event in events {
            self.on_health_event(event);
        }
        Ok(())
    }

    fn on_health_event(&mut self, event: HealthEvent) {
        let now = self.clock.now();
        match event {
            HealthEvent::DamageTaken {
                entity, new_health, ..
            } => {
                log::debug!("{} hit, health {}", entity, new_health);
                self.presentation.set_sprite_tint(entity, Tint::HIT);
                let until = now + f64::from(self.config.feedback.flash);
                self.timers.schedule(entity, until, TimerAction::EndFlash);
            }
            HealthEvent::StunStarted { entity, .. } => {
                self.presentation.set_animation_flag(entity, "Stunned", true);
            }
            HealthEvent::StunEnded { entity } => {
                self.presentation.set_animation_flag(entity, "Stunned", false);
            }
            HealthEvent::InvulnerabilityStarted { entity, .. } => {
                self.presentation
                    .set_animation_flag(entity, "Invulnerable", true);
            }
            HealthEvent::InvulnerabilityEnded { entity } => {
                self.presentation
                    .set_animation_flag(entity, "Invulnerable", false);
                self.presentation.set_sprite_tint(entity, Tint::WHITE);
            }
            HealthEvent::Revived { entity, .. } => {
                self.presentation.set_animation_flag(entity, "Dead", false);
                self.presentation.set_sprite_tint(entity, Tint::FADED);
            }
            HealthEvent::Death {
                entity,
                killer,
                damage_type,
            } => self.on_death(entity, killer, damage_type),
            HealthEvent::Healed {
                entity, new_health, ..
            } => {
                log::debug!("{} healed, health {}", entity, new_health);
            }
        }
    }

    fn on_death(&mut self, entity: EntityId, killer: Option<EntityId>, damage_type: DamageType) {
        let now = self.clock.now();
        self.presentation.set_animation_flag(entity, "Dead", true);
        if let Err(e) = self.physics.set_enabled(entity, false) {
            log::warn!("Could not disable collider of {}: {}", entity, e);
        }
        self.contacts.forget_other(entity);

        if let Some(player) = self.player.as_mut().filter(|p| p.entity == entity) {
            let lives = player.lose_life();
            player.velocity = Vec2::ZERO;
            log::info!("Player died ({:?}), {} lives left", damage_type, lives);
            self.presentation.play_sound("Ouch");
            if lives > 0 {
                let at = now + f64::from(self.config.player.death_delay);
                self.timers.schedule(entity, at, TimerAction::Respawn);
            } else {
                self.status = GameStatus::Lost;
                self.presentation.play_sound("GameOver");
                log::info!("Game over");
            }
            return;
        }

        let parent = self.enemies.get(&entity).and_then(|e| e.parent);
        if let Some(summoner) = parent.and_then(|p| self.enemies.get_mut(&p)) {
            summoner.brain.minion_removed(entity);
        }
        log::info!("{} killed by {:?} ({:?})", entity, killer, damage_type);
        let at = now + f64::from(self.config.feedback.enemy_death_delay);
        self.timers.schedule(entity, at, TimerAction::Remove);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current game time
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Game clock
    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// Configuration in use
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Outcome so far
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// The player, if spawned
    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    /// Mutable player, for scripted setups
    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }

    /// One enemy
    pub fn enemy(&self, entity: EntityId) -> Option<&Enemy> {
        self.enemies.get(&entity)
    }

    /// Every enemy and minion, dead ones included until removed
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.values()
    }

    /// Health of any actor
    pub fn health(&self, entity: EntityId) -> Option<&HealthComponent> {
        match &self.player {
            Some(player) if player.entity == entity => Some(&player.health),
            _ => self.enemies.get(&entity).map(|e| &e.health),
        }
    }

    /// Ticking bombs
    pub fn bombs(&self) -> impl Iterator<Item = &Bomb> {
        self.bombs.values()
    }

    /// Live fire tiles
    pub fn fires(&self) -> impl Iterator<Item = &FireTile> {
        self.fires.values()
    }

    /// Bullets in flight
    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.values()
    }

    /// Pickups lying around
    pub fn pickups(&self) -> impl Iterator<Item = &PickupComponent> {
        self.pickups.values()
    }

    /// Terrain grid
    pub fn terrain(&self) -> &SharedTerrain {
        &self.terrain
    }

    /// Physics world
    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Spawn collaborator
    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Presentation collaborator
    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    /// What the HUD shows right now
    pub fn hud(&self) -> HudSnapshot {
        let enemies_left = self.enemies.values().filter(|e| e.health.is_alive()).count();
        match &self.player {
            Some(player) => {
                let active_weapon = player.arsenal.active();
                let ammo = active_weapon
                    .kind()
                    .map(|kind| player.arsenal.slot(kind).ammo)
                    .unwrap_or(0);
                HudSnapshot {
                    lives: player.lives,
                    health: player.health.current(),
                    max_health: player.health.max(),
                    bombs: player.arsenal.bombs.charges,
                    power: player.arsenal.bombs.power,
                    active_weapon,
                    ammo,
                    enemies_left,
                    status: self.status,
                }
            }
            None => HudSnapshot {
                lives: 0,
                health: 0.0,
                max_health: 0.0,
                bombs: 0,
                power: 0,
                active_weapon: ActiveWeapon::None,
                ammo: 0,
                enemies_left,
                status: self.status,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomber_physics::PhysicsConfig;

    #[test]
    fn test_slide_along_wall() {
        let mut physics = PhysicsWorld::new(PhysicsConfig::default()).unwrap();
        physics
            .insert(
                EntityId::from_raw(1),
                ColliderDesc::new(ColliderTag::Unbreakable, ColliderShape::tile(0.5), Vec2::new(1.0, 0.0)),
            )
            .unwrap();
        let half = Vec2::splat(0.35);

        // Straight into the wall: blocked
        let from = Vec2::new(0.1, 0.0);
        assert_eq!(slide(&physics, from, Vec2::new(0.1, 0.0), half, LayerMask::obstacles()), from);

        // Diagonal: keeps the free axis
        let next = slide(&physics, from, Vec2::new(0.1, 0.1), half, LayerMask::obstacles());
        assert_eq!(next, Vec2::new(0.1, 0.1));

        // Free space
        let next = slide(&physics, Vec2::new(-2.0, 0.0), Vec2::new(0.5, 0.0), half, LayerMask::obstacles());
        assert_eq!(next, Vec2::new(-1.5, 0.0));
    }

    #[test]
    fn test_feedback_timers() {
        assert!(TimerAction::EndFlash.is_feedback());
        assert!(!TimerAction::Remove.is_feedback());
        assert!(!TimerAction::Respawn.is_feedback());
    }
}
