#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Path Defence.
//!
//! All mutation flows through [`apply`]; all reads flow through [`query`].
//! Invalid player actions are answered with rejection events rather than
//! errors, so adapters can submit commands optimistically.

use std::collections::VecDeque;

use path_defence_core::{
    tuning::Tuning, Command, DeliveryMode, Difficulty, EnemyClass, EnemyId, Event, ImpactEffects,
    MapError, PlacementError, PoisonEffect, ProjectileId, ProjectileSpawn, RemovalError,
    RestoreError, SpawnConfig, TowerId, TowerKind, UpgradeError, WaveBonus, WorldPoint,
};

mod enemies;
mod path;
mod projectiles;
mod towers;

use enemies::Enemy;
use path::PathMap;
use projectiles::{FlightStep, Projectile};
use towers::TowerRegistry;

/// Upper bound on the game speed multiplier.
const MAX_GAME_SPEED: u32 = 3;
/// Largest simulated step used when ticking status effects.
const STATUS_STEP_MS: f32 = 100.0;
/// Per-frame barrel smoothing factor at the reference frame rate.
const ANGLE_SMOOTHING: f32 = 0.18;
/// Reference frame duration the smoothing factor is calibrated against.
const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

/// Health fraction a spawnling inherits from its parent.
const SPAWNLING_HEALTH_FRACTION: f32 = 0.25;
/// Speed factor a spawnling gains over its parent.
const SPAWNLING_SPEED_FACTOR: f32 = 1.2;
/// Number of spawnlings produced by a splitting enemy.
const SPAWNLING_COUNT: u32 = 2;

#[derive(Clone, Debug)]
struct ScheduledSpawn {
    due_ms: f64,
    config: SpawnConfig,
}

/// Represents the authoritative Path Defence world state.
#[derive(Debug)]
pub struct World {
    tuning: Tuning,
    map: PathMap,
    map_index: u32,
    difficulty: Difficulty,
    clock_ms: f64,
    paused: bool,
    speed_multiplier: u32,
    gold: u32,
    lives: u32,
    wave: u32,
    score: u32,
    wave_in_progress: bool,
    leaked_this_wave: bool,
    game_over: bool,
    boost_multiplier: f32,
    boost_remaining_ms: f32,
    enemies: Vec<Enemy>,
    towers: TowerRegistry,
    projectiles: Vec<Projectile>,
    spawn_queue: VecDeque<ScheduledSpawn>,
    next_enemy_id: u32,
    next_projectile_id: u32,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a fresh world on the first built-in map with default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    /// Creates a fresh world on the first built-in map with custom tuning.
    #[must_use]
    pub fn with_tuning(tuning: Tuning) -> Self {
        let map = PathMap::builtin(0).expect("the first map is built in");
        let mut world = Self {
            gold: tuning.economy.starting_gold,
            lives: tuning.economy.starting_lives,
            tuning,
            map,
            map_index: 0,
            difficulty: Difficulty::default(),
            clock_ms: 0.0,
            paused: false,
            speed_multiplier: 1,
            wave: 0,
            score: 0,
            wave_in_progress: false,
            leaked_this_wave: false,
            game_over: false,
            boost_multiplier: 1.0,
            boost_remaining_ms: 0.0,
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            projectiles: Vec::new(),
            spawn_queue: VecDeque::new(),
            next_enemy_id: 0,
            next_projectile_id: 0,
        };
        world.reset_session();
        world
    }

    fn reset_session(&mut self) {
        self.clock_ms = 0.0;
        self.paused = false;
        self.speed_multiplier = 1;
        self.gold = self.tuning.economy.starting_gold;
        self.lives = self.tuning.economy.starting_lives;
        self.wave = 0;
        self.score = 0;
        self.wave_in_progress = false;
        self.leaked_this_wave = false;
        self.game_over = false;
        self.boost_multiplier = 1.0;
        self.boost_remaining_ms = 0.0;
        self.enemies.clear();
        self.towers = TowerRegistry::new();
        self.projectiles.clear();
        self.spawn_queue.clear();
        self.next_enemy_id = 0;
        self.next_projectile_id = 0;
    }

    fn spawn_enemy(&mut self, config: &SpawnConfig, out_events: &mut Vec<Event>) {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id += 1;
        let start = self.map.position_at(0, 0.0);
        self.enemies.push(Enemy::from_config(id, config, start));
        out_events.push(Event::EnemySpawned {
            enemy: id,
            class: config.class,
        });
    }

    fn enemy_index(&self, id: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|enemy| enemy.id == id)
    }

    fn credit_tower_damage(&mut self, tower: Option<TowerId>, amount: f32) {
        if let Some(id) = tower {
            if let Some(state) = self.towers.get_mut(id) {
                state.total_damage += amount;
            }
        }
    }

    fn apply_poison_with_spread(
        &mut self,
        victim: usize,
        effect: PoisonEffect,
        source: Option<TowerId>,
    ) {
        let anchor = self.enemies[victim].position;
        self.enemies[victim].apply_poison(effect, source);
        if !effect.spreads {
            return;
        }
        let range = self.tuning.combat.poison_spread_range;
        let range_squared = range * range;
        let mut carrier: Option<usize> = None;
        let mut best = f32::INFINITY;
        for (index, enemy) in self.enemies.iter().enumerate() {
            if index == victim || !enemy.poisons.is_empty() {
                continue;
            }
            let distance = enemy.position.distance_squared(anchor);
            if distance <= range_squared && distance < best {
                best = distance;
                carrier = Some(index);
            }
        }
        if let Some(index) = carrier {
            self.enemies[index].apply_poison(
                PoisonEffect {
                    damage_per_second: effect.damage_per_second * 0.5,
                    duration_ms: effect.duration_ms,
                    spreads: false,
                },
                source,
            );
        }
    }

    fn resolve_impact(&mut self, shot: Projectile) {
        let Some(target_index) = self.enemy_index(shot.target) else {
            return;
        };
        let source = Some(shot.tower);
        match shot.delivery {
            DeliveryMode::Single { effects } => {
                let dealt = self.enemies[target_index].take_direct_damage(shot.damage, source);
                self.credit_tower_damage(source, dealt);
                if let Some(slow) = effects.slow {
                    self.enemies[target_index].apply_slow(slow);
                }
                if let Some(poison) = effects.poison {
                    self.apply_poison_with_spread(target_index, poison, source);
                }
            }
            DeliveryMode::Splash {
                radius,
                shockwave,
                pool,
            } => {
                let centre = self.enemies[target_index].position;
                let inner = radius * radius;
                let mut victims: Vec<usize> = Vec::new();
                let mut ringed: Vec<usize> = Vec::new();
                for (index, enemy) in self.enemies.iter().enumerate() {
                    let distance = enemy.position.distance_squared(centre);
                    if distance <= inner {
                        victims.push(index);
                    } else if let Some(wave) = shockwave {
                        let outer = radius + wave.bonus_radius;
                        if distance <= outer * outer {
                            ringed.push(index);
                        }
                    }
                }
                let mut dealt_total = 0.0;
                for &index in &victims {
                    dealt_total += self.enemies[index].take_area_damage(shot.damage, source);
                    if let Some(poison) = pool {
                        self.enemies[index].apply_poison(poison, source);
                    }
                }
                if let Some(wave) = shockwave {
                    for &index in &ringed {
                        dealt_total += self.enemies[index]
                            .take_area_damage(shot.damage * wave.fraction, source);
                    }
                }
                self.credit_tower_damage(source, dealt_total);
            }
            DeliveryMode::Chain {
                bounces,
                range,
                falloff,
                effects,
            } => {
                let mut struck: Vec<usize> = vec![target_index];
                let mut current = target_index;
                let mut damage = shot.damage;
                let mut dealt_total =
                    self.enemies[target_index].take_direct_damage(damage, source);
                self.apply_chain_effects(target_index, effects, source);
                let range_squared = range * range;
                for _ in 0..bounces {
                    let anchor = self.enemies[current].position;
                    let mut next: Option<usize> = None;
                    let mut best = f32::INFINITY;
                    for (index, enemy) in self.enemies.iter().enumerate() {
                        if struck.contains(&index) || enemy.health <= 0.0 {
                            continue;
                        }
                        let distance = enemy.position.distance_squared(anchor);
                        if distance <= range_squared && distance < best {
                            best = distance;
                            next = Some(index);
                        }
                    }
                    let Some(index) = next else {
                        break;
                    };
                    damage *= falloff;
                    dealt_total += self.enemies[index].take_direct_damage(damage, source);
                    self.apply_chain_effects(index, effects, source);
                    struck.push(index);
                    current = index;
                }
                self.credit_tower_damage(source, dealt_total);
            }
        }
    }

    fn apply_chain_effects(
        &mut self,
        victim: usize,
        effects: ImpactEffects,
        source: Option<TowerId>,
    ) {
        if let Some(slow) = effects.slow {
            self.enemies[victim].apply_slow(slow);
        }
        if let Some(poison) = effects.poison {
            self.apply_poison_with_spread(victim, poison, source);
        }
    }

    fn settle_deaths(&mut self, out_events: &mut Vec<Event>) {
        loop {
            let Some(index) = self.enemies.iter().position(|enemy| enemy.health <= 0.0) else {
                break;
            };
            let dead = self.enemies.remove(index);
            if dead.splits_on_death {
                for _ in 0..SPAWNLING_COUNT {
                    let config = SpawnConfig {
                        class: EnemyClass::Spawnling,
                        max_health: dead.max_health * SPAWNLING_HEALTH_FRACTION,
                        speed: dead.base_speed * SPAWNLING_SPEED_FACTOR,
                        armor: 0.0,
                        regen_per_second: 0.0,
                        reward: 1,
                        score: 2,
                        slow_immune: false,
                        stealthy: false,
                        rage_capable: false,
                        splits_on_death: false,
                        delay_ms: 0,
                    };
                    let id = EnemyId::new(self.next_enemy_id);
                    self.next_enemy_id += 1;
                    let mut spawnling = Enemy::from_config(id, &config, dead.position);
                    spawnling.path_index = dead.path_index;
                    spawnling.progress = dead.progress;
                    self.enemies.push(spawnling);
                    out_events.push(Event::EnemySpawned {
                        enemy: id,
                        class: config.class,
                    });
                }
            }
            self.gold = self.gold.saturating_add(dead.reward);
            self.score = self.score.saturating_add(dead.score);
            if let Some(killer) = dead.last_hit_by {
                if let Some(tower) = self.towers.get_mut(killer) {
                    tower.kills += 1;
                }
            }
            out_events.push(Event::EnemyKilled {
                enemy: dead.id,
                class: dead.class,
                killer: dead.last_hit_by,
                reward: dead.reward,
                score: dead.score,
            });
        }
    }

    fn complete_wave_if_clear(&mut self, out_events: &mut Vec<Event>) {
        if !self.wave_in_progress
            || !self.spawn_queue.is_empty()
            || !self.enemies.is_empty()
            || self.game_over
        {
            return;
        }
        self.wave_in_progress = false;
        let economy = &self.tuning.economy;
        let base = economy.wave_bonus_base + economy.wave_bonus_per_wave * self.wave;
        let no_leak = if self.leaked_this_wave {
            0
        } else {
            economy.no_leak_bonus
        };
        let interest =
            ((self.gold as f32 * economy.interest_rate) as u32).min(economy.interest_cap);
        let bonus = WaveBonus {
            base,
            no_leak,
            interest,
        };
        self.gold = self.gold.saturating_add(bonus.total());
        self.score = self.score.saturating_add(self.wave * 10);
        out_events.push(Event::WaveCompleted {
            wave: self.wave,
            bonus,
        });
    }

    fn tick(&mut self, dt_ms: f32, out_events: &mut Vec<Event>) {
        self.clock_ms += f64::from(dt_ms);

        if self.boost_remaining_ms > 0.0 {
            self.boost_remaining_ms -= dt_ms;
            if self.boost_remaining_ms <= 0.0 {
                self.boost_multiplier = 1.0;
                self.boost_remaining_ms = 0.0;
            }
        }

        while let Some(front) = self.spawn_queue.front() {
            if front.due_ms > self.clock_ms {
                break;
            }
            let scheduled = self.spawn_queue.pop_front().expect("front exists");
            self.spawn_enemy(&scheduled.config, out_events);
        }

        self.tick_statuses(dt_ms);
        self.settle_deaths(out_events);
        if self.tick_movement(dt_ms, out_events) {
            return;
        }
        self.tick_towers(dt_ms);
        self.tick_beams(dt_ms);
        self.settle_deaths(out_events);
        self.tick_projectiles(dt_ms);
        self.settle_deaths(out_events);
        self.complete_wave_if_clear(out_events);
    }

    fn tick_statuses(&mut self, dt_ms: f32) {
        let mut remaining = dt_ms;
        let mut credits: Vec<(TowerId, f32)> = Vec::new();
        while remaining > 0.0 {
            let step = remaining.min(STATUS_STEP_MS);
            remaining -= step;
            for enemy in &mut self.enemies {
                let mut stacks = std::mem::take(&mut enemy.poisons);
                for stack in &mut stacks {
                    if enemy.health <= 0.0 {
                        break;
                    }
                    let slice = step.min(stack.remaining_ms);
                    let amount = stack.damage_per_second * slice / 1000.0;
                    let dealt = enemy.take_area_damage(amount, stack.source);
                    if let Some(tower) = stack.source {
                        credits.push((tower, dealt));
                    }
                    stack.remaining_ms -= step;
                }
                stacks.retain(|stack| stack.remaining_ms > 0.0);
                enemy.poisons = stacks;
                enemy.tick_passives(step);
            }
        }
        for (tower, amount) in credits {
            self.credit_tower_damage(Some(tower), amount);
        }
    }

    /// Advances every enemy along the path. Returns `true` when the session
    /// ended during this tick.
    fn tick_movement(&mut self, dt_ms: f32, out_events: &mut Vec<Event>) -> bool {
        let mut leaked: Vec<usize> = Vec::new();
        for (index, enemy) in self.enemies.iter_mut().enumerate() {
            let mut travel = enemy.effective_speed() * dt_ms / 1000.0;
            while travel > 0.0 {
                let segment = self.map.segment_length(enemy.path_index);
                let left = segment - enemy.progress;
                if travel < left {
                    enemy.progress += travel;
                    travel = 0.0;
                } else {
                    travel -= left;
                    enemy.path_index += 1;
                    enemy.progress = 0.0;
                    if enemy.path_index >= self.map.segment_count() {
                        leaked.push(index);
                        break;
                    }
                }
            }
            if enemy.path_index < self.map.segment_count() {
                enemy.position = self.map.position_at(enemy.path_index, enemy.progress);
            }
        }
        for index in leaked.into_iter().rev() {
            let enemy = self.enemies.remove(index);
            self.lives = self.lives.saturating_sub(1);
            self.leaked_this_wave = true;
            out_events.push(Event::EnemyLeaked {
                enemy: enemy.id,
                lives_remaining: self.lives,
            });
            if self.lives == 0 && !self.game_over {
                self.game_over = true;
                out_events.push(Event::GameOver {
                    wave: self.wave,
                    score: self.score,
                });
                return true;
            }
        }
        false
    }

    fn tick_towers(&mut self, dt_ms: f32) {
        let alpha = 1.0 - (1.0 - ANGLE_SMOOTHING).powf(dt_ms / REFERENCE_FRAME_MS);
        let headings: Vec<(TowerId, Option<WorldPoint>)> = self
            .towers
            .iter()
            .map(|tower| {
                let target = tower
                    .target
                    .and_then(|id| self.enemies.iter().find(|enemy| enemy.id == id))
                    .map(|enemy| enemy.position);
                (tower.id, target)
            })
            .collect();
        for (id, target) in headings {
            let Some(tower) = self.towers.get_mut(id) else {
                continue;
            };
            tower.cooldown_remaining_ms = (tower.cooldown_remaining_ms - dt_ms).max(0.0);
            if let Some(position) = target {
                let origin = tower.cell.centre();
                let desired = (position.y() - origin.y()).atan2(position.x() - origin.x());
                let mut delta = desired - tower.angle;
                while delta > std::f32::consts::PI {
                    delta -= std::f32::consts::TAU;
                }
                while delta < -std::f32::consts::PI {
                    delta += std::f32::consts::TAU;
                }
                tower.angle += delta * alpha;
            }
        }
    }

    fn tick_beams(&mut self, dt_ms: f32) {
        let lasers: Vec<TowerId> = self
            .towers
            .iter()
            .filter(|tower| tower.kind == TowerKind::Laser)
            .map(|tower| tower.id)
            .collect();
        for id in lasers {
            let Some(stats) = self
                .towers
                .derived_stats(id, &self.tuning, self.boost_multiplier)
            else {
                continue;
            };
            let (target, detects, level, lock_ms, overdrive_ms, origin) = {
                let tower = self.towers.get(id).expect("laser exists");
                (
                    tower.target,
                    tower.detects_stealth(),
                    tower.level,
                    tower.beam_lock_ms,
                    tower.beam_overdrive_ms,
                    tower.cell.centre(),
                )
            };
            let combat = self.tuning.combat;
            let locked = target.and_then(|enemy_id| self.enemy_index(enemy_id)).filter(
                |&index| {
                    let enemy = &self.enemies[index];
                    enemy.health > 0.0
                        && (!enemy.stealthy || detects)
                        && enemy.position.distance_squared(origin) <= stats.range * stats.range
                },
            );
            let Some(index) = locked else {
                if let Some(tower) = self.towers.get_mut(id) {
                    tower.reset_beam();
                }
                continue;
            };
            let lock = lock_ms + dt_ms;
            let ramp = (lock / combat.beam_ramp_ms as f32).min(1.0);
            let mut overdrive = overdrive_ms;
            let mut overdrive_multiplier = 1.0;
            if level >= 3 && lock > combat.beam_ramp_ms as f32 {
                overdrive += dt_ms;
                let charge = (overdrive / combat.beam_overdrive_ms as f32).min(1.0);
                overdrive_multiplier = 1.0 + combat.beam_overdrive_bonus * charge;
            }
            let multiplier = {
                let tower = self.towers.get(id).expect("laser exists");
                self.tuning.upgrades.level(level).damage
                    * self.towers.synergy_multiplier(id)
                    * tower.veteran_multiplier()
                    * self.boost_multiplier
            };
            let dps = combat.beam_base_dps
                + (combat.beam_max_dps - combat.beam_base_dps) * ramp;
            let amount = dps * overdrive_multiplier * multiplier * dt_ms / 1000.0;
            let dealt = self.enemies[index].take_area_damage(amount, Some(id));
            self.credit_tower_damage(Some(id), dealt);
            if let Some(tower) = self.towers.get_mut(id) {
                tower.beam_lock_ms = lock;
                tower.beam_overdrive_ms = overdrive;
            }
        }
    }

    fn tick_projectiles(&mut self, dt_ms: f32) {
        let mut arrived: Vec<Projectile> = Vec::new();
        let mut index = 0;
        while index < self.projectiles.len() {
            let target = self.projectiles[index].target;
            let Some(enemy_index) = self.enemy_index(target) else {
                let _ = self.projectiles.swap_remove(index);
                continue;
            };
            let destination = self.enemies[enemy_index].position;
            match self.projectiles[index].advance(destination, dt_ms) {
                FlightStep::Arrived => {
                    arrived.push(self.projectiles.swap_remove(index));
                }
                FlightStep::InFlight => index += 1,
            }
        }
        for shot in arrived {
            self.resolve_impact(shot);
        }
    }
}

/// Applies a command to the world, appending resulting events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            if world.paused || world.game_over {
                return;
            }
            let dt_ms = dt.as_secs_f32() * 1000.0 * world.speed_multiplier as f32;
            out_events.push(Event::TimeAdvanced { dt });
            world.tick(dt_ms, out_events);
        }
        Command::SelectMap { map_index } => {
            if world.wave_in_progress {
                out_events.push(Event::MapSelectionRejected {
                    map_index,
                    reason: MapError::WaveInProgress,
                });
                return;
            }
            let Some(map) = PathMap::builtin(map_index) else {
                out_events.push(Event::MapSelectionRejected {
                    map_index,
                    reason: MapError::UnknownMap,
                });
                return;
            };
            world.map = map;
            world.map_index = map_index;
            world.towers.clear();
            world.enemies.clear();
            world.projectiles.clear();
            world.spawn_queue.clear();
            out_events.push(Event::MapSelected { map_index });
        }
        Command::SetDifficulty { difficulty } => {
            world.difficulty = difficulty;
            out_events.push(Event::DifficultyChanged { difficulty });
        }
        Command::StartWave => {
            if world.wave_in_progress || world.game_over {
                return;
            }
            world.wave += 1;
            world.wave_in_progress = true;
            world.leaked_this_wave = false;
            out_events.push(Event::WaveStarted { wave: world.wave });
        }
        Command::LoadRoster { roster } => {
            if !world.wave_in_progress || roster.wave != world.wave {
                return;
            }
            let mut entries = roster.entries;
            entries.sort_by_key(|entry| entry.delay_ms);
            world.spawn_queue = entries
                .into_iter()
                .map(|config| ScheduledSpawn {
                    due_ms: world.clock_ms + f64::from(config.delay_ms),
                    config,
                })
                .collect();
        }
        Command::PlaceTower { kind, cell } => {
            let reason = if !world.map.in_bounds(cell) {
                Some(PlacementError::OutOfBounds)
            } else if world.map.contains_cell(cell) {
                Some(PlacementError::OnPath)
            } else if world.towers.occupies(cell) {
                Some(PlacementError::Occupied)
            } else if world.gold < world.tuning.towers.get(kind).cost {
                Some(PlacementError::InsufficientGold)
            } else {
                None
            };
            if let Some(reason) = reason {
                out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
                return;
            }
            world.gold -= world.tuning.towers.get(kind).cost;
            let tower = world.towers.insert(kind, cell);
            out_events.push(Event::TowerPlaced { tower, kind, cell });
        }
        Command::SellTower { tower } => {
            let Some(state) = world.towers.remove(tower) else {
                out_events.push(Event::TowerRemovalRejected {
                    tower,
                    reason: RemovalError::MissingTower,
                });
                return;
            };
            let base_cost = world.tuning.towers.get(state.kind).cost;
            let spent = world.tuning.upgrades.cumulative_spend(base_cost, state.level);
            let refund = (spent as f32 * world.tuning.upgrades.sell_refund) as u32;
            world.gold = world.gold.saturating_add(refund);
            out_events.push(Event::TowerSold { tower, refund });
        }
        Command::UpgradeTower { tower } => {
            let Some(state) = world.towers.get(tower) else {
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::MissingTower,
                });
                return;
            };
            let base_cost = world.tuning.towers.get(state.kind).cost;
            let Some(cost) = world.tuning.upgrades.upgrade_cost(base_cost, state.level) else {
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::MaxLevel,
                });
                return;
            };
            if world.gold < cost {
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::InsufficientGold,
                });
                return;
            }
            world.gold -= cost;
            let state = world.towers.get_mut(tower).expect("tower exists");
            state.level += 1;
            let level = state.level;
            out_events.push(Event::TowerUpgraded { tower, level, cost });
        }
        Command::SetTargetMode { tower, mode } => {
            if let Some(state) = world.towers.get_mut(tower) {
                state.target_mode = mode;
                out_events.push(Event::TargetModeChanged { tower, mode });
            }
        }
        Command::AssignTarget { tower, target } => {
            let resolved = target.filter(|id| world.enemy_index(*id).is_some());
            if let Some(state) = world.towers.get_mut(tower) {
                if state.target != resolved {
                    state.target = resolved;
                    state.reset_beam();
                    out_events.push(Event::TargetAssigned {
                        tower,
                        target: resolved,
                    });
                }
            }
        }
        Command::FireProjectile { tower, shots } => {
            let Some(state) = world.towers.get_mut(tower) else {
                return;
            };
            let kind = state.kind;
            let origin = state.cell.centre();
            let interval = world
                .towers
                .derived_stats(tower, &world.tuning, world.boost_multiplier)
                .map_or(0, |stats| stats.fire_interval_ms);
            let mut fired = false;
            for ProjectileSpawn {
                target,
                damage,
                speed,
                delivery,
            } in shots
            {
                if world.enemy_index(target).is_none() {
                    continue;
                }
                fired = true;
                let id = ProjectileId::new(world.next_projectile_id);
                world.next_projectile_id += 1;
                world.projectiles.push(Projectile {
                    id,
                    tower,
                    tower_kind: kind,
                    target,
                    position: origin,
                    speed,
                    damage,
                    delivery,
                });
            }
            if fired {
                let state = world.towers.get_mut(tower).expect("tower exists");
                state.shots_fired += 1;
                state.cooldown_remaining_ms = interval as f32;
            }
        }
        Command::PulseAura { tower, damage } => {
            let Some(stats) = world
                .towers
                .derived_stats(tower, &world.tuning, world.boost_multiplier)
            else {
                return;
            };
            let Some(state) = world.towers.get(tower) else {
                return;
            };
            let origin = state.cell.centre();
            let range_squared = stats.range * stats.range;
            let interval = stats.fire_interval_ms;
            let mut dealt_total = 0.0;
            for enemy in &mut world.enemies {
                if enemy.position.distance_squared(origin) <= range_squared {
                    dealt_total += enemy.take_area_damage(damage, Some(tower));
                }
            }
            world.credit_tower_damage(Some(tower), dealt_total);
            let state = world.towers.get_mut(tower).expect("tower exists");
            state.pulses_fired += 1;
            state.cooldown_remaining_ms = interval as f32;
            let mut settled = Vec::new();
            world.settle_deaths(&mut settled);
            out_events.append(&mut settled);
        }
        Command::SetGameSpeed { multiplier } => {
            let clamped = multiplier.clamp(1, MAX_GAME_SPEED);
            if clamped != world.speed_multiplier {
                world.speed_multiplier = clamped;
                out_events.push(Event::GameSpeedChanged {
                    multiplier: clamped,
                });
            }
        }
        Command::SetPaused { paused } => {
            if paused != world.paused {
                world.paused = paused;
                out_events.push(Event::PausedChanged { paused });
            }
        }
        Command::ActivateDamageBoost {
            multiplier,
            duration,
        } => {
            world.boost_multiplier = multiplier;
            world.boost_remaining_ms = duration.as_secs_f32() * 1000.0;
            out_events.push(Event::DamageBoostActivated { multiplier });
        }
        Command::RestoreSnapshot { snapshot } => {
            if world.wave_in_progress {
                out_events.push(Event::SnapshotRejected {
                    reason: RestoreError::WaveInProgress,
                });
                return;
            }
            let Some(map) = PathMap::builtin(snapshot.map_index) else {
                out_events.push(Event::SnapshotRejected {
                    reason: RestoreError::UnknownMap,
                });
                return;
            };
            world.reset_session();
            world.map = map;
            world.map_index = snapshot.map_index;
            world.difficulty = snapshot.difficulty;
            world.gold = snapshot.gold;
            world.lives = snapshot.lives;
            world.wave = snapshot.wave;
            world.score = snapshot.score;
            for saved in &snapshot.towers {
                if !world.map.in_bounds(saved.cell)
                    || world.map.contains_cell(saved.cell)
                    || world.towers.occupies(saved.cell)
                {
                    continue;
                }
                let id = world.towers.insert(saved.kind, saved.cell);
                let state = world.towers.get_mut(id).expect("tower exists");
                state.level = saved.level.clamp(1, 3);
                state.kills = saved.kills;
                state.total_damage = saved.total_damage;
                state.target_mode = saved.target_mode;
            }
            out_events.push(Event::SnapshotRestored {
                wave: snapshot.wave,
            });
        }
        Command::Reset => {
            world.reset_session();
            out_events.push(Event::GameReset);
        }
    }
}

/// Read-only queries over the authoritative world state.
pub mod query {
    use path_defence_core::{
        tuning::Tuning, BeamSnapshot, EnemySnapshot, EnemyView, GameStatus, ProjectileSnapshot,
        ProjectileView, SaveSnapshot, SavedTower, TowerKind, TowerSnapshot, TowerView, WorldPoint,
    };

    use super::{path, World};

    /// Captures a read-only view of every enemy on the path.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                class: enemy.class,
                position: enemy.position,
                health: enemy.health,
                max_health: enemy.max_health,
                path_index: enemy.path_index,
                progress: enemy.progress,
                speed: enemy.effective_speed(),
                armor: enemy.armor,
                slowed: enemy.slow.is_some(),
                poisoned: !enemy.poisons.is_empty(),
                raging: enemy.raging,
                stealthy: enemy.stealthy,
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every placed tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let snapshots: Vec<TowerSnapshot> = world
            .towers
            .iter()
            .map(|tower| {
                let stats = world
                    .towers
                    .derived_stats(tower.id, &world.tuning, world.boost_multiplier)
                    .expect("registered tower derives stats");
                TowerSnapshot {
                    id: tower.id,
                    kind: tower.kind,
                    level: tower.level,
                    cell: tower.cell,
                    position: tower.cell.centre(),
                    angle: tower.angle,
                    target: tower.target,
                    target_mode: tower.target_mode,
                    damage: stats.damage,
                    range: stats.range,
                    fire_interval_ms: stats.fire_interval_ms,
                    cooldown_remaining_ms: tower.cooldown_remaining_ms as u32,
                    shots_fired: tower.shots_fired,
                    pulses_fired: tower.pulses_fired,
                    kills: tower.kills,
                    total_damage: tower.total_damage,
                    detects_stealth: tower.detects_stealth(),
                }
            })
            .collect();
        TowerView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots: Vec<ProjectileSnapshot> = world
            .projectiles
            .iter()
            .map(|shot| ProjectileSnapshot {
                id: shot.id,
                tower: shot.tower,
                tower_kind: shot.tower_kind,
                target: shot.target,
                position: shot.position,
            })
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }

    /// Captures every laser beam currently locked onto an enemy.
    #[must_use]
    pub fn beam_snapshots(world: &World) -> Vec<BeamSnapshot> {
        world
            .towers
            .iter()
            .filter(|tower| tower.kind == TowerKind::Laser && tower.beam_lock_ms > 0.0)
            .filter_map(|tower| {
                let target = tower.target?;
                let enemy = world.enemies.iter().find(|enemy| enemy.id == target)?;
                let combat = world.tuning.combat;
                let ramp = (tower.beam_lock_ms / combat.beam_ramp_ms as f32).min(1.0);
                let dps =
                    combat.beam_base_dps + (combat.beam_max_dps - combat.beam_base_dps) * ramp;
                let overdrive = if tower.level >= 3 {
                    let charge =
                        (tower.beam_overdrive_ms / combat.beam_overdrive_ms as f32).min(1.0);
                    1.0 + combat.beam_overdrive_bonus * charge
                } else {
                    1.0
                };
                Some(BeamSnapshot {
                    tower: tower.id,
                    from: tower.cell.centre(),
                    to: enemy.position,
                    intensity: dps * overdrive / combat.beam_base_dps,
                })
            })
            .collect()
    }

    /// Captures the aggregate session state in one read.
    #[must_use]
    pub fn game_status(world: &World) -> GameStatus {
        GameStatus {
            gold: world.gold,
            lives: world.lives,
            wave: world.wave,
            score: world.score,
            wave_in_progress: world.wave_in_progress,
            game_over: world.game_over,
            paused: world.paused,
            speed_multiplier: world.speed_multiplier,
            difficulty: world.difficulty,
            map_index: world.map_index,
        }
    }

    /// Provides read-only access to the active tuning tables.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Waypoints of the active path in world coordinates.
    #[must_use]
    pub fn path_waypoints(world: &World) -> Vec<WorldPoint> {
        world.map.waypoints().to_vec()
    }

    /// Number of built-in maps available for selection.
    #[must_use]
    pub fn map_count(_world: &World) -> u32 {
        super::PathMap::builtin_count()
    }

    /// Dimensions of the placement grid in cells.
    #[must_use]
    pub fn grid_dimensions(_world: &World) -> (u32, u32) {
        (path::GRID_COLUMNS, path::GRID_ROWS)
    }

    /// Captures a save snapshot, or `None` while a wave is in progress.
    #[must_use]
    pub fn save_snapshot(world: &World) -> Option<SaveSnapshot> {
        if world.wave_in_progress || world.game_over {
            return None;
        }
        Some(SaveSnapshot {
            gold: world.gold,
            lives: world.lives,
            wave: world.wave,
            score: world.score,
            map_index: world.map_index,
            difficulty: world.difficulty,
            towers: world
                .towers
                .iter()
                .map(|tower| SavedTower {
                    cell: tower.cell,
                    kind: tower.kind,
                    level: tower.level,
                    kills: tower.kills,
                    total_damage: tower.total_damage,
                    target_mode: tower.target_mode,
                })
                .collect(),
        })
    }
}
