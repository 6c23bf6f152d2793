//! Enemy state and the status effects that act on it.

use path_defence_core::{EnemyClass, EnemyId, PoisonEffect, SlowEffect, SpawnConfig, TowerId, WorldPoint};

/// Speed factor applied while an enemy rages.
pub(crate) const RAGE_SPEED_FACTOR: f32 = 1.3;
/// Health fraction below which rage-capable enemies enrage.
const RAGE_THRESHOLD: f32 = 0.25;

/// Active slowing effect on an enemy.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SlowState {
    pub(crate) factor: f32,
    pub(crate) remaining_ms: f32,
}

/// Active poison stack on an enemy.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PoisonState {
    pub(crate) damage_per_second: f32,
    pub(crate) remaining_ms: f32,
    pub(crate) source: Option<TowerId>,
}

/// Mutable state of a single enemy walking the path.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) class: EnemyClass,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) base_speed: f32,
    pub(crate) armor: f32,
    pub(crate) regen_per_second: f32,
    pub(crate) reward: u32,
    pub(crate) score: u32,
    pub(crate) slow_immune: bool,
    pub(crate) stealthy: bool,
    pub(crate) rage_capable: bool,
    pub(crate) splits_on_death: bool,
    pub(crate) raging: bool,
    pub(crate) path_index: u32,
    pub(crate) progress: f32,
    pub(crate) position: WorldPoint,
    pub(crate) slow: Option<SlowState>,
    pub(crate) poisons: Vec<PoisonState>,
    pub(crate) last_hit_by: Option<TowerId>,
}

impl Enemy {
    /// Creates an enemy at the head of the path from its spawn configuration.
    pub(crate) fn from_config(id: EnemyId, config: &SpawnConfig, start: WorldPoint) -> Self {
        Self {
            id,
            class: config.class,
            health: config.max_health,
            max_health: config.max_health,
            base_speed: config.speed,
            armor: config.armor,
            regen_per_second: config.regen_per_second,
            reward: config.reward,
            score: config.score,
            slow_immune: config.slow_immune,
            stealthy: config.stealthy,
            rage_capable: config.rage_capable,
            splits_on_death: config.splits_on_death,
            raging: false,
            path_index: 0,
            progress: 0.0,
            position: start,
            slow: None,
            poisons: Vec::new(),
            last_hit_by: None,
        }
    }

    /// Movement speed after rage and slow modifiers. Rage raises the base
    /// speed only when the enemy is not already moving faster than the
    /// raged speed; slows then apply on top.
    pub(crate) fn effective_speed(&self) -> f32 {
        let mut speed = self.base_speed;
        if self.raging {
            let raged = self.base_speed * RAGE_SPEED_FACTOR;
            if raged > speed {
                speed = raged;
            }
        }
        if let Some(slow) = self.slow {
            speed *= slow.factor;
        }
        speed
    }

    /// Applies a slowing effect unless the enemy is immune.
    ///
    /// At most one slow is active; a later application overwrites the
    /// current one regardless of strength.
    pub(crate) fn apply_slow(&mut self, effect: SlowEffect) {
        if self.slow_immune {
            return;
        }
        self.slow = Some(SlowState {
            factor: effect.factor,
            remaining_ms: effect.duration_ms as f32,
        });
    }

    /// Applies a poison stack, refreshing an existing stack from the same
    /// source instead of stacking it twice.
    pub(crate) fn apply_poison(&mut self, effect: PoisonEffect, source: Option<TowerId>) {
        if let Some(stack) = self.poisons.iter_mut().find(|stack| stack.source == source) {
            stack.damage_per_second = stack.damage_per_second.max(effect.damage_per_second);
            stack.remaining_ms = stack.remaining_ms.max(effect.duration_ms as f32);
            return;
        }
        self.poisons.push(PoisonState {
            damage_per_second: effect.damage_per_second,
            remaining_ms: effect.duration_ms as f32,
            source,
        });
    }

    /// Applies armour-reduced direct damage, returning the amount dealt.
    pub(crate) fn take_direct_damage(&mut self, amount: f32, source: Option<TowerId>) -> f32 {
        self.take_area_damage(amount * (1.0 - self.armor), source)
    }

    /// Applies damage that bypasses armour, returning the amount dealt.
    pub(crate) fn take_area_damage(&mut self, amount: f32, source: Option<TowerId>) -> f32 {
        self.health -= amount;
        self.last_hit_by = source;
        if self.rage_capable && !self.raging && self.health < self.max_health * RAGE_THRESHOLD {
            self.raging = true;
        }
        amount
    }

    /// Ticks slow expiry and regeneration. Regeneration is suppressed while
    /// at least one poison stack is active.
    pub(crate) fn tick_passives(&mut self, dt_ms: f32) {
        if let Some(slow) = self.slow.as_mut() {
            slow.remaining_ms -= dt_ms;
            if slow.remaining_ms <= 0.0 {
                self.slow = None;
            }
        }
        if self.regen_per_second > 0.0 && self.poisons.is_empty() && self.health > 0.0 {
            let healed = self.max_health * self.regen_per_second * dt_ms / 1000.0;
            self.health = (self.health + healed).min(self.max_health);
        }
    }
}
