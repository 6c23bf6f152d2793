#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns ready towers into firing commands.
//!
//! The system reads tower and enemy snapshots, gates on cooldowns, and
//! builds the per-kind damage payload: splash radii, chain parameters,
//! status effects, crits, bursts and aura pulses. The world never interprets
//! tower kinds while resolving damage; everything it needs travels inside
//! the emitted [`Command`] values.
//!
//! The only randomness is the level-three cryo freeze roll. Its generator is
//! seeded from a labelled SHA-256 stream, so replays with the same global
//! seed reproduce identical freezes.

use path_defence_core::{
    tuning::Tuning, Command, CombatStyle, DeliveryMode, EnemyId, EnemyView, ImpactEffects,
    PoisonEffect, ProjectileSpawn, Shockwave, SlowEffect, TowerKind, TowerSnapshot, TowerView,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Label of the RNG stream feeding cryo freeze rolls.
const RNG_STREAM_FREEZE: &str = "freeze";

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug)]
pub struct TowerCombat {
    rng: ChaCha8Rng,
    eligible: Vec<(EnemyId, f32)>,
}

impl TowerCombat {
    /// Creates a combat system whose freeze rolls derive from the seed.
    #[must_use]
    pub fn new(global_seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(derive_labeled_seed(global_seed, RNG_STREAM_FREEZE)),
            eligible: Vec::new(),
        }
    }

    /// Emits firing commands for every tower that is ready this tick.
    ///
    /// The output buffer is appended to, not cleared; callers own batching.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        enemies: &EnemyView,
        tuning: &Tuning,
        out: &mut Vec<Command>,
    ) {
        for tower in towers.iter() {
            if tower.cooldown_remaining_ms > 0 {
                continue;
            }
            match tower.kind.combat_style() {
                CombatStyle::Beam => {}
                // Aura towers skip targeting entirely; the pulse hits
                // everything in range, stealthy or not.
                CombatStyle::AuraPulse => {
                    let combat = &tuning.combat;
                    let overclocked = tower.level >= 3
                        && (tower.pulses_fired + 1) % combat.aura_overclock_interval == 0;
                    let damage = if overclocked {
                        tower.damage * combat.aura_overclock_multiplier
                    } else {
                        tower.damage
                    };
                    out.push(Command::PulseAura {
                        tower: tower.id,
                        damage,
                    });
                }
                CombatStyle::Single | CombatStyle::Splash | CombatStyle::Chain => {
                    let Some(target) = tower.target else {
                        continue;
                    };
                    self.collect_eligible(tower, enemies);
                    let shots = self.build_shots(tower, target, tuning);
                    if !shots.is_empty() {
                        out.push(Command::FireProjectile {
                            tower: tower.id,
                            shots,
                        });
                    }
                }
            }
        }
    }

    /// Enemies the tower could hit, sorted front to back with identifier
    /// ties resolved low-first.
    fn collect_eligible(&mut self, tower: &TowerSnapshot, enemies: &EnemyView) {
        self.eligible.clear();
        let range_squared = tower.range * tower.range;
        for enemy in enemies.iter() {
            if enemy.stealthy && !tower.detects_stealth {
                continue;
            }
            if enemy.position.distance_squared(tower.position) <= range_squared {
                self.eligible.push((enemy.id, enemy.progress_metric()));
            }
        }
        self.eligible.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
    }

    fn build_shots(
        &mut self,
        tower: &TowerSnapshot,
        target: EnemyId,
        tuning: &Tuning,
    ) -> Vec<ProjectileSpawn> {
        let combat = &tuning.combat;
        let speed = tuning.towers.get(tower.kind).projectile_speed;
        let mut damage = tower.damage;

        if tower.kind == TowerKind::Sniper
            && tower.level >= 3
            && (tower.shots_fired + 1) % combat.sniper_crit_interval == 0
        {
            damage *= combat.sniper_crit_multiplier;
        }

        let delivery = match tower.kind {
            TowerKind::Heavy | TowerKind::Bomber => DeliveryMode::Splash {
                radius: combat.splash_radius,
                shockwave: (tower.kind == TowerKind::Heavy && tower.level >= 3).then(|| {
                    Shockwave {
                        bonus_radius: combat.shockwave_bonus_radius,
                        fraction: combat.shockwave_fraction,
                    }
                }),
                pool: (tower.kind == TowerKind::Bomber && tower.level >= 3).then(|| {
                    PoisonEffect {
                        damage_per_second: combat.pool_damage_per_second,
                        duration_ms: combat.pool_duration_ms,
                        spreads: false,
                    }
                }),
            },
            TowerKind::Arc => {
                let bounces = if tower.level >= 3 {
                    combat.chain_bounces + combat.chain_bonus_bounces
                } else {
                    combat.chain_bounces
                };
                DeliveryMode::Chain {
                    bounces,
                    range: combat.chain_range,
                    falloff: combat.chain_falloff,
                    effects: ImpactEffects::default(),
                }
            }
            _ => DeliveryMode::Single {
                effects: self.impact_effects(tower, combat),
            },
        };

        let mut shots = vec![ProjectileSpawn {
            target,
            damage,
            speed,
            delivery: delivery.clone(),
        }];

        let extra = match tower.kind {
            TowerKind::Basic
                if tower.level >= 3
                    && (tower.shots_fired + 1) % combat.burst_interval == 0 =>
            {
                combat.burst_extra_shots
            }
            TowerKind::Fast if tower.level >= 3 => 1,
            _ => 0,
        };
        if extra > 0 {
            for (id, _) in self
                .eligible
                .iter()
                .filter(|(id, _)| *id != target)
                .take(extra as usize)
            {
                shots.push(ProjectileSpawn {
                    target: *id,
                    damage: tower.damage,
                    speed,
                    delivery: delivery.clone(),
                });
            }
        }
        shots
    }

    fn impact_effects(
        &mut self,
        tower: &TowerSnapshot,
        combat: &path_defence_core::tuning::CombatTuning,
    ) -> ImpactEffects {
        match tower.kind {
            TowerKind::Cryo => {
                let frozen =
                    tower.level >= 3 && self.rng.gen::<f32>() < combat.freeze_chance;
                let slow = if frozen {
                    SlowEffect {
                        factor: combat.freeze_factor,
                        duration_ms: combat.freeze_duration_ms,
                    }
                } else {
                    SlowEffect {
                        factor: combat.slow_factor,
                        duration_ms: combat.slow_duration_ms,
                    }
                };
                ImpactEffects {
                    slow: Some(slow),
                    poison: None,
                }
            }
            TowerKind::Venom => ImpactEffects {
                slow: None,
                poison: Some(PoisonEffect {
                    damage_per_second: combat.poison_damage_per_second,
                    duration_ms: combat.poison_duration_ms,
                    spreads: tower.level >= 3,
                }),
            },
            _ => ImpactEffects::default(),
        }
    }
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}
