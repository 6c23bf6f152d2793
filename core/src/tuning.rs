//! Numeric tuning tables with canonical defaults.
//!
//! Every table deserializes from configuration with missing fields falling
//! back to the defaults below, so front ends can overlay a partial file on
//! top of the shipped balance.

use serde::Deserialize;

use crate::TowerKind;

/// Complete tuning surface of the simulation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Base statistics per tower kind.
    pub towers: TowerTable,
    /// Level multipliers and upgrade economics.
    pub upgrades: UpgradeTable,
    /// Starting resources and wave bonuses.
    pub economy: EconomyTuning,
    /// Wave scaling curve constants.
    pub waves: WaveTuning,
    /// Combat payload constants shared by the combat system and the world.
    pub combat: CombatTuning,
}

/// Base statistics for a single tower kind at level one.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TowerTuning {
    /// Gold cost of placing the tower.
    pub cost: u32,
    /// Per-shot damage before multipliers. Zero for beam towers.
    pub damage: f32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Interval between shots in milliseconds. Zero for beam towers.
    pub fire_interval_ms: u32,
    /// Projectile flight speed in world units per second.
    pub projectile_speed: f32,
}

impl Default for TowerTuning {
    fn default() -> Self {
        Self {
            cost: 50,
            damage: 10.0,
            range: 120.0,
            fire_interval_ms: 1000,
            projectile_speed: 480.0,
        }
    }
}

/// Base statistics for every constructible tower kind.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TowerTable {
    /// Statistics of the basic tower.
    pub basic: TowerTuning,
    /// Statistics of the heavy splash tower.
    pub heavy: TowerTuning,
    /// Statistics of the rapid-fire tower.
    pub fast: TowerTuning,
    /// Statistics of the slowing tower.
    pub cryo: TowerTuning,
    /// Statistics of the long-range precision tower.
    pub sniper: TowerTuning,
    /// Statistics of the poison-pool splash tower.
    pub bomber: TowerTuning,
    /// Statistics of the area pulse tower.
    pub pulse: TowerTuning,
    /// Statistics of the poison tower.
    pub venom: TowerTuning,
    /// Statistics of the chaining tower.
    pub arc: TowerTuning,
    /// Statistics of the beam tower.
    pub laser: TowerTuning,
}

impl TowerTable {
    /// Looks up the base statistics for the provided kind.
    #[must_use]
    pub const fn get(&self, kind: TowerKind) -> &TowerTuning {
        match kind {
            TowerKind::Basic => &self.basic,
            TowerKind::Heavy => &self.heavy,
            TowerKind::Fast => &self.fast,
            TowerKind::Cryo => &self.cryo,
            TowerKind::Sniper => &self.sniper,
            TowerKind::Bomber => &self.bomber,
            TowerKind::Pulse => &self.pulse,
            TowerKind::Venom => &self.venom,
            TowerKind::Arc => &self.arc,
            TowerKind::Laser => &self.laser,
        }
    }
}

impl Default for TowerTable {
    fn default() -> Self {
        Self {
            basic: TowerTuning {
                cost: 50,
                damage: 10.0,
                range: 120.0,
                fire_interval_ms: 1000,
                projectile_speed: 480.0,
            },
            heavy: TowerTuning {
                cost: 100,
                damage: 35.0,
                range: 110.0,
                fire_interval_ms: 2200,
                projectile_speed: 360.0,
            },
            fast: TowerTuning {
                cost: 80,
                damage: 6.0,
                range: 140.0,
                fire_interval_ms: 280,
                projectile_speed: 540.0,
            },
            cryo: TowerTuning {
                cost: 75,
                damage: 4.0,
                range: 130.0,
                fire_interval_ms: 900,
                projectile_speed: 420.0,
            },
            sniper: TowerTuning {
                cost: 150,
                damage: 80.0,
                range: 290.0,
                fire_interval_ms: 3200,
                projectile_speed: 900.0,
            },
            bomber: TowerTuning {
                cost: 120,
                damage: 45.0,
                range: 120.0,
                fire_interval_ms: 2500,
                projectile_speed: 330.0,
            },
            pulse: TowerTuning {
                cost: 110,
                damage: 18.0,
                range: 100.0,
                fire_interval_ms: 1400,
                projectile_speed: 0.0,
            },
            venom: TowerTuning {
                cost: 90,
                damage: 6.0,
                range: 125.0,
                fire_interval_ms: 1100,
                projectile_speed: 450.0,
            },
            arc: TowerTuning {
                cost: 130,
                damage: 22.0,
                range: 135.0,
                fire_interval_ms: 1600,
                projectile_speed: 600.0,
            },
            laser: TowerTuning {
                cost: 160,
                damage: 0.0,
                range: 150.0,
                fire_interval_ms: 0,
                projectile_speed: 0.0,
            },
        }
    }
}

/// Multipliers applied to a tower's base statistics at one level.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpgradeLevel {
    /// Factor applied to base damage.
    pub damage: f32,
    /// Factor applied to base range.
    pub range: f32,
    /// Factor applied to the base fire interval. Below one fires faster.
    pub rate: f32,
}

impl Default for UpgradeLevel {
    fn default() -> Self {
        Self {
            damage: 1.0,
            range: 1.0,
            rate: 1.0,
        }
    }
}

/// Level multipliers and upgrade economics shared by all tower kinds.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpgradeTable {
    /// Statistic multipliers for levels one through three.
    pub levels: [UpgradeLevel; 3],
    /// Upgrade costs as factors of the base cost, one per transition.
    pub cost_factors: [f32; 2],
    /// Fraction of cumulative spend refunded when selling.
    pub sell_refund: f32,
}

impl UpgradeTable {
    /// Multipliers for the provided one-based level, clamped to the table.
    #[must_use]
    pub fn level(&self, level: u8) -> UpgradeLevel {
        let index = usize::from(level.clamp(1, 3) - 1);
        self.levels[index]
    }

    /// Gold cost of upgrading away from the provided one-based level, or
    /// `None` once the maximum level is reached.
    #[must_use]
    pub fn upgrade_cost(&self, base_cost: u32, level: u8) -> Option<u32> {
        match level {
            1 => Some((base_cost as f32 * self.cost_factors[0]) as u32),
            2 => Some((base_cost as f32 * self.cost_factors[1]) as u32),
            _ => None,
        }
    }

    /// Gold spent in total to reach the provided one-based level.
    #[must_use]
    pub fn cumulative_spend(&self, base_cost: u32, level: u8) -> u32 {
        let mut spent = base_cost;
        let mut current = 1;
        while current < level {
            if let Some(cost) = self.upgrade_cost(base_cost, current) {
                spent += cost;
            }
            current += 1;
        }
        spent
    }
}

impl Default for UpgradeTable {
    fn default() -> Self {
        Self {
            levels: [
                UpgradeLevel {
                    damage: 1.0,
                    range: 1.0,
                    rate: 1.0,
                },
                UpgradeLevel {
                    damage: 1.65,
                    range: 1.2,
                    rate: 0.85,
                },
                UpgradeLevel {
                    damage: 2.6,
                    range: 1.45,
                    rate: 0.70,
                },
            ],
            cost_factors: [1.5, 2.5],
            sell_refund: 0.5,
        }
    }
}

/// Starting resources and wave completion bonuses.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    /// Gold the player starts a fresh session with.
    pub starting_gold: u32,
    /// Lives the player starts a fresh session with.
    pub starting_lives: u32,
    /// Flat component of the wave completion bonus.
    pub wave_bonus_base: u32,
    /// Per-wave component of the wave completion bonus.
    pub wave_bonus_per_wave: u32,
    /// Extra bonus paid when no enemy leaked during the wave.
    pub no_leak_bonus: u32,
    /// Interest rate paid on held gold at wave completion.
    pub interest_rate: f32,
    /// Upper bound on the interest payment.
    pub interest_cap: u32,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            starting_gold: 200,
            starting_lives: 20,
            wave_bonus_base: 30,
            wave_bonus_per_wave: 12,
            no_leak_bonus: 25,
            interest_rate: 0.05,
            interest_cap: 80,
        }
    }
}

/// Constants of the wave scaling curve.
///
/// Speeds are expressed in world units per second.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Wave index beyond which scaling grows with the square root.
    pub soft_cap_wave: u32,
    /// Factor applied to the square-root term past the soft cap.
    pub over_cap_scale: f32,
    /// Base enemy health at the first wave.
    pub health_base: f32,
    /// Health added per scaled wave.
    pub health_per_wave: f32,
    /// Base enemy speed at the first wave.
    pub speed_base: f32,
    /// Speed added per scaled wave.
    pub speed_per_wave: f32,
    /// Upper bound on the base enemy speed.
    pub speed_cap: f32,
    /// Base kill reward at the first wave.
    pub reward_base: f32,
    /// Reward added per scaled wave.
    pub reward_per_wave: f32,
    /// Baseline walker count at the first wave.
    pub basic_count_base: u32,
    /// Baseline walkers added per wave.
    pub basic_count_per_wave: u32,
    /// Upper bound on the baseline walker count.
    pub basic_count_cap: u32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            soft_cap_wave: 20,
            over_cap_scale: 2.5,
            health_base: 28.0,
            health_per_wave: 14.0,
            speed_base: 51.0,
            speed_per_wave: 3.9,
            speed_cap: 192.0,
            reward_base: 8.0,
            reward_per_wave: 2.0,
            basic_count_base: 6,
            basic_count_per_wave: 2,
            basic_count_cap: 30,
        }
    }
}

/// Combat payload constants shared by the combat system and the world.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Speed factor applied by a cryo hit.
    pub slow_factor: f32,
    /// Lifetime of a cryo slow in milliseconds.
    pub slow_duration_ms: u32,
    /// Probability that a level-three cryo hit freezes instead of slows.
    pub freeze_chance: f32,
    /// Speed factor applied by a freeze.
    pub freeze_factor: f32,
    /// Lifetime of a freeze in milliseconds.
    pub freeze_duration_ms: u32,
    /// Inner splash radius in world units.
    pub splash_radius: f32,
    /// Additional shockwave radius beyond the inner splash area.
    pub shockwave_bonus_radius: f32,
    /// Fraction of splash damage dealt inside the shockwave ring.
    pub shockwave_fraction: f32,
    /// Poison damage per second applied by a venom hit.
    pub poison_damage_per_second: f32,
    /// Lifetime of a venom poison in milliseconds.
    pub poison_duration_ms: u32,
    /// Maximum distance a spreading poison jumps in world units.
    pub poison_spread_range: f32,
    /// Poison damage per second applied by a bomber pool.
    pub pool_damage_per_second: f32,
    /// Lifetime of a bomber pool poison in milliseconds.
    pub pool_duration_ms: u32,
    /// Bounces performed by an arc shot below level three.
    pub chain_bounces: u32,
    /// Additional bounces granted at level three.
    pub chain_bonus_bounces: u32,
    /// Maximum arc distance between consecutive victims.
    pub chain_range: f32,
    /// Damage multiplier applied per completed bounce.
    pub chain_falloff: f32,
    /// Beam damage per second at the start of a lock.
    pub beam_base_dps: f32,
    /// Beam damage per second once fully ramped.
    pub beam_max_dps: f32,
    /// Time the beam needs to ramp to full output in milliseconds.
    pub beam_ramp_ms: u32,
    /// Time the level-three overdrive needs to reach its peak.
    pub beam_overdrive_ms: u32,
    /// Extra output fraction granted by a fully charged overdrive.
    pub beam_overdrive_bonus: f32,
    /// Every Nth pulse of a level-three pulse tower overclocks.
    pub aura_overclock_interval: u32,
    /// Damage factor applied to an overclocked pulse.
    pub aura_overclock_multiplier: f32,
    /// Every Nth shot of a level-three sniper crits.
    pub sniper_crit_interval: u32,
    /// Damage factor applied to a sniper crit.
    pub sniper_crit_multiplier: f32,
    /// Every Nth shot of a level-three basic tower bursts.
    pub burst_interval: u32,
    /// Extra projectiles launched by a burst at secondary targets.
    pub burst_extra_shots: u32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            slow_factor: 0.4,
            slow_duration_ms: 2500,
            freeze_chance: 0.15,
            freeze_factor: 0.05,
            freeze_duration_ms: 800,
            splash_radius: 75.0,
            shockwave_bonus_radius: 45.0,
            shockwave_fraction: 0.3,
            poison_damage_per_second: 10.0,
            poison_duration_ms: 3000,
            poison_spread_range: 60.0,
            pool_damage_per_second: 8.0,
            pool_duration_ms: 4000,
            chain_bounces: 2,
            chain_bonus_bounces: 2,
            chain_range: 90.0,
            chain_falloff: 0.65,
            beam_base_dps: 12.0,
            beam_max_dps: 60.0,
            beam_ramp_ms: 2000,
            beam_overdrive_ms: 3000,
            beam_overdrive_bonus: 0.6,
            aura_overclock_interval: 5,
            aura_overclock_multiplier: 2.0,
            sniper_crit_interval: 4,
            sniper_crit_multiplier: 3.0,
            burst_interval: 3,
            burst_extra_shots: 2,
        }
    }
}
