#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave roster generation.
//!
//! Rosters are a pure function of the wave index, the tuning tables and the
//! difficulty preset. The [`WaveGeneration`] system wraps [`build_roster`]
//! behind the event stream: it answers every [`Event::WaveStarted`] with an
//! [`Event::RosterReady`] carrying the generated roster.

use path_defence_core::{
    tuning::{Tuning, WaveTuning},
    Difficulty, EnemyClass, Event, Roster, SpawnConfig,
};

/// Event-driven wrapper around [`build_roster`].
#[derive(Debug, Default)]
pub struct WaveGeneration;

impl WaveGeneration {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers wave-start announcements with generated rosters.
    pub fn handle(
        &mut self,
        events: &[Event],
        tuning: &Tuning,
        difficulty: Difficulty,
        out_events: &mut Vec<Event>,
    ) {
        for event in events {
            if let Event::WaveStarted { wave } = event {
                out_events.push(Event::RosterReady {
                    wave: *wave,
                    roster: build_roster(*wave, tuning, difficulty),
                });
            }
        }
    }
}

/// Builds the complete spawn roster for the given wave.
#[must_use]
pub fn build_roster(wave: u32, tuning: &Tuning, difficulty: Difficulty) -> Roster {
    let waves = &tuning.waves;
    let scaled = scaled_wave(wave, waves);
    let base_health = (waves.health_base + scaled * waves.health_per_wave).floor();
    let base_speed = (waves.speed_base + scaled * waves.speed_per_wave).min(waves.speed_cap)
        * difficulty.enemy_speed_multiplier();
    let base_reward = (waves.reward_base + scaled * waves.reward_per_wave).floor() as u32;

    let basics = (waves.basic_count_base + wave * waves.basic_count_per_wave)
        .min(waves.basic_count_cap);

    let mut entries: Vec<SpawnConfig> = Vec::new();
    for i in 0..basics {
        entries.push(cohort_entry(
            EnemyClass::Basic,
            base_health,
            base_speed,
            base_reward,
            1.0,
            1.0,
            1.0,
            i * 1100,
        ));
    }

    if wave >= 3 {
        let count = (2 + wave / 2).min(8);
        for i in 0..count {
            entries.push(cohort_entry(
                EnemyClass::Fast,
                base_health,
                base_speed,
                base_reward,
                0.45,
                2.6,
                1.4,
                (basics + i) * 900 + 1500,
            ));
        }
    }

    if wave >= 5 {
        let count = (1 + (wave - 5) / 2).min(4);
        for i in 0..count {
            let mut entry = cohort_entry(
                EnemyClass::Tank,
                base_health,
                base_speed,
                base_reward,
                3.5,
                0.45,
                2.8,
                basics * 1300 + i * 2800 + 2000,
            );
            entry.slow_immune = true;
            entry.rage_capable = true;
            entries.push(entry);
        }
    }

    if wave >= 8 {
        let count = (4 + wave / 2).min(12);
        for i in 0..count {
            let mut entry = cohort_entry(
                EnemyClass::Swarm,
                base_health,
                base_speed,
                base_reward,
                0.3,
                1.6,
                0.6,
                basics * 600 + i * 450 + 2500,
            );
            entry.splits_on_death = true;
            entries.push(entry);
        }
    }

    if wave >= 10 {
        let count = (1 + (wave - 10) / 3).min(5);
        for i in 0..count {
            let mut entry = cohort_entry(
                EnemyClass::Mutant,
                base_health,
                base_speed,
                base_reward,
                2.2,
                0.8,
                2.0,
                basics * 1100 + i * 2200 + 3000,
            );
            entry.regen_per_second = 0.02;
            entries.push(entry);
        }
    }

    if wave >= 12 {
        let count = (1 + (wave - 12) / 3).min(4);
        for i in 0..count {
            let mut entry = cohort_entry(
                EnemyClass::Mech,
                base_health,
                base_speed,
                base_reward,
                2.8,
                0.6,
                2.5,
                basics * 1200 + i * 2600 + 3500,
            );
            entry.armor = 0.4;
            entries.push(entry);
        }
    }

    if wave >= 15 {
        let count = (2 + (wave - 15) / 4).min(6);
        for i in 0..count {
            let mut entry = cohort_entry(
                EnemyClass::Stealth,
                base_health,
                base_speed,
                base_reward,
                0.9,
                1.3,
                1.8,
                basics * 800 + i * 1400 + 4000,
            );
            entry.stealthy = true;
            entries.push(entry);
        }
    }

    if wave % 7 == 0 && wave % 5 != 0 {
        let mut entry = cohort_entry(
            EnemyClass::Elite,
            base_health,
            base_speed,
            base_reward,
            5.0,
            0.7,
            4.0,
            basics * 1400 + 5000,
        );
        entry.rage_capable = true;
        entries.push(entry);
    }

    if wave % 5 == 0 {
        let mut entry = cohort_entry(
            EnemyClass::Boss,
            base_health,
            base_speed,
            base_reward,
            7.0,
            0.65,
            6.0,
            basics * 1500 + 6000,
        );
        entry.slow_immune = true;
        entry.rage_capable = true;
        entries.push(entry);
    }

    entries.sort_by_key(|entry| entry.delay_ms);
    Roster { wave, entries }
}

fn scaled_wave(wave: u32, waves: &WaveTuning) -> f32 {
    if wave <= waves.soft_cap_wave {
        wave as f32
    } else {
        waves.soft_cap_wave as f32 + ((wave - waves.soft_cap_wave) as f32).sqrt() * waves.over_cap_scale
    }
}

#[allow(clippy::too_many_arguments)]
fn cohort_entry(
    class: EnemyClass,
    base_health: f32,
    base_speed: f32,
    base_reward: u32,
    health_factor: f32,
    speed_factor: f32,
    reward_factor: f32,
    delay_ms: u32,
) -> SpawnConfig {
    let reward = (base_reward as f32 * reward_factor).floor() as u32;
    SpawnConfig {
        class,
        max_health: (base_health * health_factor).floor().max(1.0),
        speed: base_speed * speed_factor,
        armor: 0.0,
        regen_per_second: 0.0,
        reward,
        score: reward * 10,
        slow_immune: false,
        stealthy: false,
        rage_capable: false,
        splits_on_death: false,
        delay_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(wave: u32) -> Roster {
        build_roster(wave, &Tuning::default(), Difficulty::Normal)
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(roster(13), roster(13));
    }

    #[test]
    fn baseline_walker_count_grows_and_caps() {
        assert_eq!(roster(1).count_of(EnemyClass::Basic), 8);
        assert_eq!(roster(5).count_of(EnemyClass::Basic), 16);
        assert_eq!(roster(12).count_of(EnemyClass::Basic), 30);
        assert_eq!(roster(40).count_of(EnemyClass::Basic), 30);
    }

    #[test]
    fn cohort_gates_open_at_documented_waves() {
        assert_eq!(roster(2).count_of(EnemyClass::Fast), 0);
        assert_eq!(roster(3).count_of(EnemyClass::Fast), 3);
        assert_eq!(roster(4).count_of(EnemyClass::Tank), 0);
        assert_eq!(roster(5).count_of(EnemyClass::Tank), 1);
        assert_eq!(roster(7).count_of(EnemyClass::Swarm), 0);
        assert_eq!(roster(8).count_of(EnemyClass::Swarm), 8);
        assert_eq!(roster(9).count_of(EnemyClass::Mutant), 0);
        assert_eq!(roster(10).count_of(EnemyClass::Mutant), 1);
        assert_eq!(roster(11).count_of(EnemyClass::Mech), 0);
        assert_eq!(roster(12).count_of(EnemyClass::Mech), 1);
        assert_eq!(roster(14).count_of(EnemyClass::Stealth), 0);
        assert_eq!(roster(15).count_of(EnemyClass::Stealth), 2);
    }

    #[test]
    fn bosses_own_every_fifth_wave_and_displace_elites() {
        assert_eq!(roster(5).count_of(EnemyClass::Boss), 1);
        assert_eq!(roster(7).count_of(EnemyClass::Elite), 1);
        assert_eq!(roster(14).count_of(EnemyClass::Elite), 1);
        assert_eq!(roster(35).count_of(EnemyClass::Elite), 0);
        assert_eq!(roster(35).count_of(EnemyClass::Boss), 1);
    }

    #[test]
    fn cohort_capabilities_match_their_classes() {
        let roster = roster(15);
        let tank = roster
            .entries
            .iter()
            .find(|entry| entry.class == EnemyClass::Tank)
            .expect("tank spawns");
        assert!(tank.slow_immune && tank.rage_capable);
        let swarm = roster
            .entries
            .iter()
            .find(|entry| entry.class == EnemyClass::Swarm)
            .expect("swarm spawns");
        assert!(swarm.splits_on_death);
        let boss = roster
            .entries
            .iter()
            .find(|entry| entry.class == EnemyClass::Boss)
            .expect("boss spawns");
        assert!(boss.slow_immune && boss.rage_capable);
        let stealth = roster
            .entries
            .iter()
            .find(|entry| entry.class == EnemyClass::Stealth)
            .expect("stealth spawns");
        assert!(stealth.stealthy);
    }

    #[test]
    fn only_tanks_bosses_and_elites_are_rage_capable() {
        let roster = roster(14);
        for entry in &roster.entries {
            let expected = matches!(
                entry.class,
                EnemyClass::Tank | EnemyClass::Boss | EnemyClass::Elite
            );
            assert_eq!(entry.rage_capable, expected, "{:?}", entry.class);
        }
        let elite = roster
            .entries
            .iter()
            .find(|entry| entry.class == EnemyClass::Elite)
            .expect("elite spawns");
        assert!(elite.rage_capable);
    }

    #[test]
    fn armoured_and_regenerating_cohorts_carry_their_statistics() {
        let roster = roster(12);
        let mech = roster
            .entries
            .iter()
            .find(|entry| entry.class == EnemyClass::Mech)
            .expect("mech spawns");
        assert!((mech.armor - 0.4).abs() < f32::EPSILON);
        let mutant = roster
            .entries
            .iter()
            .find(|entry| entry.class == EnemyClass::Mutant)
            .expect("mutant spawns");
        assert!((mutant.regen_per_second - 0.02).abs() < f32::EPSILON);
    }

    #[test]
    fn entries_are_sorted_by_spawn_delay() {
        let roster = roster(16);
        let delays: Vec<u32> = roster.entries.iter().map(|entry| entry.delay_ms).collect();
        let mut sorted = delays.clone();
        sorted.sort_unstable();
        assert_eq!(delays, sorted);
    }

    #[test]
    fn difficulty_scales_enemy_speed() {
        let normal = build_roster(1, &Tuning::default(), Difficulty::Normal);
        let hard = build_roster(1, &Tuning::default(), Difficulty::Hard);
        let base = normal.entries[0].speed;
        let scaled = hard.entries[0].speed;
        assert!((scaled - base * 1.2).abs() < 1e-3);
    }

    #[test]
    fn base_speed_caps_on_late_waves() {
        let late = build_roster(80, &Tuning::default(), Difficulty::Normal);
        let basic = late
            .entries
            .iter()
            .find(|entry| entry.class == EnemyClass::Basic)
            .expect("basic spawns");
        assert!((basic.speed - 192.0).abs() < 1e-3);
    }

    #[test]
    fn scaling_slows_past_the_soft_cap() {
        let at_cap = build_roster(20, &Tuning::default(), Difficulty::Normal);
        let past_cap = build_roster(29, &Tuning::default(), Difficulty::Normal);
        let hp_at = at_cap.entries[0].max_health;
        let hp_past = past_cap.entries[0].max_health;
        // Nine waves past the cap only add 3 * 2.5 scaled waves.
        assert!((hp_past - hp_at - (3.0 * 2.5 * 14.0)).abs() < 1.0);
    }

    #[test]
    fn system_answers_wave_started_with_roster_ready() {
        let mut system = WaveGeneration::new();
        let mut out = Vec::new();
        system.handle(
            &[Event::WaveStarted { wave: 4 }],
            &Tuning::default(),
            Difficulty::Normal,
            &mut out,
        );
        match out.as_slice() {
            [Event::RosterReady { wave: 4, roster }] => {
                assert_eq!(roster.wave, 4);
                assert!(!roster.entries.is_empty());
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }
}
