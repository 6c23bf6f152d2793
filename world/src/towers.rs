//! Authoritative tower state and derived statistics.

use std::collections::BTreeMap;

use path_defence_core::{
    tuning::Tuning, EnemyId, GridCoord, TargetMode, TowerId, TowerKind,
};

/// Synergy bonus granted per adjacent tower of the same kind.
const SYNERGY_PER_NEIGHBOUR: f32 = 0.10;
/// Upper bound on the total synergy bonus.
const SYNERGY_CAP: f32 = 0.30;

/// Kill thresholds and damage bonuses of the veteran track.
const VETERAN_TRACK: [(u32, f32); 4] = [(100, 0.18), (50, 0.12), (25, 0.07), (10, 0.03)];

/// Mutable state of a single placed tower.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) level: u8,
    pub(crate) cell: GridCoord,
    pub(crate) angle: f32,
    pub(crate) target: Option<EnemyId>,
    pub(crate) target_mode: TargetMode,
    pub(crate) cooldown_remaining_ms: f32,
    pub(crate) shots_fired: u32,
    pub(crate) pulses_fired: u32,
    pub(crate) kills: u32,
    pub(crate) total_damage: f32,
    pub(crate) beam_lock_ms: f32,
    pub(crate) beam_overdrive_ms: f32,
}

impl TowerState {
    /// Damage bonus earned through credited kills.
    pub(crate) fn veteran_multiplier(&self) -> f32 {
        for (threshold, bonus) in VETERAN_TRACK {
            if self.kills >= threshold {
                return 1.0 + bonus;
            }
        }
        1.0
    }

    /// Whether the tower can track stealthy enemies.
    pub(crate) fn detects_stealth(&self) -> bool {
        self.kind == TowerKind::Sniper || self.level >= 3
    }

    /// Drops the beam lock, resetting ramp and overdrive progress.
    pub(crate) fn reset_beam(&mut self) {
        self.beam_lock_ms = 0.0;
        self.beam_overdrive_ms = 0.0;
    }
}

/// Effective statistics of a tower after every active multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DerivedStats {
    pub(crate) damage: f32,
    pub(crate) range: f32,
    pub(crate) fire_interval_ms: u32,
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug, Default)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_id: u32,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Inserts a freshly constructed tower and returns its identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: GridCoord) -> TowerId {
        let id = TowerId::new(self.next_id);
        self.next_id += 1;
        let state = TowerState {
            id,
            kind,
            level: 1,
            cell,
            angle: 0.0,
            target: None,
            target_mode: TargetMode::default(),
            cooldown_remaining_ms: 0.0,
            shots_fired: 0,
            pulses_fired: 0,
            kills: 0,
            total_damage: 0.0,
            beam_lock_ms: 0.0,
            beam_overdrive_ms: 0.0,
        };
        let previous = self.entries.insert(id, state);
        debug_assert!(previous.is_none());
        id
    }

    /// Removes a tower, returning its final state if it existed.
    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    /// Removes every tower while keeping the identifier counter monotonic.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Looks up a tower by identifier.
    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    /// Looks up a tower mutably by identifier.
    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Iterates towers in ascending identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Reports whether any tower occupies the given cell.
    pub(crate) fn occupies(&self, cell: GridCoord) -> bool {
        self.entries.values().any(|tower| tower.cell == cell)
    }

    /// Synergy multiplier from same-kind towers in the eight-cell
    /// neighbourhood, capped.
    pub(crate) fn synergy_multiplier(&self, id: TowerId) -> f32 {
        let Some(tower) = self.entries.get(&id) else {
            return 1.0;
        };
        let bonus = self
            .entries
            .values()
            .filter(|other| {
                other.id != id
                    && other.kind == tower.kind
                    && other.cell.chebyshev_distance(tower.cell) == 1
            })
            .count() as f32
            * SYNERGY_PER_NEIGHBOUR;
        1.0 + bonus.min(SYNERGY_CAP)
    }

    /// Effective statistics of a tower after level, synergy, veteran and
    /// boost multipliers.
    pub(crate) fn derived_stats(
        &self,
        id: TowerId,
        tuning: &Tuning,
        boost_multiplier: f32,
    ) -> Option<DerivedStats> {
        let tower = self.entries.get(&id)?;
        let base = tuning.towers.get(tower.kind);
        let level = tuning.upgrades.level(tower.level);
        let damage = base.damage
            * level.damage
            * self.synergy_multiplier(id)
            * tower.veteran_multiplier()
            * boost_multiplier;
        Some(DerivedStats {
            damage,
            range: base.range * level.range,
            fire_interval_ms: (base.fire_interval_ms as f32 * level.rate) as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::tuning::Tuning;

    #[test]
    fn identifiers_stay_monotonic_across_removal() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(TowerKind::Basic, GridCoord::new(1, 1));
        let _ = registry.remove(first);
        let second = registry.insert(TowerKind::Basic, GridCoord::new(2, 1));
        assert!(second > first);
    }

    #[test]
    fn synergy_counts_only_adjacent_same_kind_towers() {
        let mut registry = TowerRegistry::new();
        let centre = registry.insert(TowerKind::Basic, GridCoord::new(5, 5));
        let _ = registry.insert(TowerKind::Basic, GridCoord::new(6, 6));
        let _ = registry.insert(TowerKind::Heavy, GridCoord::new(4, 5));
        let _ = registry.insert(TowerKind::Basic, GridCoord::new(9, 5));
        assert!((registry.synergy_multiplier(centre) - 1.1).abs() < f32::EPSILON);
    }

    #[test]
    fn synergy_caps_at_thirty_percent() {
        let mut registry = TowerRegistry::new();
        let centre = registry.insert(TowerKind::Fast, GridCoord::new(5, 5));
        let _ = registry.insert(TowerKind::Fast, GridCoord::new(4, 4));
        let _ = registry.insert(TowerKind::Fast, GridCoord::new(5, 4));
        let _ = registry.insert(TowerKind::Fast, GridCoord::new(6, 4));
        let _ = registry.insert(TowerKind::Fast, GridCoord::new(4, 5));
        assert!((registry.synergy_multiplier(centre) - 1.3).abs() < f32::EPSILON);
    }

    #[test]
    fn veteran_track_steps_at_documented_thresholds() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::Sniper, GridCoord::new(2, 2));
        let tower = registry.get_mut(id).expect("tower exists");
        tower.kills = 9;
        assert!((tower.veteran_multiplier() - 1.0).abs() < f32::EPSILON);
        tower.kills = 10;
        assert!((tower.veteran_multiplier() - 1.03).abs() < f32::EPSILON);
        tower.kills = 100;
        assert!((tower.veteran_multiplier() - 1.18).abs() < f32::EPSILON);
    }

    #[test]
    fn derived_stats_combine_level_and_boost_multipliers() {
        let tuning = Tuning::default();
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::Basic, GridCoord::new(3, 3));
        registry.get_mut(id).expect("tower exists").level = 2;
        let stats = registry
            .derived_stats(id, &tuning, 2.0)
            .expect("stats derive");
        assert!((stats.damage - 10.0 * 1.65 * 2.0).abs() < 1e-3);
        assert!((stats.range - 144.0).abs() < 1e-3);
        assert_eq!(stats.fire_interval_ms, 850);
    }

    #[test]
    fn stealth_detection_needs_sniper_or_level_three() {
        let mut registry = TowerRegistry::new();
        let sniper = registry.insert(TowerKind::Sniper, GridCoord::new(1, 1));
        let basic = registry.insert(TowerKind::Basic, GridCoord::new(2, 1));
        assert!(registry.get(sniper).expect("sniper").detects_stealth());
        assert!(!registry.get(basic).expect("basic").detects_stealth());
        registry.get_mut(basic).expect("basic").level = 3;
        assert!(registry.get(basic).expect("basic").detects_stealth());
    }
}
