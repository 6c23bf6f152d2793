#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure analytics system that folds the event stream into session metrics.
//!
//! The system never mutates the world and never emits commands; it observes
//! the events every tick produces and keeps running totals that adapters can
//! render as an end-of-session report. Restores and resets clear the totals
//! so a report always describes a single session.

use std::collections::BTreeMap;

use path_defence_core::{EnemyClass, Event, TowerId};

/// Session metrics accumulated from the event stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionReport {
    /// Total enemies killed by towers.
    pub kills: u32,
    /// Enemies that reached the end of the path.
    pub leaks: u32,
    /// Waves fully cleared.
    pub waves_cleared: u32,
    /// Gold earned from kill bounties.
    pub bounty_gold: u32,
    /// Gold earned from wave completion bonuses.
    pub bonus_gold: u32,
    /// Kills broken down by enemy class.
    pub kills_by_class: BTreeMap<EnemyClass, u32>,
    /// Final score, populated once the session ends.
    pub final_score: Option<u32>,
}

/// Analytics system that consumes world events.
#[derive(Debug, Default)]
pub struct Analytics {
    report: SessionReport,
    kills_by_tower: BTreeMap<TowerId, u32>,
}

impl Analytics {
    /// Creates a new analytics system with zeroed totals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a batch of events into the running totals.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemyKilled {
                    class,
                    killer,
                    reward,
                    ..
                } => {
                    self.report.kills += 1;
                    self.report.bounty_gold += reward;
                    *self.report.kills_by_class.entry(*class).or_insert(0) += 1;
                    if let Some(tower) = killer {
                        *self.kills_by_tower.entry(*tower).or_insert(0) += 1;
                    }
                }
                Event::EnemyLeaked { .. } => self.report.leaks += 1,
                Event::WaveCompleted { bonus, .. } => {
                    self.report.waves_cleared += 1;
                    self.report.bonus_gold += bonus.total();
                }
                Event::GameOver { score, .. } => self.report.final_score = Some(*score),
                Event::TowerSold { tower, .. } => {
                    let _ = self.kills_by_tower.remove(tower);
                }
                Event::GameReset | Event::SnapshotRestored { .. } | Event::MapSelected { .. } => {
                    self.report = SessionReport::default();
                    self.kills_by_tower.clear();
                }
                _ => {}
            }
        }
    }

    /// Returns the metrics accumulated so far.
    #[must_use]
    pub fn report(&self) -> &SessionReport {
        &self.report
    }

    /// Returns up to `limit` towers ordered by kill count, most lethal first.
    ///
    /// Towers with equal kill counts order by ascending identifier.
    #[must_use]
    pub fn top_towers(&self, limit: usize) -> Vec<(TowerId, u32)> {
        let mut ranked: Vec<(TowerId, u32)> = self
            .kills_by_tower
            .iter()
            .map(|(tower, kills)| (*tower, *kills))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::{EnemyId, WaveBonus};

    fn kill(enemy: u32, class: EnemyClass, killer: Option<u32>, reward: u32) -> Event {
        Event::EnemyKilled {
            enemy: EnemyId::new(enemy),
            class,
            killer: killer.map(TowerId::new),
            reward,
            score: reward * 10,
        }
    }

    #[test]
    fn kills_and_bounties_accumulate() {
        let mut analytics = Analytics::new();
        analytics.handle(&[
            kill(1, EnemyClass::Basic, Some(0), 8),
            kill(2, EnemyClass::Fast, Some(0), 11),
            kill(3, EnemyClass::Basic, None, 8),
        ]);
        let report = analytics.report();
        assert_eq!(report.kills, 3);
        assert_eq!(report.bounty_gold, 27);
        assert_eq!(report.kills_by_class[&EnemyClass::Basic], 2);
        assert_eq!(report.kills_by_class[&EnemyClass::Fast], 1);
    }

    #[test]
    fn wave_bonuses_count_toward_bonus_gold() {
        let mut analytics = Analytics::new();
        analytics.handle(&[Event::WaveCompleted {
            wave: 1,
            bonus: WaveBonus {
                base: 42,
                no_leak: 25,
                interest: 4,
            },
        }]);
        let report = analytics.report();
        assert_eq!(report.waves_cleared, 1);
        assert_eq!(report.bonus_gold, 71);
    }

    #[test]
    fn leaderboard_ranks_by_kills_with_identifier_tiebreak() {
        let mut analytics = Analytics::new();
        analytics.handle(&[
            kill(1, EnemyClass::Basic, Some(2), 8),
            kill(2, EnemyClass::Basic, Some(2), 8),
            kill(3, EnemyClass::Basic, Some(0), 8),
            kill(4, EnemyClass::Basic, Some(1), 8),
        ]);
        assert_eq!(
            analytics.top_towers(3),
            vec![
                (TowerId::new(2), 2),
                (TowerId::new(0), 1),
                (TowerId::new(1), 1),
            ]
        );
        assert_eq!(analytics.top_towers(1), vec![(TowerId::new(2), 2)]);
    }

    #[test]
    fn sold_towers_leave_the_leaderboard() {
        let mut analytics = Analytics::new();
        analytics.handle(&[
            kill(1, EnemyClass::Basic, Some(0), 8),
            Event::TowerSold {
                tower: TowerId::new(0),
                refund: 50,
            },
        ]);
        assert!(analytics.top_towers(5).is_empty());
        assert_eq!(analytics.report().kills, 1);
    }

    #[test]
    fn resets_clear_the_session() {
        let mut analytics = Analytics::new();
        analytics.handle(&[kill(1, EnemyClass::Basic, Some(0), 8)]);
        analytics.handle(&[Event::GameReset]);
        assert_eq!(analytics.report(), &SessionReport::default());
        assert!(analytics.top_towers(5).is_empty());
    }

    #[test]
    fn game_over_records_the_final_score() {
        let mut analytics = Analytics::new();
        analytics.handle(&[Event::GameOver { wave: 9, score: 1240 }]);
        assert_eq!(analytics.report().final_score, Some(1240));
    }
}
