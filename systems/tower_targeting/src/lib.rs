#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes sticky tower target assignments.
//!
//! Assignments are sticky: a tower keeps its current target while it remains
//! alive, in range and visible, regardless of its targeting mode. Only when
//! the current target becomes invalid is a replacement chosen, and only
//! actual changes are emitted as [`Command::AssignTarget`] values.

use path_defence_core::{Command, EnemyId, EnemyView, TargetMode, TowerView, WorldPoint};

#[derive(Clone, Copy, Debug)]
struct Candidate {
    id: EnemyId,
    position: WorldPoint,
    progress: f32,
    health: f32,
    stealthy: bool,
}

/// Tower targeting system that reuses a scratch buffer to avoid repeated
/// allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<Candidate>,
}

impl TowerTargeting {
    /// Creates a new targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes target assignments for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with commands for
    /// the assignments that changed.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<Command>) {
        out.clear();
        self.candidates.clear();
        self.candidates.extend(enemies.iter().map(|enemy| Candidate {
            id: enemy.id,
            position: enemy.position,
            progress: enemy.progress_metric(),
            health: enemy.health,
            stealthy: enemy.stealthy,
        }));

        for tower in towers.iter() {
            let range_squared = tower.range * tower.range;
            let eligible = |candidate: &Candidate| {
                (!candidate.stealthy || tower.detects_stealth)
                    && candidate.position.distance_squared(tower.position) <= range_squared
            };

            let current_valid = tower.target.is_some_and(|target| {
                self.candidates
                    .iter()
                    .any(|candidate| candidate.id == target && eligible(candidate))
            });
            if current_valid {
                continue;
            }

            let mut best: Option<&Candidate> = None;
            for candidate in self.candidates.iter().filter(|c| eligible(c)) {
                let better = match best {
                    None => true,
                    Some(existing) => match tower.target_mode {
                        TargetMode::First => candidate.progress > existing.progress,
                        TargetMode::Last => candidate.progress < existing.progress,
                        TargetMode::Strongest => candidate.health > existing.health,
                        TargetMode::Weakest => candidate.health < existing.health,
                    },
                };
                if better {
                    best = Some(candidate);
                }
            }

            let chosen = best.map(|candidate| candidate.id);
            if chosen != tower.target {
                out.push(Command::AssignTarget {
                    tower: tower.id,
                    target: chosen,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::{
        EnemyClass, EnemySnapshot, GridCoord, TowerId, TowerKind, TowerSnapshot,
    };

    fn enemy(id: u32, x: f32, progress: f32, health: f32, stealthy: bool) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            class: EnemyClass::Basic,
            position: WorldPoint::new(x, 0.0),
            health,
            max_health: health,
            path_index: 0,
            progress,
            speed: 51.0,
            armor: 0.0,
            slowed: false,
            poisoned: false,
            raging: false,
            stealthy,
        }
    }

    fn tower(mode: TargetMode, target: Option<u32>, detects_stealth: bool) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(0),
            kind: TowerKind::Basic,
            level: 1,
            cell: GridCoord::new(0, 0),
            position: WorldPoint::new(0.0, 0.0),
            angle: 0.0,
            target: target.map(EnemyId::new),
            target_mode: mode,
            damage: 10.0,
            range: 120.0,
            fire_interval_ms: 1000,
            cooldown_remaining_ms: 0,
            shots_fired: 0,
            pulses_fired: 0,
            kills: 0,
            total_damage: 0.0,
            detects_stealth,
        }
    }

    fn assignments(
        towers: Vec<TowerSnapshot>,
        enemies: Vec<EnemySnapshot>,
    ) -> Vec<Command> {
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();
        system.handle(
            &TowerView::from_snapshots(towers),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    #[test]
    fn first_mode_picks_the_enemy_furthest_along_the_path() {
        let out = assignments(
            vec![tower(TargetMode::First, None, false)],
            vec![
                enemy(1, 10.0, 30.0, 50.0, false),
                enemy(2, 20.0, 80.0, 20.0, false),
            ],
        );
        assert_eq!(
            out,
            vec![Command::AssignTarget {
                tower: TowerId::new(0),
                target: Some(EnemyId::new(2)),
            }]
        );
    }

    #[test]
    fn last_mode_picks_the_enemy_least_far_along_the_path() {
        let out = assignments(
            vec![tower(TargetMode::Last, None, false)],
            vec![
                enemy(1, 10.0, 30.0, 50.0, false),
                enemy(2, 20.0, 80.0, 20.0, false),
            ],
        );
        assert_eq!(
            out,
            vec![Command::AssignTarget {
                tower: TowerId::new(0),
                target: Some(EnemyId::new(1)),
            }]
        );
    }

    #[test]
    fn strongest_and_weakest_modes_compare_remaining_health() {
        let enemies = vec![
            enemy(1, 10.0, 30.0, 50.0, false),
            enemy(2, 20.0, 80.0, 20.0, false),
        ];
        let out = assignments(
            vec![tower(TargetMode::Strongest, None, false)],
            enemies.clone(),
        );
        assert_eq!(
            out,
            vec![Command::AssignTarget {
                tower: TowerId::new(0),
                target: Some(EnemyId::new(1)),
            }]
        );
        let out = assignments(vec![tower(TargetMode::Weakest, None, false)], enemies);
        assert_eq!(
            out,
            vec![Command::AssignTarget {
                tower: TowerId::new(0),
                target: Some(EnemyId::new(2)),
            }]
        );
    }

    #[test]
    fn ties_resolve_to_the_lowest_identifier() {
        let out = assignments(
            vec![tower(TargetMode::Strongest, None, false)],
            vec![
                enemy(5, 10.0, 30.0, 40.0, false),
                enemy(3, 20.0, 30.0, 40.0, false),
            ],
        );
        assert_eq!(
            out,
            vec![Command::AssignTarget {
                tower: TowerId::new(0),
                target: Some(EnemyId::new(3)),
            }]
        );
    }

    #[test]
    fn assignments_are_sticky_while_the_target_stays_valid() {
        let out = assignments(
            vec![tower(TargetMode::First, Some(1), false)],
            vec![
                enemy(1, 10.0, 30.0, 50.0, false),
                enemy(2, 20.0, 80.0, 20.0, false),
            ],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn towers_retarget_when_the_target_leaves_range() {
        let out = assignments(
            vec![tower(TargetMode::First, Some(1), false)],
            vec![
                enemy(1, 500.0, 90.0, 50.0, false),
                enemy(2, 20.0, 80.0, 20.0, false),
            ],
        );
        assert_eq!(
            out,
            vec![Command::AssignTarget {
                tower: TowerId::new(0),
                target: Some(EnemyId::new(2)),
            }]
        );
    }

    #[test]
    fn towers_stand_down_when_no_candidate_remains() {
        let out = assignments(
            vec![tower(TargetMode::First, Some(1), false)],
            vec![enemy(1, 500.0, 90.0, 50.0, false)],
        );
        assert_eq!(
            out,
            vec![Command::AssignTarget {
                tower: TowerId::new(0),
                target: None,
            }]
        );
    }

    #[test]
    fn stealthy_enemies_are_invisible_without_detection() {
        let enemies = vec![
            enemy(1, 10.0, 90.0, 50.0, true),
            enemy(2, 20.0, 30.0, 20.0, false),
        ];
        let out = assignments(
            vec![tower(TargetMode::First, None, false)],
            enemies.clone(),
        );
        assert_eq!(
            out,
            vec![Command::AssignTarget {
                tower: TowerId::new(0),
                target: Some(EnemyId::new(2)),
            }]
        );

        let out = assignments(vec![tower(TargetMode::First, None, true)], enemies);
        assert_eq!(
            out,
            vec![Command::AssignTarget {
                tower: TowerId::new(0),
                target: Some(EnemyId::new(1)),
            }]
        );
    }
}
