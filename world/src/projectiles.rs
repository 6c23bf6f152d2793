//! Projectile flight state.

use path_defence_core::{DeliveryMode, EnemyId, ProjectileId, TowerId, TowerKind, WorldPoint};

/// Distance below which a projectile is considered to have struck.
const IMPACT_EPSILON: f32 = 1.0;

/// Outcome of advancing a projectile by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FlightStep {
    /// The projectile is still travelling toward its target.
    InFlight,
    /// The projectile reached its target this tick.
    Arrived,
}

/// Mutable state of a single projectile in flight.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) tower: TowerId,
    pub(crate) tower_kind: TowerKind,
    pub(crate) target: EnemyId,
    pub(crate) position: WorldPoint,
    pub(crate) speed: f32,
    pub(crate) damage: f32,
    pub(crate) delivery: DeliveryMode,
}

impl Projectile {
    /// Moves the projectile toward the target position, reporting arrival.
    pub(crate) fn advance(&mut self, target: WorldPoint, dt_ms: f32) -> FlightStep {
        let step = self.speed * dt_ms / 1000.0;
        let distance = self.position.distance_to(target);
        if distance <= step.max(IMPACT_EPSILON) {
            self.position = target;
            return FlightStep::Arrived;
        }
        let t = step / distance;
        self.position = WorldPoint::new(
            self.position.x() + (target.x() - self.position.x()) * t,
            self.position.y() + (target.y() - self.position.y()) * t,
        );
        FlightStep::InFlight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use path_defence_core::{DeliveryMode, ImpactEffects};

    fn projectile(speed: f32) -> Projectile {
        Projectile {
            id: ProjectileId::new(1),
            tower: TowerId::new(0),
            tower_kind: TowerKind::Basic,
            target: EnemyId::new(3),
            position: WorldPoint::new(0.0, 0.0),
            speed,
            damage: 10.0,
            delivery: DeliveryMode::Single {
                effects: ImpactEffects::default(),
            },
        }
    }

    #[test]
    fn projectile_closes_on_a_stationary_target() {
        let mut shot = projectile(100.0);
        let target = WorldPoint::new(30.0, 40.0);
        assert_eq!(shot.advance(target, 100.0), FlightStep::InFlight);
        assert!(shot.position.distance_to(target) < 50.0);
        assert_eq!(shot.advance(target, 500.0), FlightStep::Arrived);
    }

    #[test]
    fn projectile_arrives_within_a_single_long_tick() {
        let mut shot = projectile(1000.0);
        let target = WorldPoint::new(50.0, 0.0);
        assert_eq!(shot.advance(target, 100.0), FlightStep::Arrived);
        assert!((shot.position.x() - 50.0).abs() < f32::EPSILON);
    }
}
