//! Projectile flight for the three projectile variants.

use std::time::Duration;

use glam::Vec2;
use waypoint_defence_core::{EntityHandle, ProjectileSpec};

/// Behaviour-specific projectile state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Flight {
    #[default]
    Inert,
    Direct {
        target: EntityHandle,
        speed: f32,
        hit_threshold: f32,
    },
    Area {
        destination: Vec2,
        speed: f32,
        radius: f32,
        hit_threshold: f32,
        linger: Duration,
        impacted: Option<Duration>,
    },
    AreaStatus {
        destination: Vec2,
        speed: f32,
        radius: f32,
        hit_threshold: f32,
        slow_factor: f32,
        slow_duration: Duration,
        field: Duration,
        impacted: Option<Duration>,
    },
}

/// Outcome of advancing a projectile by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ProjectileStep {
    /// Still travelling.
    Flying,
    /// Spent and waiting to be reclaimed.
    Lingering,
    /// The homing target disappeared before impact.
    Lost,
    /// A direct projectile reached its target.
    Hit { target: EntityHandle, damage: f32 },
    /// An area projectile detonated.
    Blast {
        center: Vec2,
        radius: f32,
        damage: f32,
        reclaim: bool,
    },
    /// A slowing field is active this tick.
    Field {
        center: Vec2,
        radius: f32,
        slow_factor: f32,
        slow_duration: Duration,
        impacted_now: bool,
        reclaim: bool,
    },
    /// Finished lingering.
    Expired,
}

#[derive(Debug, Default)]
pub(crate) struct Projectile {
    pub(crate) position: Vec2,
    damage: f32,
    flight: Flight,
}

impl Projectile {
    /// Configures the projectile from the firing turret's attack snapshot.
    pub(crate) fn launch(
        &mut self,
        spec: ProjectileSpec,
        origin: Vec2,
        target: EntityHandle,
        target_position: Vec2,
        damage: f32,
    ) {
        self.position = origin;
        self.damage = damage;
        self.flight = match spec {
            ProjectileSpec::Direct {
                speed,
                hit_threshold,
            } => Flight::Direct {
                target,
                speed,
                hit_threshold,
            },
            ProjectileSpec::Area {
                speed,
                radius,
                hit_threshold,
                impact_linger,
            } => Flight::Area {
                destination: target_position,
                speed,
                radius,
                hit_threshold,
                linger: impact_linger,
                impacted: None,
            },
            ProjectileSpec::AreaStatus {
                speed,
                radius,
                hit_threshold,
                slow_factor,
                slow_duration,
                field_duration,
            } => Flight::AreaStatus {
                destination: target_position,
                speed,
                radius,
                hit_threshold,
                slow_factor,
                slow_duration,
                field: field_duration,
                impacted: None,
            },
        };
    }

    /// Target tracked by a homing projectile.
    pub(crate) fn homing_target(&self) -> Option<EntityHandle> {
        match self.flight {
            Flight::Direct { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Advances the projectile. `target_position` carries the live position
    /// of a homing projectile's target, or `None` when it is gone.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        target_position: Option<Vec2>,
    ) -> ProjectileStep {
        let step = dt.as_secs_f32();
        match &mut self.flight {
            Flight::Inert => ProjectileStep::Expired,
            Flight::Direct {
                target,
                speed,
                hit_threshold,
            } => {
                let Some(destination) = target_position else {
                    return ProjectileStep::Lost;
                };
                if fly(&mut self.position, destination, *speed * step, *hit_threshold) {
                    ProjectileStep::Hit {
                        target: *target,
                        damage: self.damage,
                    }
                } else {
                    ProjectileStep::Flying
                }
            }
            Flight::Area {
                destination,
                speed,
                radius,
                hit_threshold,
                linger,
                impacted,
            } => {
                if let Some(elapsed) = impacted {
                    *elapsed = elapsed.saturating_add(dt);
                    return if *elapsed >= *linger {
                        ProjectileStep::Expired
                    } else {
                        ProjectileStep::Lingering
                    };
                }
                if !fly(&mut self.position, *destination, *speed * step, *hit_threshold) {
                    return ProjectileStep::Flying;
                }
                *impacted = Some(Duration::ZERO);
                ProjectileStep::Blast {
                    center: *destination,
                    radius: *radius,
                    damage: self.damage,
                    reclaim: linger.is_zero(),
                }
            }
            Flight::AreaStatus {
                destination,
                speed,
                radius,
                hit_threshold,
                slow_factor,
                slow_duration,
                field,
                impacted,
            } => {
                let impacted_now = match *impacted {
                    Some(elapsed) => {
                        *impacted = Some(elapsed.saturating_add(dt));
                        false
                    }
                    None => {
                        if !fly(&mut self.position, *destination, *speed * step, *hit_threshold) {
                            return ProjectileStep::Flying;
                        }
                        *impacted = Some(Duration::ZERO);
                        true
                    }
                };
                ProjectileStep::Field {
                    center: *destination,
                    radius: *radius,
                    slow_factor: *slow_factor,
                    slow_duration: *slow_duration,
                    impacted_now,
                    reclaim: impacted.map_or(false, |elapsed| elapsed >= *field),
                }
            }
        }
    }
}

/// Moves `position` toward `destination`, snapping on arrival or overshoot.
fn fly(position: &mut Vec2, destination: Vec2, distance: f32, hit_threshold: f32) -> bool {
    let remaining = position.distance(destination);
    if remaining <= hit_threshold || distance >= remaining {
        *position = destination;
        return true;
    }
    *position += (destination - *position) / remaining * distance;
    position.distance(destination) <= hit_threshold
}
