use std::collections::HashMap;

use crate::{EntityId, Instant, Quat, WorldMutType};

/// Dead-reckons freshly received replicas forward by the network delay
/// they spent in flight.
///
/// Delays are measured in milliseconds and velocities are in units (or
/// radians) per millisecond.
pub struct Predictor {
    pending: HashMap<EntityId, f64>,
}

impl Predictor {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    /// Record that an authoritative update stamped `remote_timestamp` (on the
    /// sender's clock) was applied to `entity` at `local_receive`. Delays of
    /// every update applied before the next `apply` add up; a future-dated
    /// update contributes a negative delay. Returns the measured delay.
    pub fn record_update(
        &mut self,
        entity: EntityId,
        local_receive: &Instant,
        remote_timestamp: f32,
        skew_estimate: f64,
    ) -> f64 {
        let sent_local = f64::from(remote_timestamp) - skew_estimate;
        let dt = local_receive.as_millis() - sent_local;
        *self.pending.entry(entity).or_insert(0.0) += dt;
        dt
    }

    /// Stop tracking a retired entity
    pub fn forget(&mut self, entity: &EntityId) {
        self.pending.remove(entity);
    }

    /// Extrapolate every entity whose accumulated delay is positive and
    /// clear all accumulated delays. Returns how many entities were moved.
    pub fn apply<W: WorldMutType>(&mut self, world: &mut W) -> usize {
        let mut moved = 0;
        let mut pending: Vec<(EntityId, f64)> = self.pending.drain().collect();
        pending.sort_by_key(|(entity, _)| *entity);

        for (entity, dt_millis) in pending {
            if dt_millis <= 0.0 {
                continue;
            }
            let Some(motion) = world.motion(&entity) else {
                continue;
            };
            let dt = dt_millis as f32;

            let position = motion.position.add(&motion.linear_velocity.scale(dt));
            let rotation = match (motion.rotation, motion.angular_velocity) {
                (Some(rotation), Some(angular_velocity)) => {
                    Some(match angular_velocity.normalize() {
                        Some(axis) => {
                            let delta =
                                Quat::from_axis_angle(&axis, angular_velocity.length() * dt);
                            delta.mul(&rotation).normalize()
                        }
                        None => rotation,
                    })
                }
                (rotation, _) => rotation,
            };

            world.set_pose(&entity, position, rotation);
            moved += 1;
        }

        moved
    }
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new()
    }
}
