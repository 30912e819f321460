//! Proportional replica controller with a dead-band around the target

use crate::config::AutoscalerConfig;
use crate::types::{ReplicaBounds, ReplicaCount, ScaleDirection, ScalingDecision, Utilization};
use crate::utils::current_timestamp;

/// Decides the next replica count from a utilization reading.
///
/// Outside the band `target ± tolerance` the fleet moves by
/// `ceil(|cpu - target| * replicas)`, clamped to the bounds. Inside the band
/// nothing changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingController {
    pub target_utilization: Utilization,
    pub tolerance: Utilization,
    pub bounds: ReplicaBounds,
}

impl ScalingController {
    pub fn new(target_utilization: Utilization, tolerance: Utilization, bounds: ReplicaBounds) -> Self {
        Self {
            target_utilization,
            tolerance,
            bounds,
        }
    }

    pub fn from_config(config: &AutoscalerConfig) -> Self {
        Self::new(config.target_utilization, config.tolerance, config.bounds())
    }

    /// Evaluate one reading against the current replica count
    pub fn evaluate(&self, cpu_utilization: Utilization, replicas: ReplicaCount) -> ScalingDecision {
        let target = self.target_utilization;
        let current = i64::from(replicas);

        let (next, reason) = if cpu_utilization > target + self.tolerance {
            let diff = cpu_utilization - target;
            let extra = replica_steps(diff, replicas);
            (
                (current + extra).min(i64::from(self.bounds.max)),
                format!(
                    "cpu ({:.2}) above target ({:.2}) by {:.2}, adding {}",
                    cpu_utilization, target, diff, extra
                ),
            )
        } else if cpu_utilization < target - self.tolerance && replicas > self.bounds.min {
            let diff = target - cpu_utilization;
            let reduction = replica_steps(diff, replicas);
            (
                (current - reduction).max(i64::from(self.bounds.min)),
                format!(
                    "cpu ({:.2}) below target ({:.2}) by {:.2}, removing {}",
                    cpu_utilization, target, diff, reduction
                ),
            )
        } else {
            (
                current,
                format!("cpu ({:.2}) within target band ({:.2} ± {:.2})", cpu_utilization, target, self.tolerance),
            )
        };

        let next = self.bounds.clamp(next);
        let direction = match next.cmp(&replicas) {
            std::cmp::Ordering::Greater => ScaleDirection::Up,
            std::cmp::Ordering::Less => ScaleDirection::Down,
            std::cmp::Ordering::Equal => ScaleDirection::Maintain,
        };

        ScalingDecision {
            previous_replicas: replicas,
            replicas: next,
            cpu_utilization,
            direction,
            reason,
            timestamp: current_timestamp(),
        }
    }
}

/// `ceil(diff * replicas)`, rounded to 1e-9 first so that float noise
/// (`0.8 - 0.7 == 0.10000000000000009`) does not add a whole replica.
fn replica_steps(diff: Utilization, replicas: ReplicaCount) -> i64 {
    let raw = diff * f64::from(replicas);
    ((raw * 1e9).round() / 1e9).ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ScalingController {
        ScalingController::new(0.80, 0.02, ReplicaBounds::new(1, 100))
    }

    #[test]
    fn replica_steps_absorbs_float_noise() {
        assert_eq!(replica_steps(0.8 - 0.7, 10), 1);
        assert_eq!(replica_steps(0.9 - 0.8, 10), 1);
        assert_eq!(replica_steps(0.101, 10), 2);
        assert_eq!(replica_steps(0.04, 10), 1);
    }

    #[test]
    fn band_edges_do_not_scale() {
        let c = controller();
        assert_eq!(c.evaluate(0.79, 10).replicas, 10);
        assert_eq!(c.evaluate(0.81, 10).replicas, 10);
    }

    #[test]
    fn large_gap_scales_proportionally() {
        let c = controller();
        // diff 0.68 * 50 = 34
        let d = c.evaluate(1.48, 50);
        assert_eq!(d.replicas, 84);
        assert_eq!(d.direction, ScaleDirection::Up);
    }
}
