// src/types.rs

use serde::{Deserialize, Serialize};

/// Number of simulated compute units
pub type ReplicaCount = u32;

/// A utilization fraction (0.0 = idle, 1.0 = saturated)
pub type Utilization = f64;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// Simulated CPU readings for the fleet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuStatus {
    /// Utilization of the high-priority workload
    #[serde(rename = "highPriority")]
    pub high_priority: Utilization,
}

/// The single piece of shared state: how many replicas run and how busy they are
///
/// Serializes as `{"cpu":{"highPriority":0.68},"replicas":10}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    /// Last simulated CPU utilization, written only by the control loop
    pub cpu: CpuStatus,
    /// Current replica count, always within the store's bounds
    pub replicas: ReplicaCount,
}

impl SystemState {
    pub fn new(replicas: ReplicaCount, cpu_utilization: Utilization) -> Self {
        Self {
            cpu: CpuStatus {
                high_priority: cpu_utilization,
            },
            replicas,
        }
    }

    /// Shorthand for `cpu.high_priority`
    pub fn cpu_utilization(&self) -> Utilization {
        self.cpu.high_priority
    }
}

/// Body of a manual replica change.
///
/// Signed so that a negative request is rejected as out of range instead of
/// as a malformed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaUpdate {
    pub replicas: i64,
}

/// Inclusive limits on the replica count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaBounds {
    pub min: ReplicaCount,
    pub max: ReplicaCount,
}

impl ReplicaBounds {
    pub fn new(min: ReplicaCount, max: ReplicaCount) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, replicas: i64) -> bool {
        replicas >= i64::from(self.min) && replicas <= i64::from(self.max)
    }

    pub fn clamp(&self, replicas: i64) -> ReplicaCount {
        replicas.max(i64::from(self.min)).min(i64::from(self.max)) as ReplicaCount
    }
}

/// Direction to scale the fleet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScaleDirection {
    /// Scale up (add replicas)
    Up,
    /// Scale down (remove replicas)
    Down,
    /// Keep current scale
    Maintain,
}

/// Outcome of one control loop tick
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalingDecision {
    /// Replica count observed at the start of the tick
    pub previous_replicas: ReplicaCount,
    /// Replica count committed by the tick
    pub replicas: ReplicaCount,
    /// Simulated utilization committed by the tick
    pub cpu_utilization: Utilization,
    /// Which way the fleet moved
    pub direction: ScaleDirection,
    /// Human-readable explanation
    pub reason: String,
    /// When the decision was made
    pub timestamp: Timestamp,
}

impl ScalingDecision {
    /// Whether the tick changed the replica count
    pub fn changed(&self) -> bool {
        self.replicas != self.previous_replicas
    }
}
