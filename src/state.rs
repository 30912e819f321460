// src/state.rs

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::AutoscalerConfig;
use crate::error::{AutoscalerError, AutoscalerResult};
use crate::types::{ReplicaBounds, ReplicaCount, ScalingDecision, SystemState, Utilization};

/// Shared, lock-guarded home of the [`SystemState`].
///
/// Cloning is cheap and every clone points at the same state, so the engine
/// and each HTTP handler hold their own handle. Every operation takes the
/// lock once and releases it before returning; callers never see a CPU
/// reading paired with a replica count from another write.
#[derive(Debug, Clone)]
pub struct StateStore {
    inner: Arc<Mutex<SystemState>>,
    bounds: ReplicaBounds,
}

impl StateStore {
    /// Create a store holding `initial`, rejecting a replica count outside `bounds`
    pub fn new(initial: SystemState, bounds: ReplicaBounds) -> AutoscalerResult<Self> {
        if !bounds.contains(i64::from(initial.replicas)) {
            return Err(AutoscalerError::invalid_replica_count(
                i64::from(initial.replicas),
                bounds.min,
                bounds.max,
            ));
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(initial)),
            bounds,
        })
    }

    /// Create a store from the configured bounds and initial state
    pub fn from_config(config: &AutoscalerConfig) -> AutoscalerResult<Self> {
        config.validate()?;
        Self::new(config.initial_state(), config.bounds())
    }

    pub fn bounds(&self) -> ReplicaBounds {
        self.bounds
    }

    /// Consistent copy of the current state
    pub async fn read(&self) -> SystemState {
        *self.inner.lock().await
    }

    /// Replace the replica count on behalf of an operator.
    ///
    /// Out-of-range requests fail with `InvalidReplicaCount` and leave the
    /// state untouched.
    pub async fn set_replicas(&self, replicas: i64) -> AutoscalerResult<()> {
        if !self.bounds.contains(replicas) {
            warn!(
                "Rejected replica update {} (allowed {}..={})",
                replicas, self.bounds.min, self.bounds.max
            );
            return Err(AutoscalerError::invalid_replica_count(
                replicas,
                self.bounds.min,
                self.bounds.max,
            ));
        }

        let mut state = self.inner.lock().await;
        state.replicas = replicas as ReplicaCount;
        debug!("Replicas set to {}", state.replicas);
        Ok(())
    }

    /// Commit a control loop result: both fields change under one lock
    pub async fn apply_scaling_decision(
        &self,
        cpu_utilization: Utilization,
        replicas: ReplicaCount,
    ) -> SystemState {
        let mut state = self.inner.lock().await;
        self.commit(&mut state, cpu_utilization, replicas);
        *state
    }

    /// Read, decide and commit as one critical section.
    ///
    /// `decide` runs while the lock is held, so an operator write is either
    /// visible to it or applied after the commit, never overwritten by a
    /// decision computed from a stale count. `decide` must not touch the store.
    pub async fn scale_with<F>(&self, decide: F) -> (ScalingDecision, SystemState)
    where
        F: FnOnce(SystemState) -> ScalingDecision,
    {
        let mut state = self.inner.lock().await;
        let decision = decide(*state);
        self.commit(&mut state, decision.cpu_utilization, decision.replicas);
        (decision, *state)
    }

    fn commit(&self, state: &mut SystemState, cpu_utilization: Utilization, replicas: ReplicaCount) {
        state.cpu.high_priority = cpu_utilization;
        state.replicas = self.bounds.clamp(i64::from(replicas));
    }
}
