// src/config.rs

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AutoscalerError, AutoscalerResult};
use crate::types::{ReplicaBounds, ReplicaCount, SystemState, Utilization};

/// Longest accepted control loop interval (one day)
pub const MAX_EVALUATION_INTERVAL_SECONDS: u64 = 86_400;

/// Main configuration for the autoscaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoscalerConfig {
    /// Utilization the control loop tries to hold
    pub target_utilization: Utilization,
    /// Half-width of the dead-band around the target
    pub tolerance: Utilization,
    /// Smallest fleet the loop or an operator may set
    pub min_replicas: ReplicaCount,
    /// Largest fleet the loop or an operator may set
    pub max_replicas: ReplicaCount,
    /// Replica count at startup
    pub initial_replicas: ReplicaCount,
    /// CPU utilization reported before the first tick
    pub initial_cpu_utilization: Utilization,
    /// Lower edge of the simulated background load
    pub base_load_min: Utilization,
    /// Width of the uniform noise added on top of `base_load_min`
    pub base_load_spread: Utilization,
    /// How often to run the control loop (seconds)
    pub evaluation_interval_seconds: u64,
}

impl Default for AutoscalerConfig {
    fn default() -> Self {
        Self {
            target_utilization: 0.80,
            tolerance: 0.02,
            min_replicas: 1,
            max_replicas: 100,
            initial_replicas: 10,
            initial_cpu_utilization: 0.68,
            base_load_min: 0.68,
            base_load_spread: 0.10,
            evaluation_interval_seconds: 2,
        }
    }
}

impl AutoscalerConfig {
    pub fn builder() -> AutoscalerConfigBuilder {
        AutoscalerConfigBuilder::new()
    }

    pub fn bounds(&self) -> ReplicaBounds {
        ReplicaBounds::new(self.min_replicas, self.max_replicas)
    }

    pub fn initial_state(&self) -> SystemState {
        SystemState::new(self.initial_replicas, self.initial_cpu_utilization)
    }

    pub fn evaluation_interval(&self) -> Duration {
        Duration::from_secs(self.evaluation_interval_seconds)
    }

    /// Check that the settings describe a loop that can actually run
    pub fn validate(&self) -> AutoscalerResult<()> {
        if self.min_replicas == 0 {
            return Err(AutoscalerError::config("min_replicas must be at least 1"));
        }
        if self.min_replicas > self.max_replicas {
            return Err(AutoscalerError::config(format!(
                "min_replicas ({}) exceeds max_replicas ({})",
                self.min_replicas, self.max_replicas
            )));
        }
        if !self.bounds().contains(i64::from(self.initial_replicas)) {
            return Err(AutoscalerError::config(format!(
                "initial_replicas ({}) must be between {} and {}",
                self.initial_replicas, self.min_replicas, self.max_replicas
            )));
        }
        if !(self.target_utilization > 0.0 && self.target_utilization <= 1.0) {
            return Err(AutoscalerError::config(format!(
                "target_utilization ({}) must be in (0, 1]",
                self.target_utilization
            )));
        }
        if !(self.tolerance >= 0.0 && self.tolerance < self.target_utilization) {
            return Err(AutoscalerError::config(format!(
                "tolerance ({}) must be non-negative and below the target",
                self.tolerance
            )));
        }
        if !(self.base_load_min.is_finite() && self.base_load_min >= 0.0) {
            return Err(AutoscalerError::config(format!(
                "base_load_min ({}) must be a finite, non-negative fraction",
                self.base_load_min
            )));
        }
        if !(self.base_load_spread.is_finite() && self.base_load_spread >= 0.0) {
            return Err(AutoscalerError::config(format!(
                "base_load_spread ({}) must be a finite, non-negative fraction",
                self.base_load_spread
            )));
        }
        if self.evaluation_interval_seconds == 0
            || self.evaluation_interval_seconds > MAX_EVALUATION_INTERVAL_SECONDS
        {
            return Err(AutoscalerError::config(format!(
                "evaluation_interval_seconds ({}) must be between 1 and {}",
                self.evaluation_interval_seconds, MAX_EVALUATION_INTERVAL_SECONDS
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document; missing keys keep their defaults
    #[cfg(feature = "config-toml")]
    pub fn from_toml_str(input: &str) -> AutoscalerResult<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "config-toml")]
    pub fn from_toml_file<P: AsRef<std::path::Path>>(path: P) -> AutoscalerResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

/// Builder for creating autoscaler configurations easily
#[derive(Debug)]
pub struct AutoscalerConfigBuilder {
    config: AutoscalerConfig,
}

impl Default for AutoscalerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoscalerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AutoscalerConfig::default(),
        }
    }

    pub fn target_utilization(mut self, target: Utilization) -> Self {
        self.config.target_utilization = target;
        self
    }

    pub fn tolerance(mut self, tolerance: Utilization) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    pub fn replica_bounds(mut self, min: ReplicaCount, max: ReplicaCount) -> Self {
        self.config.min_replicas = min;
        self.config.max_replicas = max;
        self
    }

    pub fn initial_state(mut self, replicas: ReplicaCount, cpu_utilization: Utilization) -> Self {
        self.config.initial_replicas = replicas;
        self.config.initial_cpu_utilization = cpu_utilization;
        self
    }

    pub fn base_load(mut self, min: Utilization, spread: Utilization) -> Self {
        self.config.base_load_min = min;
        self.config.base_load_spread = spread;
        self
    }

    pub fn evaluation_interval(mut self, seconds: u64) -> Self {
        self.config.evaluation_interval_seconds = seconds;
        self
    }

    pub fn build(self) -> AutoscalerConfig {
        self.config
    }
}
