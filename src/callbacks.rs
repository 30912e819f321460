// src/callbacks.rs

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::AutoscalerResult;
use crate::types::{ScalingDecision, SystemState};

/// Context provided to callbacks with additional information
#[derive(Debug, Clone)]
pub struct CallbackContext {
    /// Current timestamp when callback is invoked
    pub timestamp: u64,
    /// Number of ticks completed, including the one being reported
    pub tick: u64,
    /// Any additional metadata from the engine
    pub metadata: HashMap<String, String>,
}

/// Trait for receiving control loop events
///
/// Implement this to get notified about every tick and every change in
/// fleet size. Useful for metrics export, alerting, or audit trails.
/// Errors are logged by the engine and never stop the loop.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScalingObserver: Send + Sync {
    /// Called after every tick, once the new state is committed
    async fn on_tick(
        &self,
        _decision: &ScalingDecision,
        _state: &SystemState,
        _context: &CallbackContext,
    ) -> AutoscalerResult<()> {
        // Default implementation: do nothing
        Ok(())
    }

    /// Called after a tick that changed the replica count
    async fn on_scaled(
        &self,
        _decision: &ScalingDecision,
        _context: &CallbackContext,
    ) -> AutoscalerResult<()> {
        // Default implementation: do nothing
        Ok(())
    }
}
