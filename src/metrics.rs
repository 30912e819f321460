//! Prometheus export of the autoscaler state

use async_trait::async_trait;
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::callbacks::{CallbackContext, ScalingObserver};
use crate::error::AutoscalerResult;
use crate::types::{ScaleDirection, ScalingDecision, SystemState};

/// Observer that mirrors every tick into a private Prometheus registry
#[derive(Clone)]
pub struct MetricsObserver {
    registry: Registry,
    replicas: IntGauge,
    cpu_utilization: Gauge,
    ticks: IntCounter,
    scale_events: IntCounterVec,
}

impl MetricsObserver {
    pub fn new() -> AutoscalerResult<Self> {
        let registry = Registry::new();

        let replicas = IntGauge::new("beacon_replicas", "Current replica count")?;
        let cpu_utilization = Gauge::new(
            "beacon_cpu_utilization",
            "Last simulated CPU utilization (fraction)",
        )?;
        let ticks = IntCounter::new("beacon_ticks_total", "Control loop evaluations")?;
        let scale_events = IntCounterVec::new(
            Opts::new("beacon_scale_events_total", "Ticks that changed the replica count"),
            &["direction"],
        )?;

        registry.register(Box::new(replicas.clone()))?;
        registry.register(Box::new(cpu_utilization.clone()))?;
        registry.register(Box::new(ticks.clone()))?;
        registry.register(Box::new(scale_events.clone()))?;

        Ok(Self {
            registry,
            replicas,
            cpu_utilization,
            ticks,
            scale_events,
        })
    }

    /// Publish a state snapshot, e.g. the initial state before the first tick
    pub fn record_state(&self, state: &SystemState) {
        self.replicas.set(i64::from(state.replicas));
        self.cpu_utilization.set(state.cpu_utilization());
    }

    /// Text exposition format
    pub fn render(&self) -> AutoscalerResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[async_trait]
impl ScalingObserver for MetricsObserver {
    async fn on_tick(
        &self,
        _decision: &ScalingDecision,
        state: &SystemState,
        _context: &CallbackContext,
    ) -> AutoscalerResult<()> {
        self.record_state(state);
        self.ticks.inc();
        Ok(())
    }

    async fn on_scaled(
        &self,
        decision: &ScalingDecision,
        _context: &CallbackContext,
    ) -> AutoscalerResult<()> {
        let label = match decision.direction {
            ScaleDirection::Up => "up",
            ScaleDirection::Down => "down",
            ScaleDirection::Maintain => return Ok(()),
        };
        self.scale_events.with_label_values(&[label]).inc();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn tick_updates_exposition() {
        let metrics = MetricsObserver::new().unwrap();
        let decision = ScalingDecision {
            previous_replicas: 10,
            replicas: 11,
            cpu_utilization: 0.9,
            direction: ScaleDirection::Up,
            reason: "test".to_string(),
            timestamp: 0,
        };
        let context = CallbackContext {
            timestamp: 0,
            tick: 1,
            metadata: HashMap::new(),
        };

        metrics.on_tick(&decision, &SystemState::new(11, 0.9), &context).await.unwrap();
        metrics.on_scaled(&decision, &context).await.unwrap();

        let body = metrics.render().unwrap();
        assert!(body.contains("beacon_replicas 11"));
        assert!(body.contains("beacon_ticks_total 1"));
        assert!(body.contains("beacon_scale_events_total{direction=\"up\"} 1"));
    }
}
