//! # Beacon - Simulated Replica Autoscaler
//!
//! Beacon keeps a replica count tracking a target CPU utilization. A control
//! loop wakes on a fixed interval, simulates the fleet's CPU load from the
//! current replica count, and moves the count proportionally to the gap
//! between load and target. Operators read and override the count over HTTP
//! while the loop runs.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────┐        ┌─────────────────────────────┐
//!   │   HTTP (axum)    │        │      AutoscalerEngine       │
//!   │                  │        │                             │
//!   │ GET  /app/status │        │ every tick:                 │
//!   │ GET  /app/replicas        │  1. read replicas           │
//!   │ PUT  /app/replicas        │  2. CpuModel + NoiseSource  │
//!   └────────┬─────────┘        │  3. ScalingController       │
//!            │                  │  4. commit (cpu, replicas)  │
//!            │                  │  5. notify observers        │
//!            │                  └──────────────┬──────────────┘
//!            │   read / set_replicas           │ read / apply_scaling_decision
//!            └──────────────┐   ┌──────────────┘
//!                       ┌───▼───▼───┐
//!                       │StateStore │  one Mutex<SystemState>
//!                       └───────────┘
//! ```
//!
//! ## Control law
//!
//! With target `t`, tolerance `b` and current replicas `R`:
//!
//! - `cpu > t + b`: add `ceil((cpu - t) * R)`, capped at `max_replicas`
//! - `cpu < t - b` and `R > min_replicas`: remove `ceil((t - cpu) * R)`, floored at `min_replicas`
//! - otherwise: keep `R`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use beacon::{build_router, AutoscalerConfig, AutoscalerEngine, StateStore};
//!
//! #[tokio::main]
//! async fn main() -> beacon::AutoscalerResult<()> {
//!     let config = AutoscalerConfig::builder()
//!         .replica_bounds(1, 50)
//!         .evaluation_interval(2)
//!         .build();
//!
//!     let store = StateStore::from_config(&config)?;
//!     let (handle, _task) = AutoscalerEngine::new(config, store.clone())?.spawn();
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8123").await?;
//!     axum::serve(listener, build_router(store)).await?;
//!
//!     handle.shutdown().await
//! }
//! ```
//!
//! ## Features
//!
//! - `config-toml` (default): load [`AutoscalerConfig`] from a TOML file
//! - `prometheus-metrics`: `MetricsObserver` and a `/metrics` route

pub mod api;
pub mod callbacks;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod simulation;
pub mod state;
pub mod types;
pub mod utils;
#[cfg(feature = "prometheus-metrics")]
pub mod metrics;


// Re-export common types for convenience
pub use types::{
    CpuStatus, ReplicaBounds, ReplicaCount, ReplicaUpdate, ScaleDirection, ScalingDecision,
    SystemState, Timestamp, Utilization,
};

pub use config::{AutoscalerConfig, AutoscalerConfigBuilder};

pub use error::{AutoscalerError, AutoscalerResult};

pub use state::StateStore;

pub use controller::ScalingController;

pub use simulation::{CpuModel, FixedNoise, NoiseSource, RandomNoise};

pub use callbacks::{CallbackContext, ScalingObserver};

pub use engine::{AutoscalerEngine, AutoscalerHandle, EngineStatus};

pub use api::{build_router, ApiState};

#[cfg(feature = "prometheus-metrics")]
pub use metrics::MetricsObserver;
