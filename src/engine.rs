// src/engine.rs

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::callbacks::{CallbackContext, ScalingObserver};
use crate::config::AutoscalerConfig;
use crate::controller::ScalingController;
use crate::error::{AutoscalerError, AutoscalerResult};
use crate::simulation::{CpuModel, NoiseSource, RandomNoise};
use crate::state::StateStore;
use crate::types::{ScalingDecision, SystemState, Timestamp};
use crate::utils::current_timestamp;

/// Commands that can be sent to the autoscaler engine
#[derive(Debug)]
pub enum EngineCommand {
    /// Get current engine status
    GetStatus {
        response: oneshot::Sender<EngineStatus>,
    },
    /// Shutdown the engine
    Shutdown,
}

/// Status information about the autoscaler engine
#[derive(Debug, Clone, Default)]
pub struct EngineStatus {
    pub is_running: bool,
    pub ticks_completed: u64,
    /// Ticks that changed the replica count
    pub scale_events: u64,
    pub last_tick: Option<Timestamp>,
    pub last_decision: Option<ScalingDecision>,
}

/// The control loop: simulates load, decides, commits, notifies
pub struct AutoscalerEngine {
    config: AutoscalerConfig,
    store: StateStore,
    controller: ScalingController,
    model: CpuModel,
    noise: Box<dyn NoiseSource>,
    observers: Vec<Arc<dyn ScalingObserver>>,
    command_tx: mpsc::UnboundedSender<EngineCommand>,
    command_rx: Option<mpsc::UnboundedReceiver<EngineCommand>>,
    status: EngineStatus,
}

impl std::fmt::Debug for AutoscalerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoscalerEngine")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("controller", &self.controller)
            .field("model", &self.model)
            .field("observers", &self.observers.len())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl AutoscalerEngine {
    /// Create a new engine driving `store` with entropy-seeded noise
    pub fn new(config: AutoscalerConfig, store: StateStore) -> AutoscalerResult<Self> {
        config.validate()?;
        if store.bounds() != config.bounds() {
            return Err(AutoscalerError::config(format!(
                "store bounds {:?} differ from configured bounds {:?}",
                store.bounds(),
                config.bounds()
            )));
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();

        Ok(Self {
            controller: ScalingController::from_config(&config),
            model: CpuModel::from_config(&config),
            config,
            store,
            noise: Box::new(RandomNoise::new()),
            observers: Vec::new(),
            command_tx,
            command_rx: Some(command_rx),
            status: EngineStatus::default(),
        })
    }

    /// Replace the noise source (deterministic runs, tests)
    pub fn with_noise(mut self, noise: Box<dyn NoiseSource>) -> Self {
        self.noise = noise;
        self
    }

    /// Add an observer to receive tick events
    pub fn add_observer(mut self, observer: Arc<dyn ScalingObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Get a handle to send commands to the engine
    pub fn handle(&self) -> AutoscalerHandle {
        AutoscalerHandle {
            command_tx: self.command_tx.clone(),
        }
    }

    pub fn status(&self) -> &EngineStatus {
        &self.status
    }

    /// Run the loop on a new task, returning its handle and join handle
    pub fn spawn(self) -> (AutoscalerHandle, JoinHandle<AutoscalerResult<()>>) {
        let handle = self.handle();
        let task = tokio::spawn(self.start());
        (handle, task)
    }

    /// Start the control loop (consumes self); returns after a shutdown command
    pub async fn start(mut self) -> AutoscalerResult<()> {
        let mut command_rx = self
            .command_rx
            .take()
            .ok_or_else(|| AutoscalerError::engine_not_running("Engine already started"))?;

        self.status.is_running = true;

        let period = self.config.evaluation_interval();
        info!(
            "Autoscaler engine starting (interval {:?}, target {:.2} ± {:.2}, replicas {}..={})",
            period,
            self.config.target_utilization,
            self.config.tolerance,
            self.config.min_replicas,
            self.config.max_replicas
        );

        // First evaluation one full period after start
        let mut evaluation_timer = interval_at(Instant::now() + period, period);
        evaluation_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = command_rx.recv() => {
                    match command {
                        Some(EngineCommand::GetStatus { response }) => {
                            let _ = response.send(self.status.clone()); // Ignore send errors
                        }
                        Some(EngineCommand::Shutdown) => {
                            info!("Shutdown command received");
                            break;
                        }
                        None => {
                            info!("Command channel closed, shutting down engine");
                            break;
                        }
                    }
                }

                _ = evaluation_timer.tick() => {
                    self.tick().await;
                }
            }
        }

        self.status.is_running = false;
        info!(
            "Autoscaler engine stopped after {} ticks ({} scale events)",
            self.status.ticks_completed, self.status.scale_events
        );
        Ok(())
    }

    /// Run one evaluation: simulate, decide and commit under the store lock, then notify
    pub async fn tick(&mut self) -> ScalingDecision {
        let model = self.model;
        let controller = self.controller;
        let noise = self.noise.as_mut();
        let (decision, state) = self
            .store
            .scale_with(|current| {
                let cpu = model.sample(current.replicas, noise);
                controller.evaluate(cpu, current.replicas)
            })
            .await;

        self.status.ticks_completed += 1;
        self.status.last_tick = Some(decision.timestamp);
        if decision.changed() {
            self.status.scale_events += 1;
            info!(
                "Scaled {:?} {} -> {}: {}",
                decision.direction, decision.previous_replicas, decision.replicas, decision.reason
            );
        } else {
            debug!("No scaling: {}", decision.reason);
        }
        info!("cpu usage: {:.2} replicas: {}", state.cpu_utilization(), state.replicas);

        self.notify_observers(&decision, &state).await;
        self.status.last_decision = Some(decision.clone());
        decision
    }

    async fn notify_observers(&self, decision: &ScalingDecision, state: &SystemState) {
        if self.observers.is_empty() {
            return;
        }

        let mut metadata = HashMap::new();
        metadata.insert(
            "target_utilization".to_string(),
            format!("{:.2}", self.config.target_utilization),
        );
        let context = CallbackContext {
            timestamp: current_timestamp(),
            tick: self.status.ticks_completed,
            metadata,
        };

        for observer in &self.observers {
            if let Err(e) = observer.on_tick(decision, state, &context).await {
                warn!("Observer error on tick: {}", e);
            }
            if decision.changed() {
                if let Err(e) = observer.on_scaled(decision, &context).await {
                    warn!("Observer error on scaling: {}", e);
                }
            }
        }
    }
}

/// Handle for interacting with a running autoscaler engine
#[derive(Debug, Clone)]
pub struct AutoscalerHandle {
    command_tx: mpsc::UnboundedSender<EngineCommand>,
}

impl AutoscalerHandle {
    /// Get current engine status
    pub async fn get_status(&self) -> AutoscalerResult<EngineStatus> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(EngineCommand::GetStatus {
                response: response_tx,
            })
            .map_err(|_| AutoscalerError::engine_not_running("Engine has stopped"))?;
        Ok(response_rx.await?)
    }

    /// Shutdown the engine
    pub async fn shutdown(&self) -> AutoscalerResult<()> {
        self.command_tx.send(EngineCommand::Shutdown)?;
        Ok(())
    }
}
