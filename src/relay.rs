use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::{run_api, ApiState};
use crate::bridge::{self, Actuator};
use crate::config::RelayConfig;
use crate::dispatcher::Dispatcher;
use crate::scheduler::Coordinator;

/// Wires the coordinator, the dispatcher and the HTTP API together.
pub struct Relay {
    pub config: RelayConfig,
    pub coordinator: Arc<Coordinator>,
    pub dispatcher: Dispatcher,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Self {
        let actuator = bridge::from_config(&config.bridge);
        Self::with_actuator(config, actuator)
    }

    /// Build a relay around an already constructed device bridge.
    pub fn with_actuator(config: RelayConfig, actuator: Arc<dyn Actuator>) -> Self {
        let coordinator = Arc::new(Coordinator::new(config.default_speed));
        let dispatcher = Dispatcher::new(
            coordinator.clone(),
            actuator,
            config.actuator_timeout(),
        );
        Self {
            config,
            coordinator,
            dispatcher,
        }
    }

    /// Run until `cancel` fires.
    ///
    /// 1. Spawns the dispatcher loop
    /// 2. Serves the HTTP API until shutdown, or until the dispatcher dies
    /// 3. On shutdown, waits for any in-flight playback to be recorded
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP listener cannot be bound or fails, or
    /// if the dispatcher loop stops abnormally.
    pub async fn run(self, cancel: CancellationToken) -> std::io::Result<()> {
        let dispatcher = self.dispatcher.clone();
        let interval = self.config.poll_interval();
        let dispatcher_cancel = cancel.clone();
        let mut dispatcher_task = tokio::spawn(async move {
            dispatcher.run(interval, dispatcher_cancel).await;
        });

        let state = ApiState {
            coordinator: self.coordinator.clone(),
        };
        let api = run_api(self.config.listen_addr, state, cancel.clone());
        tokio::pin!(api);

        // Whichever side stops first takes the other one down with it.
        let (served, joined) = tokio::select! {
            served = &mut api => {
                cancel.cancel();
                (served, dispatcher_task.await)
            }
            joined = &mut dispatcher_task => {
                cancel.cancel();
                (api.await, joined)
            }
        };

        let dispatched = joined.map_err(|e| {
            tracing::error!(error = %e, "Dispatcher task failed");
            std::io::Error::other(format!("dispatcher task failed: {e}"))
        });

        let status = self.coordinator.status();
        if status.queue_len > 0 {
            tracing::warn!(queue_len = status.queue_len, "Dropping queued jobs on shutdown");
        }

        served.and(dispatched)
    }
}
