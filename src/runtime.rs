//! Server runtime.
//!
//! Wires storage, the bus, the relay, email delivery and the HTTP surface
//! together, runs them until shutdown, then lets the background tasks
//! drain.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::bus::{ClaimBus, ClaimRelay};
use crate::config::Config;
use crate::http::{self, AppState, SharedState};
use crate::interfaces::{MailError, StorageError};
use crate::notify::{self, EmailDispatcher};
use crate::storage::{self, Storage};

/// How long background tasks get to finish after the server stops.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Mail setup error: {0}")]
    Mail(#[from] MailError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully wired server.
pub struct Runtime {
    config: Config,
    state: SharedState,
    tasks: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Open storage from configuration and wire everything.
    pub async fn build(config: Config) -> Result<Self, RuntimeError> {
        let storage = storage::init_storage(&config.storage).await?;
        Self::with_storage(config, storage).await
    }

    /// Wire everything around existing stores.
    pub async fn with_storage(config: Config, storage: Storage) -> Result<Self, RuntimeError> {
        let mailer = notify::mailer_from_config(&config.email)?;
        let (emails, email_task) = EmailDispatcher::start(mailer, config.email.queue_capacity);

        let bus = ClaimBus::new(config.messaging.bus_capacity);
        let relay = ClaimRelay::new(
            storage.claims.clone(),
            storage.roster.clone(),
            bus.clone(),
            emails,
            config.messaging.relay_batch_size,
        )
        .await?;
        let (relay_handle, relay_task) = relay.start(&config.messaging);

        let state = Arc::new(AppState::new(&storage, &config, bus, relay_handle));

        Ok(Self {
            config,
            state,
            tasks: vec![relay_task, email_task],
        })
    }

    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    pub fn router(&self) -> Router {
        http::router(self.state.clone(), &self.config.server.allowed_origins)
    }

    /// Serve until `shutdown` resolves, then drain the relay and email queue.
    pub async fn run(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), RuntimeError> {
        let app = self.router();
        let address = self.config.server.bind_address();
        let Runtime { state, tasks, .. } = self;

        let served = http::serve(app, &address, shutdown).await;

        // The relay stops once the last handle is gone, and the email
        // worker stops once the relay is gone.
        drop(state);
        for task in tasks {
            let abort = task.abort_handle();
            if tokio::time::timeout(DRAIN_TIMEOUT, task).await.is_err() {
                warn!("Background task did not finish in time, aborting");
                abort.abort();
            }
        }
        info!("Runtime stopped");

        Ok(served?)
    }
}
