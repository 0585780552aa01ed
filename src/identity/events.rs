//! In-process stream of identity changes.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum AuthEvent {
    SignedIn { user_id: Uuid },
    TokenRefreshed { user_id: Uuid },
    SignedOut { user_id: Uuid },
}

#[derive(Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    /// Fire and forget; nobody listening is fine.
    pub fn emit(&self, ev: AuthEvent) {
        let _ = self.tx.send(ev);
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a task that writes every identity change to the log.
pub fn spawn_logger(mut rx: broadcast::Receiver<AuthEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => log::info!("auth event: {ev:?}"),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    log::warn!("auth event logger skipped {n} events")
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
