//! Runtime for chat sessions
//!
//! Each visitor session gets one `ConversationRuntime` task that owns its
//! `Conversation`, executes effects, and publishes updates. Sessions live in
//! memory only. A session nobody has touched for the idle window, with no
//! stream attached and no reply pending, is reclaimed by the sweeper.

mod executor;
pub mod traits;


pub use executor::ConversationRuntime;
pub use traits::*;

use crate::conversation::{Conversation, Message, RenderState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(10);
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime = ConversationRuntime<Arc<dyn Completer>>;

/// Input to a session runtime
#[derive(Debug)]
pub enum SessionInput {
    /// Visitor submitted text; `ack` reports whether it was accepted
    Submit {
        text: String,
        ack: oneshot::Sender<bool>,
    },
    /// Completion task produced a reply
    Resolved {
        submission_id: String,
        reply: String,
    },
    /// Completion task died without a reply
    Failed {
        submission_id: String,
        error: String,
    },
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub input_tx: mpsc::Sender<SessionInput>,
    pub broadcast_tx: broadcast::Sender<SseEvent>,
    pub snapshot_rx: watch::Receiver<RenderState>,
    /// Milliseconds since the manager started, at the last sign of life
    last_active: Arc<AtomicU64>,
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Init { state: RenderState },
    Message { message: Message },
    StateChange { state: serde_json::Value },
    Error { message: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session {0} is no longer running")]
    Closed(String),
}

/// Manager for all session runtimes
pub struct RuntimeManager {
    completer: Arc<dyn Completer>,
    greeting: String,
    sessions: RwLock<HashMap<String, SessionHandle>>,
    started: Instant,
}

impl RuntimeManager {
    pub fn new(completer: Arc<dyn Completer>, greeting: impl Into<String>) -> Self {
        Self {
            completer,
            greeting: greeting.into(),
            sessions: RwLock::new(HashMap::new()),
            started: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Start a new session seeded with the greeting
    pub async fn create_session(&self) -> (String, RenderState) {
        let session_id = uuid::Uuid::new_v4().to_string();
        let conversation = Conversation::new(self.greeting.clone());
        let initial = conversation.snapshot();

        let (input_tx, input_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let (snapshot_tx, snapshot_rx) = watch::channel(initial.clone());

        let runtime: ProductionRuntime = ConversationRuntime::new(
            session_id.clone(),
            conversation,
            Arc::clone(&self.completer),
            input_rx,
            input_tx.downgrade(),
            broadcast_tx.clone(),
            snapshot_tx,
        );

        let id = session_id.clone();
        tokio::spawn(async move {
            runtime.run().await;
            tracing::info!(session_id = %id, "Session runtime finished");
        });

        self.sessions.write().await.insert(
            session_id.clone(),
            SessionHandle {
                input_tx,
                broadcast_tx,
                snapshot_rx,
                last_active: Arc::new(AtomicU64::new(self.now_ms())),
            },
        );

        tracing::info!(session_id = %session_id, "Session created");
        (session_id, initial)
    }

    /// Look up a session. Every lookup counts as activity.
    async fn handle(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        let handle = self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        handle.last_active.store(self.now_ms(), Ordering::Relaxed);
        Ok(handle)
    }

    /// Current render state of a session
    pub async fn snapshot(&self, session_id: &str) -> Result<RenderState, SessionError> {
        let handle = self.handle(session_id).await?;
        let state = handle.snapshot_rx.borrow().clone();
        Ok(state)
    }

    /// Watch a session's render state
    #[cfg(test)]
    pub async fn watch(
        &self,
        session_id: &str,
    ) -> Result<watch::Receiver<RenderState>, SessionError> {
        Ok(self.handle(session_id).await?.snapshot_rx)
    }

    /// Submit visitor text. Returns whether the submission was accepted.
    pub async fn submit(&self, session_id: &str, text: String) -> Result<bool, SessionError> {
        let handle = self.handle(session_id).await?;
        let (ack, ack_rx) = oneshot::channel();

        handle
            .input_tx
            .send(SessionInput::Submit { text, ack })
            .await
            .map_err(|_| SessionError::Closed(session_id.to_string()))?;

        ack_rx
            .await
            .map_err(|_| SessionError::Closed(session_id.to_string()))
    }

    /// Subscribe to session updates.
    ///
    /// The receiver is created before the snapshot is read, so no update is
    /// missed; an update may appear in both and clients dedupe by message id.
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<(RenderState, broadcast::Receiver<SseEvent>), SessionError> {
        let handle = self.handle(session_id).await?;
        let rx = handle.broadcast_tx.subscribe();
        let state = handle.snapshot_rx.borrow().clone();
        Ok((state, rx))
    }

    /// Drop a session. Its runtime stops once any in-flight completion lands.
    pub async fn close_session(&self, session_id: &str) -> Result<(), SessionError> {
        if self.sessions.write().await.remove(session_id).is_none() {
            return Err(SessionError::NotFound(session_id.to_string()));
        }
        tracing::info!(session_id = %session_id, "Session closed");
        Ok(())
    }

    /// Drop every session idle for at least `max_idle`. Returns how many went.
    ///
    /// A session with a stream attached or a reply pending is never idle; the
    /// window restarts once the stream goes away or the reply lands.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = self.now_ms();
        let max_idle_ms = u64::try_from(max_idle.as_millis()).unwrap_or(u64::MAX);

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|session_id, handle| {
            if handle.broadcast_tx.receiver_count() > 0 || handle.snapshot_rx.borrow().pending {
                handle.last_active.store(now, Ordering::Relaxed);
                return true;
            }
            let idle_ms = now.saturating_sub(handle.last_active.load(Ordering::Relaxed));
            if idle_ms < max_idle_ms {
                return true;
            }
            tracing::debug!(session_id = %session_id, idle_ms, "Evicting idle session");
            false
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Idle sessions reclaimed");
        }
        evicted
    }

    /// Sweep idle sessions in the background until the manager is dropped
    pub fn spawn_reaper(self: &Arc<Self>, max_idle: Duration) -> JoinHandle<()> {
        let manager = Arc::downgrade(self);
        let period = (max_idle / 4).clamp(MIN_SWEEP_PERIOD, MAX_SWEEP_PERIOD);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                manager.evict_idle(max_idle).await;
            }
        })
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
