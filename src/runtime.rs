//! Runtime for executing sessions
//!
//! One task per visitor session owns its state; handlers reach it through
//! channels.

mod executor;
pub mod traits;


pub use executor::SessionRuntime;
pub use traits::*;

use crate::router::CommandRouter;
use crate::session::{Session, SessionSnapshot, TurnView};
use crate::state_machine::Event;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch, RwLock};
use tokio::time::Instant;

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime = SessionRuntime<Arc<dyn LlmClient>, PageNavigator>;

const EVENT_CHANNEL_CAPACITY: usize = 32;
const BROADCAST_CHANNEL_CAPACITY: usize = 128;

/// Sessions untouched for this long with no live stream are dropped
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session {0} has stopped")]
    Closed(String),
}

/// Manager for all session runtimes
pub struct SessionManager {
    llm_client: Arc<dyn LlmClient>,
    router: Arc<CommandRouter>,
    sections: Arc<PageSections>,
    persona: Arc<str>,
    max_turns: usize,
    idle_timeout: Duration,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<SseEvent>,
    pub snapshot_rx: watch::Receiver<SessionSnapshot>,
    last_activity: Arc<Mutex<Instant>>,
}

impl SessionHandle {
    fn touch(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Idle means no open event stream and no request for `timeout`
    fn is_idle(&self, timeout: Duration) -> bool {
        let last_activity = *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.broadcast_tx.receiver_count() == 0 && last_activity.elapsed() >= timeout
    }
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Init { snapshot: SessionSnapshot },
    Turn { turn: TurnView },
    StateChange { busy: bool, attempt: Option<u32> },
    Scroll { section_id: String, highlight_ms: u64 },
    HighlightCleared { section_id: String },
    Panel { open: bool },
}

impl SessionManager {
    pub fn new(
        llm_client: Arc<dyn LlmClient>,
        router: Arc<CommandRouter>,
        sections: Arc<PageSections>,
        persona: impl Into<Arc<str>>,
        max_turns: usize,
    ) -> Self {
        Self {
            llm_client,
            router,
            sections,
            persona: persona.into(),
            max_turns,
            idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Start a fresh session and return its id and initial snapshot
    pub async fn create(&self) -> (String, SessionSnapshot) {
        let session_id = uuid::Uuid::new_v4().to_string();
        let session = Session::new(&session_id, self.max_turns);
        let snapshot = session.snapshot();

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(snapshot.clone());

        let navigator = PageNavigator::new(self.sections.clone(), broadcast_tx.clone());
        let runtime: ProductionRuntime = SessionRuntime::new(
            session,
            self.persona.clone(),
            self.router.clone(),
            self.llm_client.clone(),
            navigator,
            event_rx,
            &event_tx,
            broadcast_tx.clone(),
            snapshot_tx,
        );

        tokio::spawn(runtime.run());

        self.sessions.write().await.insert(
            session_id.clone(),
            SessionHandle {
                event_tx,
                broadcast_tx,
                snapshot_rx,
                last_activity: Arc::new(Mutex::new(Instant::now())),
            },
        );

        tracing::info!(session_id = %session_id, "Created session");
        (session_id, snapshot)
    }

    /// Look up a session; every lookup counts as activity
    pub async fn get(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        let handle = self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        handle.touch();
        Ok(handle)
    }

    /// Send an event to a session
    pub async fn send_event(&self, session_id: &str, event: Event) -> Result<(), SessionError> {
        let handle = self.get(session_id).await?;
        handle
            .event_tx
            .send(event)
            .await
            .map_err(|_| SessionError::Closed(session_id.to_string()))
    }

    /// Latest published state of a session
    pub async fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, SessionError> {
        let handle = self.get(session_id).await?;
        let snapshot = handle.snapshot_rx.borrow().clone();
        Ok(snapshot)
    }

    /// Subscribe to session updates, starting from the current snapshot
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<(SessionSnapshot, broadcast::Receiver<SseEvent>), SessionError> {
        let handle = self.get(session_id).await?;
        let rx = handle.broadcast_tx.subscribe();
        let snapshot = handle.snapshot_rx.borrow().clone();
        Ok((snapshot, rx))
    }

    /// Drop a session; its runtime stops once in-flight work settles
    pub async fn remove(&self, session_id: &str) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(session_id)
            .map(|_| tracing::info!(session_id = %session_id, "Removed session"))
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    /// Drop every idle session, returning how many went
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|session_id, handle| {
            let idle = handle.is_idle(self.idle_timeout);
            if idle {
                tracing::info!(session_id = %session_id, "Evicting idle session");
            }
            !idle
        });
        before - sessions.len()
    }

    /// Periodically evict idle sessions until the manager is dropped
    pub fn spawn_idle_sweeper(self: &Arc<Self>) {
        let manager: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                let evicted = manager.evict_idle().await;
                if evicted > 0 {
                    let live = manager.session_count().await;
                    tracing::info!(evicted, live, "Swept idle sessions");
                }
            }
        });
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
