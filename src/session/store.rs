//! Concurrent session registry.
//!
//! # Responsibilities
//! - Allocate sessions up to `max_sessions`
//! - Look sessions up by id, refreshing their idle timer
//! - Expire sessions left idle past `idle_timeout_secs`

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time;
use uuid::Uuid;

use crate::config::LabConfig;
use crate::observability::metrics;
use crate::session::{LabSession, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(SessionId),

    #[error("session limit of {0} reached")]
    LimitReached(usize),
}

/// Live sessions keyed by id.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<SessionId, Arc<LabSession>>>,
    config: Arc<LabConfig>,
    // Serializes the capacity check with the insert.
    create_lock: Arc<Mutex<()>>,
}

impl SessionStore {
    pub fn new(config: Arc<LabConfig>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            config,
            create_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Start a session with fresh engines.
    pub fn create(&self) -> Result<Arc<LabSession>, SessionError> {
        let max = self.config.sessions.max_sessions;
        let _guard = self.create_lock.lock().expect("session create mutex poisoned");
        if self.inner.len() >= max {
            tracing::warn!(max_sessions = max, "Session limit reached");
            return Err(SessionError::LimitReached(max));
        }

        let id = Uuid::new_v4();
        let session = Arc::new(LabSession::new(id, &self.config));
        self.inner.insert(id, Arc::clone(&session));
        metrics::set_active_sessions(self.inner.len());
        tracing::info!(session = %id, "Session created");
        Ok(session)
    }

    /// Look up a live session and mark it as used.
    pub fn get(&self, id: &SessionId) -> Result<Arc<LabSession>, SessionError> {
        let session = self
            .inner
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(SessionError::NotFound(*id))?;
        session.touch();
        Ok(session)
    }

    /// End a session. Its timers are cancelled once in-flight requests release it.
    pub fn end(&self, id: &SessionId) -> Result<(), SessionError> {
        self.inner.remove(id).ok_or(SessionError::NotFound(*id))?;
        metrics::set_active_sessions(self.inner.len());
        tracing::info!(session = %id, "Session ended");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Remove sessions idle for at least `idle_timeout_secs`. Returns how many expired.
    pub fn sweep_idle(&self) -> usize {
        let timeout_secs = self.config.sessions.idle_timeout_secs;
        if timeout_secs == 0 {
            return 0;
        }
        let timeout = Duration::from_secs(timeout_secs);

        let mut expired = 0;
        self.inner.retain(|id, session| {
            let keep = session.idle_for() < timeout;
            if !keep {
                tracing::info!(session = %id, "Session expired after idle timeout");
                expired += 1;
            }
            keep
        });

        if expired > 0 {
            metrics::set_active_sessions(self.inner.len());
        }
        expired
    }

    /// Periodically expire idle sessions until `shutdown` fires.
    pub async fn run_sweeper(self, mut shutdown: broadcast::Receiver<()>) {
        let sessions = &self.config.sessions;
        if sessions.idle_timeout_secs == 0 {
            tracing::info!("Session idle expiry disabled");
            return;
        }

        tracing::info!(
            idle_timeout_secs = sessions.idle_timeout_secs,
            interval_secs = sessions.sweep_interval_secs,
            "Session sweeper starting"
        );

        let mut ticker = time::interval(Duration::from_secs(sessions.sweep_interval_secs));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let expired = self.sweep_idle();
                    if expired > 0 {
                        tracing::debug!(expired, remaining = self.inner.len(), "Idle sweep finished");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Session sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Drop every session, e.g. on shutdown.
    pub fn clear(&self) {
        self.inner.clear();
        metrics::set_active_sessions(0);
    }
}
