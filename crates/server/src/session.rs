//! Session Management
//!
//! In-memory sessions, each owning one assistant and its conversation.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

use avatar_assistant_agent::AvatarAssistant;
use avatar_assistant_config::SessionConfig;
use avatar_assistant_pipeline::sweep_expired_audio;

use crate::ServerError;

/// Session
pub struct Session {
    /// Session ID
    pub id: String,
    /// Assistant instance
    pub assistant: Arc<AvatarAssistant>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last activity
    last_activity: RwLock<Instant>,
    active: RwLock<bool>,
}

impl Session {
    pub fn new(id: impl Into<String>, assistant: AvatarAssistant) -> Self {
        Self {
            id: id.into(),
            assistant: Arc::new(assistant),
            created_at: Utc::now(),
            last_activity: RwLock::new(Instant::now()),
            active: RwLock::new(true),
        }
    }

    /// Update last activity
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    /// Check if session is expired
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }

    pub fn close(&self) {
        *self.active.write() = false;
    }

    pub fn is_active(&self) -> bool {
        *self.active.read()
    }
}

/// Session manager
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    max_sessions: usize,
    session_timeout: Duration,
    cleanup_interval: Duration,
    /// Audio directory swept on each cleanup tick, with the file age limit
    audio_retention: Option<(PathBuf, Duration)>,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(max_sessions: usize) -> Self {
        Self::with_config(
            max_sessions,
            Duration::from_secs(3600),
            Duration::from_secs(300),
        )
    }

    /// Create a new session manager with custom timeout and cleanup interval
    pub fn with_config(
        max_sessions: usize,
        session_timeout: Duration,
        cleanup_interval: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            session_timeout,
            cleanup_interval,
            audio_retention: None,
        }
    }

    /// Also delete synthesized audio in `dir` older than `max_age` on each
    /// cleanup tick
    pub fn with_audio_retention(mut self, dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        self.audio_retention = Some((dir.into(), max_age));
        self
    }

    pub fn from_settings(settings: &SessionConfig) -> Self {
        Self::with_config(
            settings.max_sessions,
            Duration::from_secs(settings.timeout_seconds),
            Duration::from_secs(settings.cleanup_interval_seconds),
        )
    }

    /// Start a background task that periodically removes expired sessions
    /// and, when configured, expired audio files.
    ///
    /// Send `true` on the returned channel to stop it.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = manager.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = manager.cleanup_expired();
                        if removed > 0 {
                            tracing::info!(
                                removed,
                                remaining = manager.count(),
                                "Session cleanup removed expired sessions"
                            );
                        }
                        manager.sweep_audio().await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    async fn sweep_audio(&self) {
        let Some((dir, max_age)) = &self.audio_retention else {
            return;
        };

        match sweep_expired_audio(dir, *max_age).await {
            Ok(0) => {}
            Ok(removed) => {
                tracing::info!(removed, path = %dir.display(), "Removed expired audio files");
            }
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Audio sweep failed");
            }
        }
    }

    /// Register a new session around `assistant`
    pub fn create(&self, assistant: AvatarAssistant) -> Result<Arc<Session>, ServerError> {
        let mut sessions = self.sessions.write();

        if sessions.len() >= self.max_sessions {
            self.cleanup_expired_internal(&mut sessions);

            if sessions.len() >= self.max_sessions {
                return Err(ServerError::SessionLimit);
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(&id, assistant));
        sessions.insert(id.clone(), session.clone());

        tracing::info!(session_id = %id, "Created session");

        Ok(session)
    }

    /// Get a session by ID
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    /// Remove a session, returning whether it existed
    pub fn remove(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write();
        match sessions.remove(id) {
            Some(session) => {
                session.close();
                tracing::info!(session_id = %id, "Removed session");
                true
            }
            None => false,
        }
    }

    /// Active session count
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Remove expired sessions, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        self.cleanup_expired_internal(&mut sessions)
    }

    fn cleanup_expired_internal(&self, sessions: &mut HashMap<String, Arc<Session>>) -> usize {
        let timeout = self.session_timeout;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.is_expired(timeout))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            if let Some(session) = sessions.remove(id) {
                session.close();
                tracing::info!(session_id = %id, "Expired session");
            }
        }

        expired.len()
    }

    /// List all session IDs
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_assistant_agent::{AssistantBackends, AssistantConfig, AssistantProfile};
    use avatar_assistant_config::Settings;
    use avatar_assistant_rag::KnowledgeBase;

    fn assistant() -> AvatarAssistant {
        let backends = AssistantBackends::from_settings(&Settings::default()).unwrap();
        AvatarAssistant::new(
            AssistantConfig::default(),
            backends,
            AssistantProfile::default(),
            Arc::new(KnowledgeBase::empty()),
        )
    }

    #[test]
    fn test_session_creation() {
        let manager = SessionManager::new(10);
        let session = manager.create(assistant()).unwrap();

        assert!(session.is_active());
        assert!(!session.is_expired(Duration::from_secs(60)));
        assert_eq!(manager.get(&session.id).unwrap().id, session.id);
    }

    #[test]
    fn test_session_remove() {
        let manager = SessionManager::new(10);
        let session = manager.create(assistant()).unwrap();
        let id = session.id.clone();

        assert!(manager.remove(&id));
        assert!(!session.is_active());
        assert!(manager.get(&id).is_none());
        assert!(!manager.remove(&id));
    }

    #[test]
    fn test_capacity_limit() {
        let manager = SessionManager::new(1);
        manager.create(assistant()).unwrap();

        assert!(matches!(
            manager.create(assistant()),
            Err(ServerError::SessionLimit)
        ));
    }

    #[test]
    fn test_expired_sessions_are_evicted_at_capacity() {
        let manager = SessionManager::with_config(1, Duration::ZERO, Duration::from_secs(60));
        let first = manager.create(assistant()).unwrap();
        std::thread::sleep(Duration::from_millis(5));

        let second = manager.create(assistant()).unwrap();

        assert!(!first.is_active());
        assert_eq!(manager.list(), vec![second.id.clone()]);
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_on_shutdown() {
        let manager = Arc::new(SessionManager::with_config(
            10,
            Duration::ZERO,
            Duration::from_millis(10),
        ));
        manager.create(assistant()).unwrap();

        let shutdown = manager.start_cleanup_task();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(manager.count(), 0);

        shutdown.send(true).unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_task_sweeps_expired_audio() {
        let audio_dir = tempfile::tempdir().unwrap();
        let stale = audio_dir.path().join("speech_20240101_000000_000_deadbeef.mp3");
        let unrelated = audio_dir.path().join("readme.txt");
        std::fs::write(&stale, b"ID3").unwrap();
        std::fs::write(&unrelated, b"keep").unwrap();

        let manager = Arc::new(
            SessionManager::with_config(10, Duration::from_secs(3600), Duration::from_millis(10))
                .with_audio_retention(audio_dir.path(), Duration::ZERO),
        );
        let session = manager.create(assistant()).unwrap();

        let shutdown = manager.start_cleanup_task();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!stale.exists());
        assert!(unrelated.exists());
        assert!(manager.get(&session.id).is_some());

        shutdown.send(true).unwrap();
    }
}
