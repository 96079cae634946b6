use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::info;

use super::TtsSession;
use crate::request::DestinationId;
use crate::tts::TextToSpeech;

/// Process-wide map of live sessions. A session is created by the first
/// speech request for a destination and removed when the bot leaves the
/// destination's voice channel.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<DestinationId, Arc<TtsSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DestinationId, Arc<TtsSession>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, destination: DestinationId) -> Option<Arc<TtsSession>> {
        self.lock().get(&destination).cloned()
    }

    /// Creates a session bound to `engine`, replacing any existing one.
    pub fn create(
        &self,
        destination: DestinationId,
        engine_name: &str,
        engine: Arc<dyn TextToSpeech>,
        synthesis_timeout: Duration,
    ) -> Arc<TtsSession> {
        let session = Arc::new(TtsSession::new(
            destination,
            engine_name,
            engine,
            synthesis_timeout,
        ));
        self.lock().insert(destination, session.clone());
        info!(%destination, engine = engine_name, "Created speech session");
        session
    }

    /// Returns the existing session or creates one with `make`. Concurrent
    /// callers for the same destination always end up with the same session.
    pub fn get_or_create<F>(&self, destination: DestinationId, make: F) -> Arc<TtsSession>
    where
        F: FnOnce() -> TtsSession,
    {
        let mut sessions = self.lock();
        sessions
            .entry(destination)
            .or_insert_with(|| {
                let session = make();
                info!(%destination, engine = session.engine_name(), "Created speech session");
                Arc::new(session)
            })
            .clone()
    }

    pub fn remove(&self, destination: DestinationId) -> Option<Arc<TtsSession>> {
        let removed = self.lock().remove(&destination);
        if removed.is_some() {
            info!(%destination, "Removed speech session");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::mock::{MockTts, MockTtsBehavior};

    fn engine() -> Arc<dyn TextToSpeech> {
        Arc::new(MockTts::new(MockTtsBehavior::Success))
    }

    #[test]
    fn test_create_get_remove() {
        let registry = SessionRegistry::new();
        let dest = DestinationId(42);
        assert!(registry.get(dest).is_none());

        let created = registry.create(dest, "mock", engine(), Duration::from_secs(1));

        let fetched = registry.get(dest).unwrap();
        assert!(Arc::ptr_eq(&created, &fetched));
        assert_eq!(fetched.engine_name(), "mock");
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(dest).is_some());
        assert!(registry.remove(dest).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_get_or_create_reuses_existing() {
        let registry = SessionRegistry::new();
        let dest = DestinationId(42);
        let make = || TtsSession::new(dest, "mock", engine(), Duration::from_secs(1));

        let first = registry.get_or_create(dest, make);
        let second = registry.get_or_create(dest, || panic!("must not build a second session"));

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_sessions_are_per_destination() {
        let registry = SessionRegistry::new();
        let a = registry.create(DestinationId(1), "mock", engine(), Duration::from_secs(1));
        let b = registry.create(DestinationId(2), "other", engine(), Duration::from_secs(1));

        a.enqueue(crate::request::Speaker::new(1, "a"), "hi".to_string());

        assert_eq!(a.pending(), 1);
        assert_eq!(b.pending(), 0);
        assert_eq!(registry.len(), 2);
    }
}
