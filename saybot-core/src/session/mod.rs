//! Per-destination speech queues.
//!
//! A session owns the messages waiting to be spoken at one destination and a
//! busy flag that lets only one synthesis pass run at a time. Both live behind
//! the same lock, so "queue is empty, go idle" and "append, was it idle?" can
//! never interleave and strand an entry.

pub mod registry;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use crate::request::{DestinationId, Speaker};
use crate::tts::{AudioData, TextToSpeech, TtsError};

pub use registry::SessionRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// Synthesized speech for one queue entry.
#[derive(Debug, Clone)]
pub struct AudioSegment {
    pub speaker: Speaker,
    pub text: String,
    pub audio: AudioData,
}

/// The output of one synthesis pass. Holds the session's playback permit:
/// segments of a later pass cannot be played until this value is dropped.
pub struct SynthesizedAudio {
    pub segments: Vec<AudioSegment>,
    /// First error of the pass. Entries that failed are not in `segments`.
    pub failure: Option<TtsError>,
    _playback: OwnedMutexGuard<()>,
}

impl SynthesizedAudio {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[derive(Default)]
struct QueueState {
    queue: VecDeque<QueueEntry>,
    busy: bool,
}

pub struct TtsSession {
    destination: DestinationId,
    engine_name: String,
    engine: Arc<dyn TextToSpeech>,
    synthesis_timeout: Duration,
    state: Mutex<QueueState>,
    playback: Arc<tokio::sync::Mutex<()>>,
}

/// Marks the session busy for the lifetime of a pass; dropping it on any exit
/// path other than an orderly release returns the session to idle.
struct BusyClaim<'a> {
    session: &'a TtsSession,
    armed: bool,
}

impl Drop for BusyClaim<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.session.lock_state().busy = false;
        }
    }
}

impl TtsSession {
    pub fn new(
        destination: DestinationId,
        engine_name: &str,
        engine: Arc<dyn TextToSpeech>,
        synthesis_timeout: Duration,
    ) -> Self {
        Self {
            destination,
            engine_name: engine_name.to_string(),
            engine,
            synthesis_timeout,
            state: Mutex::new(QueueState::default()),
            playback: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn destination(&self) -> DestinationId {
        self.destination
    }

    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enqueue(&self, speaker: Speaker, text: String) {
        let mut state = self.lock_state();
        state.queue.push_back(QueueEntry { speaker, text });
        debug!(destination = %self.destination, pending = state.queue.len(), "Queued speech");
    }

    pub fn is_busy(&self) -> bool {
        self.lock_state().busy
    }

    pub fn pending(&self) -> usize {
        self.lock_state().queue.len()
    }

    fn claim(&self) -> Option<BusyClaim<'_>> {
        let mut state = self.lock_state();
        if state.busy {
            return None;
        }
        state.busy = true;
        Some(BusyClaim {
            session: self,
            armed: true,
        })
    }

    /// Runs a synthesis pass if the session is idle.
    ///
    /// Returns `None` without waiting when another pass is in flight; that
    /// pass keeps draining until the queue is empty, so anything queued before
    /// this call is spoken by it. Otherwise drains the queue, synthesizing
    /// entries in order, and returns once the queue is empty and the session
    /// is idle again. The playback permit is taken before going idle, which
    /// keeps playback order equal to enqueue order across passes.
    ///
    /// An entry that fails to synthesize is dropped without retry and the
    /// pass moves on to the next one; the first error is kept in
    /// [`SynthesizedAudio::failure`].
    pub async fn synthesize(&self) -> Option<SynthesizedAudio> {
        let Some(mut claim) = self.claim() else {
            debug!(destination = %self.destination, "Synthesis already in progress");
            return None;
        };

        let mut segments = Vec::new();
        let mut failure = None;
        let mut permit: Option<OwnedMutexGuard<()>> = None;

        let permit = loop {
            let batch = {
                let mut state = self.lock_state();
                if state.queue.is_empty() {
                    if let Some(permit) = permit.take() {
                        state.busy = false;
                        claim.armed = false;
                        break permit;
                    }
                    None
                } else {
                    Some(state.queue.drain(..).collect::<Vec<_>>())
                }
            };

            match batch {
                Some(entries) => {
                    for entry in entries {
                        let speaker = entry.speaker.clone();
                        match self.render(entry).await {
                            Ok(Some(segment)) => segments.push(segment),
                            Ok(None) => {}
                            Err(e) => {
                                warn!(
                                    destination = %self.destination,
                                    speaker = %speaker,
                                    error = %e,
                                    "Dropping entry that failed to synthesize"
                                );
                                failure.get_or_insert(e);
                            }
                        }
                    }
                }
                None => permit = Some(self.playback.clone().lock_owned().await),
            }
        };

        info!(
            destination = %self.destination,
            engine = %self.engine_name,
            segments = segments.len(),
            failed = failure.is_some(),
            "Synthesis pass complete"
        );

        Some(SynthesizedAudio {
            segments,
            failure,
            _playback: permit,
        })
    }

    async fn render(&self, entry: QueueEntry) -> Result<Option<AudioSegment>, TtsError> {
        if entry.text.trim().is_empty() {
            debug!(destination = %self.destination, speaker = %entry.speaker, "Skipping blank entry");
            return Ok(None);
        }

        let audio = tokio::time::timeout(
            self.synthesis_timeout,
            self.engine.synthesize(&entry.text),
        )
        .await
        .map_err(|_| TtsError::Timeout(self.synthesis_timeout))??;

        Ok(Some(AudioSegment {
            speaker: entry.speaker,
            text: entry.text,
            audio,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::mock::{MockTts, MockTtsBehavior};

    fn session(behavior: MockTtsBehavior) -> (Arc<TtsSession>, MockTts) {
        let tts = MockTts::new(behavior);
        let session = TtsSession::new(
            DestinationId(1),
            "mock",
            Arc::new(tts.clone()),
            Duration::from_secs(5),
        );
        (Arc::new(session), tts)
    }

    fn speaker() -> Speaker {
        Speaker::new(7, "Sam")
    }

    fn texts(audio: &SynthesizedAudio) -> Vec<&str> {
        audio.segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[tokio::test]
    async fn test_synthesize_drains_in_order() {
        let (session, tts) = session(MockTtsBehavior::Success);
        session.enqueue(speaker(), "one".to_string());
        session.enqueue(speaker(), "two".to_string());
        session.enqueue(speaker(), "three".to_string());

        let audio = session.synthesize().await.unwrap();

        assert_eq!(texts(&audio), vec!["one", "two", "three"]);
        assert_eq!(tts.calls(), vec!["one", "two", "three"]);
        assert!(!session.is_busy());
        assert_eq!(session.pending(), 0);
    }

    #[tokio::test]
    async fn test_empty_queue_yields_empty_pass() {
        let (session, tts) = session(MockTtsBehavior::Success);

        let audio = session.synthesize().await.unwrap();

        assert!(audio.is_empty());
        assert_eq!(tts.call_count(), 0);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_blank_entries_are_skipped() {
        let (session, tts) = session(MockTtsBehavior::Success);
        session.enqueue(speaker(), "   ".to_string());
        session.enqueue(speaker(), "real".to_string());

        let audio = session.synthesize().await.unwrap();

        assert_eq!(texts(&audio), vec!["real"]);
        assert_eq!(tts.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_leaves_session_idle() {
        let (session, _tts) = session(MockTtsBehavior::AlwaysError);
        session.enqueue(speaker(), "doomed".to_string());

        let audio = session.synthesize().await.unwrap();
        assert!(audio.is_empty());
        assert!(audio.failure.is_some());
        assert!(!session.is_busy());

        // The next pass runs normally
        session.enqueue(speaker(), "again".to_string());
        assert!(session.synthesize().await.unwrap().failure.is_some());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_failed_entry_does_not_stop_the_pass() {
        let (session, tts) = session(MockTtsBehavior::ErrorOnCall { call: 2 });
        session.enqueue(speaker(), "one".to_string());
        session.enqueue(speaker(), "two".to_string());
        session.enqueue(speaker(), "three".to_string());

        let audio = session.synthesize().await.unwrap();

        assert_eq!(texts(&audio), vec!["one", "three"]);
        assert!(matches!(audio.failure, Some(TtsError::Engine(_))));
        assert_eq!(tts.call_count(), 3);
        assert_eq!(session.pending(), 0);
    }

    #[tokio::test]
    async fn test_entries_queued_during_a_failing_call_are_synthesized() {
        let (session, tts) = session(MockTtsBehavior::DelayedErrorOnCall {
            call: 1,
            millis: 50,
        });
        session.enqueue(speaker(), "first".to_string());

        let runner = session.clone();
        let pass = tokio::spawn(async move { runner.synthesize().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        session.enqueue(speaker(), "second".to_string());
        assert!(session.synthesize().await.is_none());

        let audio = pass.await.unwrap().unwrap();
        assert_eq!(texts(&audio), vec!["second"]);
        assert!(audio.failure.is_some());
        assert_eq!(tts.calls(), vec!["first", "second"]);
        assert!(!session.is_busy());
        assert_eq!(session.pending(), 0);
    }

    #[tokio::test]
    async fn test_entries_queued_while_busy_join_the_pass() {
        let (session, tts) = session(MockTtsBehavior::Delayed { millis: 50 });
        session.enqueue(speaker(), "first".to_string());

        let runner = session.clone();
        let pass = tokio::spawn(async move { runner.synthesize().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(session.is_busy());
        for text in ["second", "third", "fourth"] {
            session.enqueue(speaker(), text.to_string());
            assert!(session.synthesize().await.is_none());
        }

        let audio = pass.await.unwrap().unwrap();
        assert_eq!(texts(&audio), vec!["first", "second", "third", "fourth"]);
        assert_eq!(tts.call_count(), 4);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let tts = MockTts::new(MockTtsBehavior::Delayed { millis: 500 });
        let session = TtsSession::new(
            DestinationId(1),
            "mock",
            Arc::new(tts),
            Duration::from_millis(20),
        );
        session.enqueue(speaker(), "slow".to_string());

        let audio = session.synthesize().await.unwrap();
        assert!(matches!(audio.failure, Some(TtsError::Timeout(_))));
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_later_pass_waits_for_earlier_playback() {
        let (session, _tts) = session(MockTtsBehavior::Success);
        session.enqueue(speaker(), "first".to_string());
        let first = session.synthesize().await.unwrap();

        session.enqueue(speaker(), "second".to_string());
        let runner = session.clone();
        let second = tokio::spawn(async move { runner.synthesize().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!second.is_finished());

        drop(first);
        let second = second.await.unwrap().unwrap();
        assert_eq!(texts(&second), vec!["second"]);
    }
}
