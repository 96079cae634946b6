//! Turns a `say` request into speech in the caller's voice channel.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::i18n::Localizer;
use crate::normalize::{normalize, NormalizeOptions, RenderContext};
use crate::reply::Reply;
use crate::report::ErrorReporter;
use crate::request::CommandRequest;
use crate::session::{SessionRegistry, TtsSession};
use crate::settings::{Settings, SettingsManager};
use crate::tts::{EngineSet, TtsError};
use crate::voice::{join_caller, ConnectionHandle, VoiceError, VoiceManager};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Speech synthesis failed: {0}")]
    Tts(TtsError),

    #[error("Voice playback failed: {0}")]
    Voice(VoiceError),
}

impl From<TtsError> for DispatchError {
    fn from(e: TtsError) -> Self {
        Self::Tts(e)
    }
}

impl From<VoiceError> for DispatchError {
    fn from(e: VoiceError) -> Self {
        Self::Voice(e)
    }
}

pub struct SpeakDispatcher {
    settings: SettingsManager,
    localizer: Arc<dyn Localizer>,
    voice: Arc<dyn VoiceManager>,
    sessions: Arc<SessionRegistry>,
    engines: Arc<EngineSet>,
    reporter: Arc<dyn ErrorReporter>,
}

impl SpeakDispatcher {
    pub fn new(
        settings: SettingsManager,
        localizer: Arc<dyn Localizer>,
        voice: Arc<dyn VoiceManager>,
        sessions: Arc<SessionRegistry>,
        engines: Arc<EngineSet>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            settings,
            localizer,
            voice,
            sessions,
            engines,
            reporter,
        }
    }

    /// Speaks `text` for the requesting user.
    ///
    /// Joins the caller's voice channel when the destination has no
    /// connection yet; if that fails the join reply is the only reply and
    /// nothing is queued. Otherwise the reply starts with the localized echo
    /// of the text and, if anything fails later on, ends with one generic
    /// error carrying a correlation token.
    pub async fn dispatch(
        &self,
        request: &CommandRequest,
        render: &dyn RenderContext,
        text: &str,
    ) -> Vec<Reply> {
        let handle = match self.voice.connection(request.destination) {
            Some(handle) => handle,
            None => match join_caller(&*self.voice, &*self.localizer, request).await {
                Ok(handle) => handle,
                Err(reply) => return vec![reply],
            },
        };

        let mut replies = vec![Reply::info(self.localizer.format(
            &request.locale,
            "tts.speak.text",
            &[&request.user, &text],
        ))];

        let settings = self.settings.settings();
        if let Err(e) = self.speak(request, &handle, render, text, &settings).await {
            replies.push(self.failure_reply(request, e).await);
        }

        replies
    }

    async fn speak(
        &self,
        request: &CommandRequest,
        handle: &ConnectionHandle,
        render: &dyn RenderContext,
        text: &str,
        settings: &Settings,
    ) -> Result<(), DispatchError> {
        let session = match self.session_for(request, settings) {
            Ok(session) => session,
            Err(e) => {
                error!(destination = %request.destination, original = text, error = %e, "No speech session");
                return Err(e.into());
            }
        };

        let options = NormalizeOptions::for_locale(
            &*self.localizer,
            &request.locale,
            settings.tts.mention_fallback,
        );
        let normalized = normalize(text, render, &options).await;
        debug!(
            destination = %request.destination,
            original = text,
            normalized = %normalized,
            "Normalized speech"
        );

        session.enqueue(request.user.clone(), normalized.clone());

        let result = self
            .drain(&session, handle, settings.voice.playback_timeout())
            .await;
        if let Err(e) = &result {
            error!(
                destination = %request.destination,
                original = text,
                normalized = %normalized,
                error = %e,
                "Speech dispatch failed"
            );
        }
        result
    }

    fn session_for(
        &self,
        request: &CommandRequest,
        settings: &Settings,
    ) -> Result<Arc<TtsSession>, TtsError> {
        if let Some(session) = self.sessions.get(request.destination) {
            return Ok(session);
        }

        let engine_name = &settings.tts.default_engine;
        let engine = self.engines.get(engine_name)?;
        let timeout = settings.tts.synthesis_timeout();
        Ok(self.sessions.get_or_create(request.destination, || {
            TtsSession::new(request.destination, engine_name, engine, timeout)
        }))
    }

    /// Runs a synthesis pass if the session is idle and plays what it
    /// produced. Returns straight away when another dispatch is already
    /// draining the session.
    ///
    /// Every segment of the pass gets its turn even when an earlier one
    /// failed to synthesize or play; the first error is returned afterwards.
    async fn drain(
        &self,
        session: &TtsSession,
        handle: &ConnectionHandle,
        playback_timeout: Duration,
    ) -> Result<(), DispatchError> {
        let Some(mut audio) = session.synthesize().await else {
            return Ok(());
        };
        let mut failure = audio.failure.take().map(DispatchError::from);

        for segment in &audio.segments {
            let played = tokio::time::timeout(playback_timeout, self.voice.play(handle, segment))
                .await
                .map_err(|_| VoiceError::Timeout(playback_timeout))
                .and_then(|played| played);
            if let Err(e) = played {
                warn!(
                    destination = %session.destination(),
                    speaker = %segment.speaker,
                    error = %e,
                    "Segment playback failed"
                );
                failure.get_or_insert(e.into());
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn failure_reply(&self, request: &CommandRequest, err: DispatchError) -> Reply {
        let token = self
            .reporter
            .report(&anyhow::Error::new(err), request.user.id)
            .await;
        Reply::error(
            self.localizer
                .format(&request.locale, "error.generic", &[&token]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::StringTable;
    use crate::normalize::StaticRenderContext;
    use crate::report::RecordingReporter;
    use crate::request::{DestinationId, Speaker};
    use crate::tts::mock::{MockTts, MockTtsBehavior};
    use crate::voice::MemoryVoice;
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        dispatcher: SpeakDispatcher,
        voice: MemoryVoice,
        tts: MockTts,
        sessions: Arc<SessionRegistry>,
        reporter: RecordingReporter,
    }

    fn harness(behavior: MockTtsBehavior) -> Harness {
        let dir = TempDir::new().unwrap();
        let settings = SettingsManager::from_path(dir.path().join("settings.toml")).unwrap();
        let engines = Arc::new(EngineSet::new(settings.clone()));
        let tts = MockTts::new(behavior);
        engines.insert("mock", Arc::new(tts.clone()));

        let voice = MemoryVoice::new();
        let sessions = Arc::new(SessionRegistry::new());
        let reporter = RecordingReporter::new();
        let dispatcher = SpeakDispatcher::new(
            settings,
            Arc::new(StringTable::builtin("en-US").unwrap()),
            Arc::new(voice.clone()),
            sessions.clone(),
            engines,
            Arc::new(reporter.clone()),
        );

        Harness {
            _dir: dir,
            dispatcher,
            voice,
            tts,
            sessions,
            reporter,
        }
    }

    fn request() -> CommandRequest {
        CommandRequest::new(Speaker::new(1, "Sam"), 10, "en-US").in_voice_channel(20)
    }

    #[tokio::test]
    async fn test_dispatch_echoes_and_plays() {
        let h = harness(MockTtsBehavior::Success);

        let replies = h
            .dispatcher
            .dispatch(&request(), &StaticRenderContext::new(), "fish & chips")
            .await;

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].content, "Sam said: fish & chips");
        assert_eq!(h.voice.played_texts(), vec!["fish  and  chips"]);
        assert!(h.sessions.get(DestinationId(10)).is_some());
    }

    #[tokio::test]
    async fn test_join_failure_is_the_only_reply() {
        let h = harness(MockTtsBehavior::Success);
        let lonely = CommandRequest::new(Speaker::new(1, "Sam"), 10, "en-US");

        let replies = h
            .dispatcher
            .dispatch(&lonely, &StaticRenderContext::new(), "hello")
            .await;

        assert_eq!(replies.len(), 1);
        assert!(replies[0].is_error());
        assert_eq!(replies[0].content, "You need to be in a voice channel first.");
        assert!(h.sessions.is_empty());
        assert_eq!(h.tts.call_count(), 0);
    }

    #[tokio::test]
    async fn test_playback_failure_is_reported() {
        let h = harness(MockTtsBehavior::Success);
        h.voice.fail_plays(true);

        let replies = h
            .dispatcher
            .dispatch(&request(), &StaticRenderContext::new(), "hello")
            .await;

        assert_eq!(replies.len(), 2);
        let reports = h.reporter.reports();
        assert_eq!(reports.len(), 1);
        assert!(replies[1].content.contains(reports[0].token.as_str()));
        assert!(reports[0].message.starts_with("Voice playback failed"));
        assert!(!h.sessions.get(DestinationId(10)).unwrap().is_busy());
    }

    #[tokio::test]
    async fn test_failed_segment_does_not_stop_playback() {
        let h = harness(MockTtsBehavior::Delayed { millis: 20 });
        h.voice.fail_play_of("second");
        let render = StaticRenderContext::new();

        let (r1, r2, r3) = (request(), request(), request());
        let (a, b, c) = tokio::join!(
            h.dispatcher.dispatch(&r1, &render, "first"),
            h.dispatcher.dispatch(&r2, &render, "second"),
            h.dispatcher.dispatch(&r3, &render, "third"),
        );

        assert_eq!(h.voice.played_texts(), vec!["first", "third"]);
        assert_eq!(a.len(), 2);
        assert!(a[1].is_error());
        assert_eq!(b.len(), 1);
        assert_eq!(c.len(), 1);
        assert_eq!(h.reporter.reports().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_default_engine_is_reported() {
        let h = harness(MockTtsBehavior::Success);
        h.dispatcher
            .settings
            .update_setting(|s| s.tts.default_engine = "missing".to_string());

        let replies = h
            .dispatcher
            .dispatch(&request(), &StaticRenderContext::new(), "hello")
            .await;

        assert_eq!(replies.len(), 2);
        assert!(replies[1].is_error());
        assert!(h.reporter.reports()[0].message.contains("missing"));
        assert!(h.sessions.is_empty());
    }
}
