use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{ConnectionHandle, VoiceError, VoiceManager};
use crate::request::{CommandRequest, DestinationId};
use crate::session::AudioSegment;

/// A segment as it reached a connection.
#[derive(Debug, Clone)]
pub struct PlayedSegment {
    pub handle: ConnectionHandle,
    pub segment: AudioSegment,
}

#[derive(Default)]
struct Inner {
    connections: HashMap<DestinationId, ConnectionHandle>,
    played: Vec<PlayedSegment>,
    join_attempts: usize,
    fail_joins: bool,
    fail_plays: bool,
    failing_texts: Vec<String>,
    play_delay: Duration,
}

/// Voice manager that keeps connections in memory and records every played
/// segment instead of sending it anywhere. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryVoice {
    inner: Arc<Mutex<Inner>>,
    /// Held for the duration of one `play` so overlapping playback on the
    /// same manager would be observable.
    playing: Arc<tokio::sync::Mutex<()>>,
}

impl MemoryVoice {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fail_joins(&self, fail: bool) {
        self.lock().fail_joins = fail;
    }

    pub fn fail_plays(&self, fail: bool) {
        self.lock().fail_plays = fail;
    }

    /// Fail playback of any segment whose text is `text`
    pub fn fail_play_of(&self, text: &str) {
        self.lock().failing_texts.push(text.to_string());
    }

    /// Simulated playback time per segment
    pub fn set_play_delay(&self, delay: Duration) {
        self.lock().play_delay = delay;
    }

    pub fn played(&self) -> Vec<PlayedSegment> {
        self.lock().played.clone()
    }

    pub fn played_texts(&self) -> Vec<String> {
        self.lock()
            .played
            .iter()
            .map(|p| p.segment.text.clone())
            .collect()
    }

    pub fn join_attempts(&self) -> usize {
        self.lock().join_attempts
    }
}

#[async_trait]
impl VoiceManager for MemoryVoice {
    fn connection(&self, destination: DestinationId) -> Option<ConnectionHandle> {
        self.lock().connections.get(&destination).cloned()
    }

    async fn join(&self, request: &CommandRequest) -> Result<ConnectionHandle, VoiceError> {
        let mut inner = self.lock();
        inner.join_attempts += 1;

        let channel = request.voice_channel.ok_or(VoiceError::NotInVoiceChannel)?;
        if inner.fail_joins {
            return Err(VoiceError::Join {
                channel,
                error: anyhow::anyhow!("voice gateway refused the connection"),
            });
        }

        let handle = inner
            .connections
            .entry(request.destination)
            .or_insert(ConnectionHandle {
                destination: request.destination,
                channel,
            })
            .clone();
        Ok(handle)
    }

    async fn play(
        &self,
        handle: &ConnectionHandle,
        segment: &AudioSegment,
    ) -> Result<(), VoiceError> {
        let _playing = self
            .playing
            .try_lock()
            .map_err(|_| VoiceError::Playback(anyhow::anyhow!("overlapping playback")))?;

        let delay = {
            let inner = self.lock();
            if !inner.connections.contains_key(&handle.destination) {
                return Err(VoiceError::NotConnected(handle.destination));
            }
            if inner.fail_plays || inner.failing_texts.contains(&segment.text) {
                return Err(VoiceError::Playback(anyhow::anyhow!("audio device lost")));
            }
            inner.play_delay
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.lock().played.push(PlayedSegment {
            handle: handle.clone(),
            segment: segment.clone(),
        });
        Ok(())
    }

    async fn leave(&self, destination: DestinationId) -> Result<bool, VoiceError> {
        Ok(self.lock().connections.remove(&destination).is_some())
    }
}
