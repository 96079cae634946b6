//! Voice connection management as seen by command handlers.

pub mod memory;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::i18n::Localizer;
use crate::reply::Reply;
use crate::request::{ChannelId, CommandRequest, DestinationId};
use crate::session::AudioSegment;

pub use memory::MemoryVoice;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("User is not in a voice channel")]
    NotInVoiceChannel,

    #[error("Failed to join voice channel {channel}: {error:#}")]
    Join {
        channel: ChannelId,
        error: anyhow::Error,
    },

    #[error("Playback failed: {0:#}")]
    Playback(anyhow::Error),

    #[error("Playback timed out after {0:?}")]
    Timeout(Duration),

    #[error("Not connected to a voice channel in {0}")]
    NotConnected(DestinationId),
}

/// An established voice connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionHandle {
    pub destination: DestinationId,
    pub channel: ChannelId,
}

#[async_trait]
pub trait VoiceManager: Send + Sync {
    fn is_connected(&self, destination: DestinationId) -> bool {
        self.connection(destination).is_some()
    }

    fn connection(&self, destination: DestinationId) -> Option<ConnectionHandle>;

    /// Joins the voice channel the requesting user is in. Implementations
    /// deduplicate concurrent joins for the same destination.
    async fn join(&self, request: &CommandRequest) -> Result<ConnectionHandle, VoiceError>;

    /// Plays one segment, resolving once it has finished playing.
    async fn play(
        &self,
        handle: &ConnectionHandle,
        segment: &AudioSegment,
    ) -> Result<(), VoiceError>;

    /// Disconnects. Returns false if there was no connection.
    async fn leave(&self, destination: DestinationId) -> Result<bool, VoiceError>;
}

/// Joins the caller's voice channel and tells them the outcome. A failure
/// comes back as the reply that has to be shown instead.
pub async fn join_caller(
    voice: &dyn VoiceManager,
    localizer: &dyn Localizer,
    request: &CommandRequest,
) -> Result<ConnectionHandle, Reply> {
    match voice.join(request).await {
        Ok(handle) => {
            info!(destination = %handle.destination, channel = %handle.channel, "Joined voice channel");
            Ok(handle)
        }
        Err(VoiceError::NotInVoiceChannel) => Err(Reply::error(
            localizer.text(&request.locale, "voice.join.novoice"),
        )),
        Err(e) => {
            warn!(error = %e, destination = %request.destination, "Voice join failed");
            Err(Reply::error(
                localizer.text(&request.locale, "voice.join.failed"),
            ))
        }
    }
}
