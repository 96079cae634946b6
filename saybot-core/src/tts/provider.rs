use async_trait::async_trait;

use super::error::TtsError;
use super::types::{AudioData, Voice};

/// Trait for text-to-speech engines
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// The voice `synthesize` speaks with, as configured for this engine
    fn default_voice(&self) -> Voice;

    /// Synthesize text to speech audio
    async fn synthesize(&self, text: &str) -> Result<AudioData, TtsError>;

    /// List available voices
    async fn list_voices(&self) -> Result<Vec<Voice>, TtsError>;
}
