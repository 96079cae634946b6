use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw 16-bit little-endian PCM returned from synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioData {
    pub pcm_data: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    /// Playback length implied by the sample count
    pub fn duration(&self) -> Duration {
        let bytes_per_second = self.sample_rate as u64 * self.channels as u64 * 2;
        if bytes_per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(self.pcm_data.len() as u64 * 1_000_000 / bytes_per_second)
    }

    pub fn is_empty(&self) -> bool {
        self.pcm_data.is_empty()
    }
}

/// Voice configuration for TTS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub language_code: String,
}
