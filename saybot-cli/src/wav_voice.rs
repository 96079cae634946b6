use anyhow::Context;
use async_trait::async_trait;
use saybot_core::request::{CommandRequest, DestinationId};
use saybot_core::session::AudioSegment;
use saybot_core::tts::AudioData;
use saybot_core::voice::{ConnectionHandle, VoiceError, VoiceManager};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

use crate::formatter::Formatter;

/// A voice manager for the console: "playing" a segment writes it to a WAV
/// file under `<out_dir>/<destination>/`.
pub struct WavVoice {
    out_dir: PathBuf,
    connections: Mutex<HashMap<DestinationId, ConnectionHandle>>,
    written: AtomicUsize,
    formatter: Formatter,
}

impl WavVoice {
    pub fn new(out_dir: PathBuf, formatter: Formatter) -> Self {
        Self {
            out_dir,
            connections: Mutex::new(HashMap::new()),
            written: AtomicUsize::new(0),
            formatter,
        }
    }

    fn connections(&self) -> MutexGuard<'_, HashMap<DestinationId, ConnectionHandle>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn destination_dir(&self, destination: DestinationId) -> PathBuf {
        self.out_dir.join(destination.to_string())
    }
}

fn write_wav(path: &Path, audio: &AudioData) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {path:?}"))?;
    for sample in audio.pcm_data.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([sample[0], sample[1]]))?;
    }
    writer.finalize()?;
    Ok(())
}

#[async_trait]
impl VoiceManager for WavVoice {
    fn connection(&self, destination: DestinationId) -> Option<ConnectionHandle> {
        self.connections().get(&destination).cloned()
    }

    async fn join(&self, request: &CommandRequest) -> Result<ConnectionHandle, VoiceError> {
        let channel = request.voice_channel.ok_or(VoiceError::NotInVoiceChannel)?;

        let dir = self.destination_dir(request.destination);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create output directory {dir:?}"))
            .map_err(|error| VoiceError::Join { channel, error })?;

        let handle = self
            .connections()
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
        if !self.connections().contains_key(&handle.destination) {
            return Err(VoiceError::NotConnected(handle.destination));
        }

        let index = self.written.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self
            .destination_dir(handle.destination)
            .join(format!("{index:05}-{}.wav", segment.speaker.id));

        let audio = segment.audio.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_wav(&target, &audio))
            .await
            .map_err(|e| VoiceError::Playback(e.into()))?
            .map_err(VoiceError::Playback)?;

        info!(path = ?path, duration = ?segment.audio.duration(), "Wrote speech segment");
        self.formatter.print_audio(&segment.text, &path);
        Ok(())
    }

    async fn leave(&self, destination: DestinationId) -> Result<bool, VoiceError> {
        Ok(self.connections().remove(&destination).is_some())
    }
}
