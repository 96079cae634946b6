//! Google Cloud Text-to-Speech engine (WaveNet and friends) over the REST API

use anyhow::anyhow;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::TtsError;
use super::provider::TextToSpeech;
use super::types::{AudioData, Voice};

const API_BASE: &str = "https://texttospeech.googleapis.com/v1";
/// LINEAR16 responses carry a canonical RIFF/WAVE header in front of the PCM.
const WAV_HEADER_LEN: usize = 44;

#[derive(Debug, Clone)]
pub struct GoogleCloudConfig {
    pub api_key: String,
    pub language_code: String,
    pub voice_name: Option<String>,
    pub sample_rate: u32,
}

pub struct GoogleCloudTts {
    config: GoogleCloudConfig,
    client: Client,
}

impl GoogleCloudTts {
    pub fn new(config: GoogleCloudConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    sample_rate_hertz: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<VoiceData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoiceData {
    name: String,
    #[serde(default)]
    language_codes: Vec<String>,
}

fn strip_wav_header(mut bytes: Vec<u8>) -> Vec<u8> {
    if bytes.len() >= WAV_HEADER_LEN && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WAVE" {
        bytes.drain(..WAV_HEADER_LEN);
    }
    bytes
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TtsError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(TtsError::Engine(anyhow!(
        "Google Cloud TTS API error {status}: {body}"
    )))
}

#[async_trait]
impl TextToSpeech for GoogleCloudTts {
    fn default_voice(&self) -> Voice {
        let name = self
            .config
            .voice_name
            .clone()
            .unwrap_or_else(|| format!("{}-Wavenet-A", self.config.language_code));
        Voice {
            id: name.clone(),
            name,
            language_code: self.config.language_code.clone(),
        }
    }

    async fn synthesize(&self, text: &str) -> Result<AudioData, TtsError> {
        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &self.config.language_code,
                name: self.config.voice_name.as_deref(),
            },
            audio_config: AudioConfig {
                audio_encoding: "LINEAR16",
                sample_rate_hertz: self.config.sample_rate,
            },
        };

        let response = self
            .client
            .post(format!("{API_BASE}/text:synthesize"))
            .query(&[("key", &self.config.api_key)])
            .json(&request)
            .send()
            .await?;

        let body: SynthesizeResponse = check_status(response).await?.json().await?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(body.audio_content)
            .map_err(|e| TtsError::Engine(anyhow!("Invalid audioContent: {e}")))?;

        Ok(AudioData {
            pcm_data: strip_wav_header(bytes),
            sample_rate: self.config.sample_rate,
            channels: 1,
        })
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, TtsError> {
        let response = self
            .client
            .get(format!("{API_BASE}/voices"))
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("languageCode", self.config.language_code.as_str()),
            ])
            .send()
            .await?;

        let voices: VoicesResponse = check_status(response).await?.json().await?;

        Ok(voices
            .voices
            .into_iter()
            .map(|v| Voice {
                language_code: v
                    .language_codes
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| self.config.language_code.clone()),
                id: v.name.clone(),
                name: v.name,
            })
            .collect())
    }
}
