//! ElevenLabs text-to-speech engine

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::error::TtsError;
use super::provider::TextToSpeech;
use super::types::{AudioData, Voice};

const API_BASE: &str = "https://api.elevenlabs.io/v1";
const SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
}

impl ElevenLabsConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            voice_id: "G3hRJZ8nXEfgXIpKdanG".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
        }
    }
}

pub struct ElevenLabs {
    config: ElevenLabsConfig,
    client: Client,
}

impl ElevenLabs {
    pub fn new(config: ElevenLabsConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[derive(Deserialize)]
struct VoicesResponse {
    voices: Vec<VoiceData>,
}

#[derive(Deserialize)]
struct VoiceData {
    voice_id: String,
    name: String,
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TtsError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(TtsError::Engine(anyhow!("ElevenLabs API error {status}: {body}")))
}

#[async_trait]
impl TextToSpeech for ElevenLabs {
    fn default_voice(&self) -> Voice {
        Voice {
            id: self.config.voice_id.clone(),
            name: "Default".to_string(),
            language_code: "en".to_string(),
        }
    }

    async fn synthesize(&self, text: &str) -> Result<AudioData, TtsError> {
        let url = format!(
            "{API_BASE}/text-to-speech/{}/stream?output_format=pcm_{SAMPLE_RATE}",
            self.config.voice_id
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .json(&SynthesizeRequest {
                text,
                model_id: &self.config.model_id,
            })
            .send()
            .await?;

        let bytes = check_status(response).await?.bytes().await?;

        Ok(AudioData {
            pcm_data: bytes.to_vec(),
            sample_rate: SAMPLE_RATE,
            channels: 1,
        })
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, TtsError> {
        let response = self
            .client
            .get(format!("{API_BASE}/voices"))
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await?;

        let voices: VoicesResponse = check_status(response).await?.json().await?;

        Ok(voices
            .voices
            .into_iter()
            .map(|v| Voice {
                id: v.voice_id,
                name: v.name,
                language_code: "en".to_string(),
            })
            .collect())
    }
}
