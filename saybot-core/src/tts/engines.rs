use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

use super::elevenlabs::{ElevenLabs, ElevenLabsConfig};
use super::error::TtsError;
use super::google_cloud::{GoogleCloudConfig, GoogleCloudTts};
use super::mock::MockTts;
use super::provider::TextToSpeech;
use crate::settings::{SettingsManager, TtsEngineConfig};

/// Builds the engine described by `config`.
pub fn create_engine(config: &TtsEngineConfig) -> Arc<dyn TextToSpeech> {
    match config {
        TtsEngineConfig::Mock { behavior } => Arc::new(MockTts::new(behavior.clone())),
        TtsEngineConfig::GoogleCloud {
            api_key,
            language_code,
            voice_name,
            sample_rate,
        } => Arc::new(GoogleCloudTts::new(GoogleCloudConfig {
            api_key: api_key.clone(),
            language_code: language_code.clone(),
            voice_name: voice_name.clone(),
            sample_rate: *sample_rate,
        })),
        TtsEngineConfig::ElevenLabs {
            api_key,
            voice_id,
            model_id,
        } => {
            let mut config = ElevenLabsConfig::new(api_key.clone());
            if let Some(voice_id) = voice_id {
                config.voice_id = voice_id.clone();
            }
            if let Some(model_id) = model_id {
                config.model_id = model_id.clone();
            }
            Arc::new(ElevenLabs::new(config))
        }
    }
}

/// Named engines, built lazily from settings on first use and then shared by
/// every session bound to the same name.
pub struct EngineSet {
    settings: SettingsManager,
    engines: Mutex<HashMap<String, Arc<dyn TextToSpeech>>>,
}

impl EngineSet {
    pub fn new(settings: SettingsManager) -> Self {
        Self {
            settings,
            engines: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a prebuilt engine under `name`, taking precedence over the
    /// settings.
    pub fn insert(&self, name: &str, engine: Arc<dyn TextToSpeech>) {
        self.engines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), engine);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn TextToSpeech>, TtsError> {
        let mut engines = self.engines.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(engine) = engines.get(name) {
            return Ok(engine.clone());
        }

        let settings = self.settings.settings();
        let config = settings
            .tts
            .engine(name)
            .ok_or_else(|| TtsError::UnknownEngine(name.to_string()))?;

        info!(engine = name, "Creating speech engine");
        let engine = create_engine(config);
        engines.insert(name.to_string(), engine.clone());
        Ok(engine)
    }

    /// Drops cached engines so changed settings take effect.
    pub fn clear(&self) {
        self.engines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
