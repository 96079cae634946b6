use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::error::TtsError;
use super::provider::TextToSpeech;
use super::types::{AudioData, Voice};

const MOCK_SAMPLE_RATE: u32 = 16_000;
/// 10ms of silence per character keeps mock audio proportional to the text.
const SAMPLES_PER_CHAR: usize = 160;

/// Mock behavior for the mock engine
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MockTtsBehavior {
    /// Return silent audio sized to the text
    #[default]
    Success,
    /// Always fail
    AlwaysError,
    /// Fail only the Nth call (1-based), succeed otherwise
    ErrorOnCall { call: usize },
    /// Succeed after sleeping, to hold a session busy
    Delayed { millis: u64 },
    /// Sleep on every call, then fail only the Nth (1-based)
    DelayedErrorOnCall { call: usize, millis: u64 },
}

/// Mock text-to-speech engine for tests and offline use. Clones share state.
#[derive(Clone)]
pub struct MockTts {
    behavior: Arc<Mutex<MockTtsBehavior>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockTts {
    pub fn new(behavior: MockTtsBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_behavior(&self, behavior: MockTtsBehavior) {
        *lock(&self.behavior) = behavior;
    }

    /// Texts passed to `synthesize`, in call order
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn silence_for(text: &str) -> AudioData {
    let samples = text.chars().count() * SAMPLES_PER_CHAR;
    AudioData {
        pcm_data: vec![0; samples * 2],
        sample_rate: MOCK_SAMPLE_RATE,
        channels: 1,
    }
}

#[async_trait]
impl TextToSpeech for MockTts {
    fn default_voice(&self) -> Voice {
        Voice {
            id: "mock".to_string(),
            name: "Mock".to_string(),
            language_code: "en-US".to_string(),
        }
    }

    async fn synthesize(&self, text: &str) -> Result<AudioData, TtsError> {
        let call = {
            let mut calls = lock(&self.calls);
            calls.push(text.to_string());
            calls.len()
        };
        let behavior = lock(&self.behavior).clone();

        match behavior {
            MockTtsBehavior::Success => Ok(silence_for(text)),
            MockTtsBehavior::AlwaysError => Err(TtsError::Engine(anyhow::anyhow!(
                "mock engine failure"
            ))),
            MockTtsBehavior::ErrorOnCall { call: failing } if failing == call => Err(
                TtsError::Engine(anyhow::anyhow!("mock engine failure on call {call}")),
            ),
            MockTtsBehavior::ErrorOnCall { .. } => Ok(silence_for(text)),
            MockTtsBehavior::Delayed { millis } => {
                tokio::time::sleep(Duration::from_millis(millis)).await;
                Ok(silence_for(text))
            }
            MockTtsBehavior::DelayedErrorOnCall {
                call: failing,
                millis,
            } => {
                tokio::time::sleep(Duration::from_millis(millis)).await;
                if failing == call {
                    Err(TtsError::Engine(anyhow::anyhow!(
                        "mock engine failure on call {call}"
                    )))
                } else {
                    Ok(silence_for(text))
                }
            }
        }
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, TtsError> {
        Ok(vec![self.default_voice()])
    }
}
