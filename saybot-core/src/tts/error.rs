use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("Speech engine error: {0:#}")]
    Engine(anyhow::Error),

    #[error("Speech synthesis timed out after {0:?}")]
    Timeout(Duration),

    #[error("No speech engine named '{0}' is configured")]
    UnknownEngine(String),
}

impl From<reqwest::Error> for TtsError {
    fn from(source: reqwest::Error) -> Self {
        Self::Engine(anyhow::Error::new(source))
    }
}

impl From<serde_json::Error> for TtsError {
    fn from(source: serde_json::Error) -> Self {
        Self::Engine(anyhow::Error::new(source))
    }
}
