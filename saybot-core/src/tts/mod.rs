pub mod elevenlabs;
pub mod engines;
pub mod error;
pub mod google_cloud;
pub mod mock;
pub mod provider;
pub mod types;

pub use engines::{create_engine, EngineSet};
pub use error::TtsError;
pub use provider::TextToSpeech;
pub use types::{AudioData, Voice};
