pub mod config;
pub mod manager;


pub use config::{Settings, TtsEngineConfig};
pub use manager::SettingsManager;
