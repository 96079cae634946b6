use crate::normalize::MentionFallback;
use crate::tts::mock::MockTtsBehavior;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_ENGINE: &str = "mock";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum TtsEngineConfig {
    #[serde(rename = "mock")]
    Mock {
        #[serde(default)]
        behavior: MockTtsBehavior,
    },
    #[serde(rename = "google_cloud")]
    GoogleCloud {
        api_key: String,
        #[serde(default = "default_language_code")]
        language_code: String,
        #[serde(default)]
        voice_name: Option<String>,
        #[serde(default = "default_sample_rate")]
        sample_rate: u32,
    },
    #[serde(rename = "elevenlabs")]
    ElevenLabs {
        api_key: String,
        #[serde(default)]
        voice_id: Option<String>,
        #[serde(default)]
        model_id: Option<String>,
    },
}

fn default_language_code() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_sample_rate() -> u32 {
    24_000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TtsSettings {
    /// Engine new speech sessions are bound to.
    #[serde(default = "default_engine")]
    pub default_engine: String,

    #[serde(default)]
    pub mention_fallback: MentionFallback,

    /// Upper bound for synthesizing a single queued message.
    #[serde(default = "default_synthesis_timeout_secs")]
    pub synthesis_timeout_secs: u64,

    #[serde(default = "default_engines")]
    pub engines: BTreeMap<String, TtsEngineConfig>,
}

fn default_engine() -> String {
    DEFAULT_ENGINE.to_string()
}

fn default_synthesis_timeout_secs() -> u64 {
    30
}

fn default_engines() -> BTreeMap<String, TtsEngineConfig> {
    let mut engines = BTreeMap::new();
    engines.insert(
        DEFAULT_ENGINE.to_string(),
        TtsEngineConfig::Mock {
            behavior: MockTtsBehavior::Success,
        },
    );
    engines
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            default_engine: default_engine(),
            mention_fallback: MentionFallback::default(),
            synthesis_timeout_secs: default_synthesis_timeout_secs(),
            engines: default_engines(),
        }
    }
}

impl TtsSettings {
    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    pub fn engine(&self, name: &str) -> Option<&TtsEngineConfig> {
        self.engines.get(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceSettings {
    /// Upper bound for playing a single audio segment.
    #[serde(default = "default_playback_timeout_secs")]
    pub playback_timeout_secs: u64,
}

fn default_playback_timeout_secs() -> u64 {
    120
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            playback_timeout_secs: default_playback_timeout_secs(),
        }
    }
}

impl VoiceSettings {
    pub fn playback_timeout(&self) -> Duration {
        Duration::from_secs(self.playback_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandSettings {
    /// Per-user cooldown in seconds, keyed by command name.
    #[serde(default = "default_cooldowns")]
    pub cooldowns: BTreeMap<String, u64>,
}

fn default_cooldowns() -> BTreeMap<String, u64> {
    let mut cooldowns = BTreeMap::new();
    cooldowns.insert("leave".to_string(), 5);
    cooldowns
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            cooldowns: default_cooldowns(),
        }
    }
}

impl CommandSettings {
    pub fn cooldown(&self, command: &str) -> Option<Duration> {
        self.cooldowns
            .get(command)
            .filter(|secs| **secs > 0)
            .map(|secs| Duration::from_secs(*secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReportSettings {
    /// When set, every error report is appended to this file as a JSON line.
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Directory of `<locale>.toml` string tables that extend or override the
    /// built-in ones.
    #[serde(default)]
    pub locale_dir: Option<PathBuf>,

    #[serde(default)]
    pub tts: TtsSettings,

    #[serde(default)]
    pub voice: VoiceSettings,

    #[serde(default)]
    pub commands: CommandSettings,

    #[serde(default)]
    pub report: ReportSettings,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            locale_dir: None,
            tts: TtsSettings::default(),
            voice: VoiceSettings::default(),
            commands: CommandSettings::default(),
            report: ReportSettings::default(),
        }
    }
}

impl Settings {
    pub fn add_engine(&mut self, name: String, config: TtsEngineConfig) {
        self.tts.engines.insert(name, config);
    }
}
