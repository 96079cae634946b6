use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::commands::{CommandContext, CommandRouter, CommandSpec};
use crate::dispatch::SpeakDispatcher;
use crate::i18n::{Localizer, StringTable};
use crate::normalize::RenderContext;
use crate::reply::Reply;
use crate::report::{ErrorReporter, LogReporter};
use crate::request::CommandRequest;
use crate::session::SessionRegistry;
use crate::settings::SettingsManager;
use crate::tts::{EngineSet, TextToSpeech};
use crate::voice::{MemoryVoice, VoiceManager};

/// Shared collaborators every command can reach.
pub struct BotState {
    pub settings: SettingsManager,
    pub localizer: Arc<dyn Localizer>,
    pub voice: Arc<dyn VoiceManager>,
    pub sessions: Arc<SessionRegistry>,
    pub engines: Arc<EngineSet>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub dispatcher: SpeakDispatcher,
}

pub struct Bot {
    state: BotState,
    router: CommandRouter,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    /// Metadata of every command, for registering them with a chat platform.
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.router.specs(&self.state)
    }

    /// Handles one `/command args` line.
    pub async fn handle(
        &self,
        request: &CommandRequest,
        render: &dyn RenderContext,
        input: &str,
    ) -> Vec<Reply> {
        let ctx = CommandContext::new(request, render);
        self.router.route(&self.state, &ctx, input).await
    }
}

#[derive(Default)]
pub struct BotBuilder {
    settings: Option<SettingsManager>,
    settings_path: Option<PathBuf>,
    localizer: Option<Arc<dyn Localizer>>,
    voice: Option<Arc<dyn VoiceManager>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    engines: Vec<(String, Arc<dyn TextToSpeech>)>,
    router: Option<CommandRouter>,
}

impl BotBuilder {
    pub fn settings(mut self, settings: SettingsManager) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    pub fn localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = Some(localizer);
        self
    }

    pub fn voice(mut self, voice: Arc<dyn VoiceManager>) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Registers a prebuilt engine that takes precedence over the engine of
    /// the same name in the settings.
    pub fn engine(mut self, name: &str, engine: Arc<dyn TextToSpeech>) -> Self {
        self.engines.push((name.to_string(), engine));
        self
    }

    pub fn router(mut self, router: CommandRouter) -> Self {
        self.router = Some(router);
        self
    }

    pub fn build(self) -> Result<Bot> {
        let settings = match (self.settings, self.settings_path) {
            (Some(settings), _) => settings,
            (None, Some(path)) => SettingsManager::from_path(path)?,
            (None, None) => SettingsManager::new()?,
        };
        let config = settings.settings();

        let localizer: Arc<dyn Localizer> = match self.localizer {
            Some(localizer) => localizer,
            None => Arc::new(match &config.locale_dir {
                Some(dir) => StringTable::with_overrides(&config.default_locale, dir)
                    .with_context(|| format!("Failed to load string tables from {dir:?}"))?,
                None => StringTable::builtin(&config.default_locale)?,
            }),
        };

        let voice = self
            .voice
            .unwrap_or_else(|| Arc::new(MemoryVoice::new()));
        let reporter = self
            .reporter
            .unwrap_or_else(|| Arc::new(LogReporter::new(config.report.log_path.clone())));

        let engines = Arc::new(EngineSet::new(settings.clone()));
        for (name, engine) in self.engines {
            engines.insert(&name, engine);
        }

        let sessions = Arc::new(SessionRegistry::new());
        let dispatcher = SpeakDispatcher::new(
            settings.clone(),
            localizer.clone(),
            voice.clone(),
            sessions.clone(),
            engines.clone(),
            reporter.clone(),
        );

        info!(
            settings = ?settings.path(),
            default_locale = %config.default_locale,
            default_engine = %config.tts.default_engine,
            "Bot ready"
        );

        Ok(Bot {
            state: BotState {
                settings,
                localizer,
                voice,
                sessions,
                engines,
                reporter,
                dispatcher,
            },
            router: self.router.unwrap_or_default(),
        })
    }
}
