//! Slash commands and the localized metadata describing them.

pub mod cooldown;
pub mod help;
pub mod join;
pub mod leave;
pub mod router;
pub mod say;
pub mod voices;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::bot::BotState;
use crate::i18n::{format_placeholders, Localizer};
use crate::normalize::RenderContext;
use crate::reply::Reply;
use crate::request::CommandRequest;
use crate::settings::config::CommandSettings;

pub use router::CommandRouter;

/// Per-invocation data handed to a command.
pub struct CommandContext<'a> {
    pub request: &'a CommandRequest,
    pub render: &'a dyn RenderContext,
    /// Metadata of every registered command, as the router sees it.
    pub catalog: &'a [CommandSpec],
}

impl<'a> CommandContext<'a> {
    pub fn new(request: &'a CommandRequest, render: &'a dyn RenderContext) -> Self {
        Self {
            request,
            render,
            catalog: &[],
        }
    }

    pub fn locale(&self) -> &str {
        &self.request.locale
    }
}

#[async_trait]
pub trait SlashCommand: Send + Sync {
    /// Identifier used for string table keys (`command.<key>.*`) and settings.
    fn key(&self) -> &'static str;

    /// Localized metadata for registration and help.
    fn spec(&self, localizer: &dyn Localizer, settings: &CommandSettings) -> CommandSpec {
        CommandSpec::localized(localizer, self.key(), settings)
    }

    /// Execute the command with everything after the command name
    async fn execute(&self, state: &BotState, ctx: &CommandContext<'_>, args: &str) -> Vec<Reply>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOption {
    pub name: String,
    pub description: String,
    pub name_localizations: BTreeMap<String, String>,
    pub description_localizations: BTreeMap<String, String>,
    pub required: bool,
}

/// Everything a chat platform needs to register a command: default-locale
/// name and description, their translations, options, aliases and cooldown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub key: String,
    pub name: String,
    pub description: String,
    pub name_localizations: BTreeMap<String, String>,
    pub description_localizations: BTreeMap<String, String>,
    pub options: Vec<CommandOption>,
    pub aliases: Vec<String>,
    pub cooldown: Option<Duration>,
}

impl CommandSpec {
    /// Builds metadata from the `command.<key>.*` strings. Descriptions may
    /// refer to the bot's name as `{0}`.
    pub fn localized(localizer: &dyn Localizer, key: &str, settings: &CommandSettings) -> Self {
        let default_locale = localizer.default_locale();
        let name_key = format!("command.{key}.name");
        let desc_key = format!("command.{key}.desc");

        let mut aliases: Vec<String> = localizer
            .get_all(&format!("command.{key}.aliases"))
            .values()
            .flat_map(|list| list.split(','))
            .map(|alias| alias.trim().to_lowercase())
            .filter(|alias| !alias.is_empty())
            .collect();
        aliases.sort();
        aliases.dedup();

        Self {
            key: key.to_string(),
            name: localizer.text(default_locale, &name_key),
            description: describe(localizer, default_locale, &desc_key),
            name_localizations: localizer.get_all(&name_key),
            description_localizations: localizer
                .get_all(&desc_key)
                .into_keys()
                .map(|locale| {
                    let text = describe(localizer, &locale, &desc_key);
                    (locale, text)
                })
                .collect(),
            options: Vec::new(),
            aliases,
            cooldown: settings.cooldown(key),
        }
    }

    /// Adds the `command.<key>.opt<index>.*` option.
    pub fn with_option(mut self, localizer: &dyn Localizer, index: usize, required: bool) -> Self {
        let default_locale = localizer.default_locale();
        let name_key = format!("command.{}.opt{index}.name", self.key);
        let desc_key = format!("command.{}.opt{index}.desc", self.key);

        self.options.push(CommandOption {
            name: localizer.text(default_locale, &name_key),
            description: localizer.text(default_locale, &desc_key),
            name_localizations: localizer.get_all(&name_key),
            description_localizations: localizer.get_all(&desc_key),
            required,
        });
        self
    }

    pub fn name_in(&self, locale: &str) -> &str {
        self.name_localizations
            .get(locale)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }

    pub fn description_in(&self, locale: &str) -> &str {
        self.description_localizations
            .get(locale)
            .map(String::as_str)
            .unwrap_or(&self.description)
    }

    /// Whether `invoked` names this command in any locale or by alias.
    pub fn matches(&self, invoked: &str) -> bool {
        let invoked = invoked.to_lowercase();
        self.name.to_lowercase() == invoked
            || self
                .name_localizations
                .values()
                .any(|name| name.to_lowercase() == invoked)
            || self.aliases.iter().any(|alias| *alias == invoked)
    }
}

fn describe(localizer: &dyn Localizer, locale: &str, key: &str) -> String {
    let bot_name = localizer.text(locale, "bot.name");
    format_placeholders(&localizer.text(locale, key), &[&bot_name])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::StringTable;

    fn table() -> StringTable {
        StringTable::builtin("en-US").unwrap()
    }

    #[test]
    fn test_localized_spec() {
        let spec = CommandSpec::localized(&table(), "leave", &CommandSettings::default());

        assert_eq!(spec.name, "leave");
        assert_eq!(spec.description, "Make saybot leave the voice channel");
        assert_eq!(spec.name_in("ko-KR"), "나가기");
        assert_eq!(spec.name_in("fr-FR"), "leave");
        assert_eq!(spec.cooldown, Some(Duration::from_secs(5)));
        assert!(spec.aliases.contains(&"disconnect".to_string()));
    }

    #[test]
    fn test_matches_any_locale_and_alias() {
        let spec = CommandSpec::localized(&table(), "leave", &CommandSettings::default());

        assert!(spec.matches("leave"));
        assert!(spec.matches("LEAVE"));
        assert!(spec.matches("나가기"));
        assert!(spec.matches("bye"));
        assert!(!spec.matches("say"));
    }

    #[test]
    fn test_options() {
        let spec = CommandSpec::localized(&table(), "say", &CommandSettings::default())
            .with_option(&table(), 1, true);

        assert_eq!(spec.options.len(), 1);
        assert_eq!(spec.options[0].name, "message");
        assert!(spec.options[0].required);
        assert_eq!(spec.cooldown, None);
    }
}
