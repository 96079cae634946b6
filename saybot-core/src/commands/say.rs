use async_trait::async_trait;

use super::{CommandContext, CommandSpec, SlashCommand};
use crate::bot::BotState;
use crate::i18n::Localizer;
use crate::reply::Reply;
use crate::settings::config::CommandSettings;

/// `/say <message>`: speaks the message in the caller's voice channel.
pub struct SayCommand;

#[async_trait]
impl SlashCommand for SayCommand {
    fn key(&self) -> &'static str {
        "say"
    }

    fn spec(&self, localizer: &dyn Localizer, settings: &CommandSettings) -> CommandSpec {
        CommandSpec::localized(localizer, self.key(), settings).with_option(localizer, 1, true)
    }

    async fn execute(&self, state: &BotState, ctx: &CommandContext<'_>, args: &str) -> Vec<Reply> {
        let text = args.trim();
        if text.is_empty() {
            let locale = ctx.locale();
            let name = state.localizer.text(locale, "command.say.name");
            let option = state.localizer.text(locale, "command.say.opt1.name");
            return vec![Reply::error(state.localizer.format(
                locale,
                "command.say.usage",
                &[&name, &option],
            ))];
        }

        state.dispatcher.dispatch(ctx.request, ctx.render, text).await
    }
}
