use async_trait::async_trait;

use super::{CommandContext, SlashCommand};
use crate::bot::BotState;
use crate::reply::Reply;

pub struct HelpCommand;

#[async_trait]
impl SlashCommand for HelpCommand {
    fn key(&self) -> &'static str {
        "help"
    }

    async fn execute(&self, state: &BotState, ctx: &CommandContext<'_>, _args: &str) -> Vec<Reply> {
        let locale = ctx.locale();
        let mut message = state.localizer.text(locale, "command.help.header");

        for spec in ctx.catalog {
            let mut usage = format!("/{}", spec.name_in(locale));
            for option in &spec.options {
                let name = option
                    .name_localizations
                    .get(locale)
                    .unwrap_or(&option.name);
                usage.push_str(&format!(" <{name}>"));
            }
            message.push_str(&format!("\n  {usage:<20} {}", spec.description_in(locale)));
        }

        vec![Reply::info(message)]
    }
}
