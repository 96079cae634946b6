use async_trait::async_trait;

use super::{CommandContext, SlashCommand};
use crate::bot::BotState;
use crate::reply::Reply;
use crate::voice::join_caller;

/// `/join`: joins the caller's voice channel without saying anything.
pub struct JoinCommand;

#[async_trait]
impl SlashCommand for JoinCommand {
    fn key(&self) -> &'static str {
        "join"
    }

    async fn execute(&self, state: &BotState, ctx: &CommandContext<'_>, _args: &str) -> Vec<Reply> {
        let handle = match join_caller(&*state.voice, &*state.localizer, ctx.request).await {
            Ok(handle) => handle,
            Err(reply) => return vec![reply],
        };

        let channel = match ctx.render.channel_name(handle.channel).await {
            Ok(Some(name)) => name,
            _ => handle.channel.to_string(),
        };

        vec![Reply::info(state.localizer.format(
            ctx.locale(),
            "voice.join.done",
            &[&channel],
        ))]
    }
}
