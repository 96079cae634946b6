use async_trait::async_trait;
use tracing::info;

use super::{CommandContext, SlashCommand};
use crate::bot::BotState;
use crate::reply::Reply;

/// `/leave`: disconnects from the destination's voice channel and discards
/// its speech session.
pub struct LeaveCommand;

#[async_trait]
impl SlashCommand for LeaveCommand {
    fn key(&self) -> &'static str {
        "leave"
    }

    async fn execute(&self, state: &BotState, ctx: &CommandContext<'_>, _args: &str) -> Vec<Reply> {
        let destination = ctx.request.destination;
        let locale = ctx.locale();

        let left = match state.voice.leave(destination).await {
            Ok(left) => left,
            Err(e) => {
                let token = state
                    .reporter
                    .report(&anyhow::Error::new(e), ctx.request.user.id)
                    .await;
                return vec![Reply::error(state.localizer.format(
                    locale,
                    "error.generic",
                    &[&token],
                ))];
            }
        };

        state.sessions.remove(destination);

        if left {
            info!(%destination, "Left voice channel");
            vec![Reply::info(state.localizer.text(locale, "voice.leave.done"))]
        } else {
            vec![Reply::error(
                state.localizer.text(locale, "voice.leave.notconnected"),
            )]
        }
    }
}
