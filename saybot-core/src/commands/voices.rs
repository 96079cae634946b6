use async_trait::async_trait;

use super::{CommandContext, SlashCommand};
use crate::bot::BotState;
use crate::reply::Reply;
use crate::tts::{TtsError, Voice};

/// Engines such as Google Cloud offer hundreds of voices.
const MAX_LISTED_VOICES: usize = 25;

/// `/voices`: lists the voices of the engine this destination speaks with.
pub struct VoicesCommand;

#[async_trait]
impl SlashCommand for VoicesCommand {
    fn key(&self) -> &'static str {
        "voices"
    }

    async fn execute(&self, state: &BotState, ctx: &CommandContext<'_>, _args: &str) -> Vec<Reply> {
        let locale = ctx.locale();
        let settings = state.settings.settings();
        let engine_name = match state.sessions.get(ctx.request.destination) {
            Some(session) => session.engine_name().to_string(),
            None => settings.tts.default_engine.clone(),
        };

        let listed = async {
            let engine = state.engines.get(&engine_name)?;
            let voices = tokio::time::timeout(
                settings.tts.synthesis_timeout(),
                engine.list_voices(),
            )
            .await
            .map_err(|_| TtsError::Timeout(settings.tts.synthesis_timeout()))??;
            Ok::<_, TtsError>((engine.default_voice(), voices))
        };

        let (current, voices) = match listed.await {
            Ok(listed) => listed,
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

        let mut message = state.localizer.format(
            locale,
            "tts.voices.header",
            &[&engine_name, &current.name],
        );
        for voice in voices.iter().take(MAX_LISTED_VOICES) {
            message.push('\n');
            message.push_str(&voice_line(voice, &current));
        }
        if voices.len() > MAX_LISTED_VOICES {
            message.push('\n');
            message.push_str(&state.localizer.format(
                locale,
                "tts.voices.more",
                &[&(voices.len() - MAX_LISTED_VOICES)],
            ));
        }

        vec![Reply::info(message)]
    }
}

fn voice_line(voice: &Voice, current: &Voice) -> String {
    let marker = if voice.id == current.id { '*' } else { '-' };
    format!(
        "  {marker} {} ({}, {})",
        voice.name, voice.id, voice.language_code
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(id: &str) -> Voice {
        Voice {
            id: id.to_string(),
            name: id.to_uppercase(),
            language_code: "en-US".to_string(),
        }
    }

    #[test]
    fn test_current_voice_is_marked() {
        assert_eq!(voice_line(&voice("a"), &voice("a")), "  * A (a, en-US)");
        assert_eq!(voice_line(&voice("b"), &voice("a")), "  - B (b, en-US)");
    }
}
