use saybot_core::request::ChannelId;

use crate::state::State;

pub enum LocalCommandResult {
    Handled {
        msg: String,
    },

    /// A command to exit the app was detected
    Exit,

    /// The command was not processed locally (and should be sent to the bot).
    Unhandled,
}

pub fn handle_local_command(state: &mut State, input: &str) -> LocalCommandResult {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let arg = parts.next();

    match command {
        "/exit" | "/quit" => LocalCommandResult::Exit,
        "/voice" => match arg {
            None => LocalCommandResult::Handled {
                msg: match state.voice_channel {
                    Some(channel) => format!("You are in voice channel {channel}"),
                    None => "You are not in a voice channel".to_string(),
                },
            },
            Some("off") => {
                state.voice_channel = None;
                LocalCommandResult::Handled {
                    msg: "Left your voice channel".to_string(),
                }
            }
            Some(id) => match id.parse::<u64>() {
                Ok(id) => {
                    state.voice_channel = Some(ChannelId(id));
                    LocalCommandResult::Handled {
                        msg: format!("Moved to voice channel {id}"),
                    }
                }
                Err(_) => LocalCommandResult::Handled {
                    msg: "Usage: /voice [<channel id>|off]".to_string(),
                },
            },
        },
        "/locale" => match arg {
            Some(locale) => {
                state.locale = locale.to_string();
                LocalCommandResult::Handled {
                    msg: format!("Locale: {locale}"),
                }
            }
            None => LocalCommandResult::Handled {
                msg: format!("Locale: {}", state.locale),
            },
        },
        _ => LocalCommandResult::Unhandled,
    }
}
