use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use saybot_core::normalize::StaticRenderContext;
use saybot_core::request::{CommandRequest, DestinationId, Speaker};
use saybot_core::Bot;

use crate::commands::{handle_local_command, LocalCommandResult};
use crate::formatter::Formatter;
use crate::state::State;

pub struct InteractiveApp {
    bot: Bot,
    render: StaticRenderContext,
    user: Speaker,
    destination: DestinationId,
    formatter: Formatter,
    state: State,
}

impl InteractiveApp {
    pub fn new(
        bot: Bot,
        render: StaticRenderContext,
        user: Speaker,
        destination: DestinationId,
        state: State,
        formatter: Formatter,
    ) -> Self {
        formatter.print_system(
            "💡 Type /help for commands, plain text to speak it, /voice to change channel, /quit to exit",
        );

        Self {
            bot,
            render,
            user,
            destination,
            formatter,
            state,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        loop {
            let line = match rl.readline(self.formatter.prompt()) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => continue,
                Err(_) => break,
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            if input == "/reload" {
                self.reload_settings();
                continue;
            }

            match handle_local_command(&mut self.state, input) {
                LocalCommandResult::Handled { msg } => {
                    self.formatter.print_system(&msg);
                    continue;
                }
                LocalCommandResult::Exit => break,
                LocalCommandResult::Unhandled => (),
            }

            rl.add_history_entry(&line)?;

            let command = if input.starts_with('/') {
                input.to_string()
            } else {
                format!("/say {input}")
            };
            let replies = self
                .bot
                .handle(&self.request(), &self.render, &command)
                .await;
            for reply in &replies {
                self.formatter.print_reply(reply);
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Re-reads the settings file; engines are rebuilt on next use.
    fn reload_settings(&self) {
        let state = self.bot.state();
        match state.settings.reload() {
            Ok(settings) => {
                state.engines.clear();
                self.formatter.print_system(&format!(
                    "Settings reloaded (default engine: {})",
                    settings.tts.default_engine
                ));
            }
            Err(e) => self.formatter.print_error(&format!("{e:?}")),
        }
    }

    fn request(&self) -> CommandRequest {
        let mut request = CommandRequest::new(self.user.clone(), self.destination, &self.state.locale);
        request.voice_channel = self.state.voice_channel;
        request
    }
}
