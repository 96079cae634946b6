use std::sync::Arc;
use tracing::{debug, info};

use super::cooldown::Cooldowns;
use super::help::HelpCommand;
use super::join::JoinCommand;
use super::leave::LeaveCommand;
use super::say::SayCommand;
use super::voices::VoicesCommand;
use super::{CommandContext, CommandSpec, SlashCommand};
use crate::bot::BotState;
use crate::reply::Reply;

/// Finds the command named by a `/name args` line and runs it.
pub struct CommandRouter {
    commands: Vec<Arc<dyn SlashCommand>>,
    cooldowns: Cooldowns,
}

impl Default for CommandRouter {
    fn default() -> Self {
        Self::new()
            .with_command(SayCommand)
            .with_command(LeaveCommand)
            .with_command(JoinCommand)
            .with_command(VoicesCommand)
            .with_command(HelpCommand)
    }
}

impl CommandRouter {
    /// A router without any commands.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            cooldowns: Cooldowns::new(),
        }
    }

    pub fn with_command(mut self, command: impl SlashCommand + 'static) -> Self {
        self.commands.push(Arc::new(command));
        self
    }

    /// Metadata of all registered commands, in registration order.
    pub fn specs(&self, state: &BotState) -> Vec<CommandSpec> {
        let settings = state.settings.settings();
        self.commands
            .iter()
            .map(|command| command.spec(&*state.localizer, &settings.commands))
            .collect()
    }

    pub async fn route(&self, state: &BotState, ctx: &CommandContext<'_>, input: &str) -> Vec<Reply> {
        let line = input.trim();
        let line = line.strip_prefix('/').unwrap_or(line);
        let (invoked, args) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        if invoked.is_empty() {
            return vec![];
        }

        let specs = self.specs(state);

        let Some((command, spec)) = self
            .commands
            .iter()
            .zip(&specs)
            .find(|(_, spec)| spec.matches(invoked))
        else {
            debug!(command = invoked, "Unknown command");
            return vec![Reply::error(state.localizer.format(
                ctx.locale(),
                "command.unknown",
                &[&invoked],
            ))];
        };

        if let Some(cooldown) = spec.cooldown {
            if let Err(remaining) = self
                .cooldowns
                .try_use(&spec.key, ctx.request.user.id, cooldown)
            {
                let seconds = remaining.as_secs_f64().ceil() as u64;
                return vec![Reply::error(state.localizer.format(
                    ctx.locale(),
                    "command.cooldown",
                    &[&seconds, &spec.name_in(ctx.locale())],
                ))];
            }
        }

        info!(
            command = %spec.key,
            user = %ctx.request.user.id,
            destination = %ctx.request.destination,
            "Running command"
        );

        let ctx = CommandContext {
            catalog: &specs,
            ..*ctx
        };
        command.execute(state, &ctx, args).await
    }
}
