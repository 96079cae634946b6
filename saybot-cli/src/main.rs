use anyhow::{Context, Result};
use clap::Parser;
use saybot_core::normalize::StaticRenderContext;
use saybot_core::request::{ChannelId, DestinationId, Speaker};
use saybot_core::settings::SettingsManager;
use saybot_core::Bot;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod formatter;
mod interactive_app;
mod state;
mod wav_voice;

use crate::formatter::Formatter;
use crate::interactive_app::InteractiveApp;
use crate::state::State;
use crate::wav_voice::WavVoice;

#[derive(Parser, Debug)]
#[command(name = "saybot")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "saybot console - run the text-to-speech commands locally")]
struct Args {
    /// Settings file (defaults to ~/.saybot/settings.toml)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Locale for replies and spoken replacements (defaults to the settings)
    #[arg(long)]
    locale: Option<String>,

    /// Destination ID the console plays into
    #[arg(long, default_value_t = 1)]
    guild: u64,

    /// Your user ID
    #[arg(long, default_value_t = 100000000000000001)]
    user: u64,

    /// Your display name
    #[arg(long, default_value = "me")]
    name: String,

    /// The voice channel you start in
    #[arg(long, default_value_t = 1)]
    voice_channel: u64,

    /// Known member for mention resolution, repeatable
    #[arg(long = "member", value_name = "ID=NAME", value_parser = parse_pair)]
    members: Vec<(u64, String)>,

    /// Known channel for mention resolution, repeatable
    #[arg(long = "channel", value_name = "ID=NAME", value_parser = parse_pair)]
    channels: Vec<(u64, String)>,

    /// Where spoken segments are written as WAV files
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

fn parse_pair(raw: &str) -> Result<(u64, String), String> {
    let (id, name) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=NAME, got '{raw}'"))?;
    let id = id
        .trim()
        .parse()
        .map_err(|e| format!("invalid ID '{id}': {e}"))?;
    Ok((id, name.trim().to_string()))
}

fn main() -> Result<()> {
    setup_tracing()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = Args::parse();

    info!(
        "CLI startup: settings={:?}, guild={}, user={}, locale={:?}",
        args.settings, args.guild, args.user, args.locale
    );

    let settings = match args.settings {
        Some(path) => SettingsManager::from_path(path)?,
        None => SettingsManager::new()?,
    };
    let locale = args
        .locale
        .unwrap_or_else(|| settings.settings().default_locale);

    let out_dir = match args.out_dir {
        Some(dir) => dir,
        None => dirs::home_dir()
            .context("Failed to get home directory")?
            .join(".saybot")
            .join("audio"),
    };

    let formatter = Formatter::new();
    let voice = WavVoice::new(out_dir.clone(), formatter.clone());
    let bot = Bot::builder()
        .settings(settings)
        .voice(Arc::new(voice))
        .build()?;

    let user = Speaker::new(args.user, args.name);
    let mut render = StaticRenderContext::new().with_member(user.id, user.display_name.clone());
    for (id, name) in args.members {
        render = render.with_member(id, name);
    }
    for (id, name) in args.channels {
        render = render.with_channel(id, name);
    }

    formatter.print_system(&format!("Writing speech to {}", out_dir.display()));

    let state = State {
        voice_channel: Some(ChannelId(args.voice_channel)),
        locale,
    };
    let mut app = InteractiveApp::new(
        bot,
        render,
        user,
        DestinationId(args.guild),
        state,
        formatter,
    );
    app.run().await
}

fn setup_tracing() -> Result<()> {
    use std::fs;
    use tracing_subscriber::fmt;

    // Create trace directory in user's home
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    let trace_dir = home.join(".saybot").join("trace");
    fs::create_dir_all(&trace_dir)?;

    let log_file = trace_dir.join("saybot.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}
