pub mod bot;
pub mod commands;
pub mod dispatch;
pub mod i18n;
pub mod normalize;
pub mod reply;
pub mod report;
pub mod request;
pub mod session;
pub mod settings;
pub mod tts;
pub mod voice;

// Public library API - these are the types a chat platform adapter needs.
pub use bot::{Bot, BotBuilder};
pub use i18n::{Localizer, StringTable};
pub use normalize::{normalize, RenderContext};
pub use reply::Reply;
pub use request::{ChannelId, CommandRequest, DestinationId, Speaker, UserId};
pub use settings::{Settings, SettingsManager};
pub use voice::VoiceManager;
