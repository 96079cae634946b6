use saybot_core::request::ChannelId;

/// Console-only state that local commands can change between lines.
#[derive(Debug, Clone)]
pub struct State {
    pub voice_channel: Option<ChannelId>,
    pub locale: String,
}
