use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

snowflake_id!(
    /// A chat platform user.
    UserId
);
snowflake_id!(
    /// A text or voice channel.
    ChannelId
);
snowflake_id!(
    /// A playback target: one voice connection and one speech session exist
    /// per destination (a guild, or a room on platforms without guilds).
    DestinationId
);

/// The user a piece of text is spoken for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub id: UserId,
    pub display_name: String,
}

impl Speaker {
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

/// Everything a command handler knows about the invocation: who asked, where,
/// which voice channel they are sitting in and which locale replies use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub user: Speaker,
    pub destination: DestinationId,
    /// The voice channel the requesting user is currently in, if any.
    pub voice_channel: Option<ChannelId>,
    pub locale: String,
}

impl CommandRequest {
    pub fn new(user: Speaker, destination: impl Into<DestinationId>, locale: &str) -> Self {
        Self {
            user,
            destination: destination.into(),
            voice_channel: None,
            locale: locale.to_string(),
        }
    }

    pub fn in_voice_channel(mut self, channel: impl Into<ChannelId>) -> Self {
        self.voice_channel = Some(channel.into());
        self
    }
}
