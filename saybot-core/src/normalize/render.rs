use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::request::{ChannelId, UserId};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Failed to look up channel {channel}: {error}")]
    Lookup {
        channel: ChannelId,
        error: anyhow::Error,
    },
}

/// Platform data needed to turn mention tokens into speakable names.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Display name of a member of the destination, from the local cache.
    fn member_display_name(&self, user: UserId) -> Option<String>;

    /// Name of a channel. `Ok(None)` means the channel does not exist; an
    /// error means the lookup itself failed.
    async fn channel_name(&self, channel: ChannelId) -> Result<Option<String>, ResolveError>;
}

/// A render context backed by fixed maps.
#[derive(Debug, Clone, Default)]
pub struct StaticRenderContext {
    members: HashMap<UserId, String>,
    channels: HashMap<ChannelId, String>,
}

impl StaticRenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, user: impl Into<UserId>, name: impl Into<String>) -> Self {
        self.members.insert(user.into(), name.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<ChannelId>, name: impl Into<String>) -> Self {
        self.channels.insert(channel.into(), name.into());
        self
    }
}

#[async_trait]
impl RenderContext for StaticRenderContext {
    fn member_display_name(&self, user: UserId) -> Option<String> {
        self.members.get(&user).cloned()
    }

    async fn channel_name(&self, channel: ChannelId) -> Result<Option<String>, ResolveError> {
        Ok(self.channels.get(&channel).cloned())
    }
}
