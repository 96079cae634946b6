use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::request::UserId;

/// When each (command, user) pair may be used again. Expired pairs are
/// forgotten on the next use of any command.
#[derive(Default)]
pub struct Cooldowns {
    ready_at: Mutex<HashMap<(String, UserId), Instant>>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a use of `command` by `user` unless its cooldown from the
    /// previous use is still running, in which case the remaining wait is
    /// returned and nothing is recorded.
    pub fn try_use(&self, command: &str, user: UserId, cooldown: Duration) -> Result<(), Duration> {
        let now = Instant::now();
        let mut ready_at = self
            .ready_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        ready_at.retain(|_, ready| *ready > now);

        let key = (command.to_string(), user);
        if let Some(ready) = ready_at.get(&key) {
            return Err(*ready - now);
        }

        ready_at.insert(key, now + cooldown);
        Ok(())
    }
}
