//! Turns raw chat text into text a speech synthesizer can read aloud.
//!
//! Mention tokens are replaced with the names they point at, `@` and `&` are
//! replaced with locale words, and markup characters become spaces.

pub mod render;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::LazyLock;
use strum::{Display, EnumString};
use tracing::warn;

use crate::i18n::Localizer;
use crate::request::{ChannelId, UserId};

pub use render::{RenderContext, ResolveError, StaticRenderContext};

/// `<@!id>` / `<@id>` for users, `<#id>` for channels.
static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(@!?|#)([0-9]{17,20})>").expect("mention pattern is a valid regex")
});

/// What a mention turns into when its target cannot be resolved.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MentionFallback {
    /// Drop the mention entirely.
    #[default]
    Remove,
    /// Speak the bare numeric ID.
    RawId,
}

impl MentionFallback {
    fn substitute(self, raw_id: &str) -> String {
        match self {
            MentionFallback::Remove => String::new(),
            MentionFallback::RawId => raw_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub at_word: String,
    pub ampersand_word: String,
    pub mention_fallback: MentionFallback,
}

impl NormalizeOptions {
    pub fn for_locale(
        localizer: &dyn Localizer,
        locale: &str,
        mention_fallback: MentionFallback,
    ) -> Self {
        Self {
            at_word: localizer.text(locale, "tts.replacement.@"),
            ampersand_word: localizer.text(locale, "tts.replacement.&"),
            mention_fallback,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mention {
    User(UserId),
    Channel(ChannelId),
}

struct MentionMatch<'a> {
    span: Range<usize>,
    raw_id: &'a str,
    target: Option<Mention>,
}

/// Characters a synthesizer either reads out literally or chokes on.
pub fn is_unspeakable(c: char) -> bool {
    matches!(
        c,
        '{' | '}'
            | '['
            | ']'
            | '/'
            | ';'
            | ':'
            | '|'
            | '('
            | ')'
            | '*'
            | '`'
            | '^'
            | '_'
            | '~'
            | '<'
            | '>'
            | '#'
            | '\\'
            | '='
    )
}

pub async fn normalize(raw: &str, ctx: &dyn RenderContext, options: &NormalizeOptions) -> String {
    let resolved = resolve_mentions(raw, ctx, options.mention_fallback).await;

    resolved
        .replace('@', &options.at_word)
        .replace('&', &options.ampersand_word)
        .chars()
        .map(|c| if is_unspeakable(c) { ' ' } else { c })
        .collect()
}

fn find_mentions(raw: &str) -> Vec<MentionMatch<'_>> {
    MENTION
        .captures_iter(raw)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let raw_id = caps.get(2)?.as_str();
            let target = raw_id.parse::<u64>().ok().map(|id| match &caps[1] {
                "#" => Mention::Channel(ChannelId(id)),
                _ => Mention::User(UserId(id)),
            });
            Some(MentionMatch {
                span: whole.range(),
                raw_id,
                target,
            })
        })
        .collect()
}

async fn resolve_mentions(raw: &str, ctx: &dyn RenderContext, fallback: MentionFallback) -> String {
    let mentions = find_mentions(raw);
    if mentions.is_empty() {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut last = 0;

    for mention in mentions {
        out.push_str(&raw[last..mention.span.start]);
        last = mention.span.end;

        let name = match mention.target {
            Some(target) => resolve(ctx, target).await,
            None => None,
        };

        match name {
            Some(name) => out.push_str(&name),
            None => {
                warn!(mention = %&raw[mention.span.clone()], %fallback, "Unresolved mention");
                out.push_str(&fallback.substitute(mention.raw_id));
            }
        }
    }

    out.push_str(&raw[last..]);
    out
}

async fn resolve(ctx: &dyn RenderContext, target: Mention) -> Option<String> {
    match target {
        Mention::User(user) => ctx.member_display_name(user),
        Mention::Channel(channel) => match ctx.channel_name(channel).await {
            Ok(name) => name,
            Err(e) => {
                warn!(error = %e, "Channel lookup failed");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rstest::rstest;

    const SAM: u64 = 123456789012345678;
    const LOBBY: u64 = 876543210987654321;

    fn options() -> NormalizeOptions {
        NormalizeOptions {
            at_word: " at ".to_string(),
            ampersand_word: " and ".to_string(),
            mention_fallback: MentionFallback::Remove,
        }
    }

    fn context() -> StaticRenderContext {
        StaticRenderContext::new()
            .with_member(SAM, "Sam")
            .with_channel(LOBBY, "lobby")
    }

    struct FailingChannels;

    #[async_trait]
    impl RenderContext for FailingChannels {
        fn member_display_name(&self, _user: UserId) -> Option<String> {
            None
        }

        async fn channel_name(&self, channel: ChannelId) -> Result<Option<String>, ResolveError> {
            Err(ResolveError::Lookup {
                channel,
                error: anyhow::anyhow!("gateway unavailable"),
            })
        }
    }

    #[rstest]
    #[case("hello world")]
    #[case("what's up, 안녕하세요!")]
    #[case("numbers 123 and dots...")]
    #[case("")]
    #[tokio::test]
    async fn test_plain_text_is_unchanged(#[case] input: &str) {
        assert_eq!(normalize(input, &context(), &options()).await, input);
    }

    #[rstest]
    #[case("a@b", "a at b")]
    #[case("rock & roll", "rock  and  roll")]
    #[case("@&", " at  and ")]
    #[tokio::test]
    async fn test_at_and_ampersand_become_words(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input, &context(), &options()).await, expected);
    }

    #[rstest]
    #[case("a{b}c", "a b c")]
    #[case("**bold**", "  bold  ")]
    #[case("`code`", " code ")]
    #[case("x = (1 + 2) / 3", "x    1 + 2    3")]
    #[case(r"C:\path|pipe;semi", "C  path pipe semi")]
    #[case("[]~^_#<>", "        ")]
    #[tokio::test]
    async fn test_each_symbol_becomes_one_space(#[case] input: &str, #[case] expected: &str) {
        let out = normalize(input, &context(), &options()).await;
        assert_eq!(out, expected);
        assert_eq!(out.chars().count(), input.chars().count());
    }

    #[tokio::test]
    async fn test_user_mention_resolves_to_display_name() {
        let input = format!("hello <@!{SAM}> &friends");
        let out = normalize(&input, &context(), &options()).await;

        assert_eq!(out, "hello Sam  and friends");
        assert!(!out.contains('<') && !out.contains('>'));
        assert!(!out.contains(&SAM.to_string()));
    }

    #[tokio::test]
    async fn test_modern_user_mention_form() {
        let out = normalize(&format!("<@{SAM}>!"), &context(), &options()).await;
        assert_eq!(out, "Sam!");
    }

    #[tokio::test]
    async fn test_channel_mention_resolves_to_name() {
        let out = normalize(&format!("join <#{LOBBY}> now"), &context(), &options()).await;
        assert_eq!(out, "join lobby now");
    }

    #[tokio::test]
    async fn test_unresolved_mention_is_removed_by_default() {
        let out = normalize("hi <@!111111111111111111>.", &context(), &options()).await;
        assert_eq!(out, "hi .");
    }

    #[tokio::test]
    async fn test_unresolved_mention_raw_id_fallback() {
        let options = NormalizeOptions {
            mention_fallback: MentionFallback::RawId,
            ..options()
        };
        let out = normalize("hi <#111111111111111111>", &context(), &options).await;
        assert_eq!(out, "hi 111111111111111111");
    }

    #[tokio::test]
    async fn test_channel_lookup_error_uses_fallback() {
        let out = normalize(&format!("in <#{LOBBY}>"), &FailingChannels, &options()).await;
        assert_eq!(out, "in ");
    }

    #[tokio::test]
    async fn test_short_ids_are_not_mentions() {
        let out = normalize("<@!123>", &context(), &options()).await;
        assert_eq!(out, "  at !123 ");
    }

    #[tokio::test]
    async fn test_display_names_are_sanitized_too() {
        let ctx = StaticRenderContext::new().with_member(SAM, "~sam_the_man~");
        let out = normalize(&format!("<@!{SAM}>"), &ctx, &options()).await;
        assert_eq!(out, " sam the man ");
    }

    #[test]
    fn test_mention_fallback_parses_from_str() {
        assert_eq!("raw_id".parse::<MentionFallback>().unwrap(), MentionFallback::RawId);
        assert_eq!(MentionFallback::Remove.to_string(), "remove");
    }
}
