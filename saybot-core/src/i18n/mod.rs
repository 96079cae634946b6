//! Localized reply text and command metadata.

pub mod table;

use std::collections::BTreeMap;
use std::fmt::Display;

pub use table::StringTable;

/// Source of localized strings keyed by dotted identifiers such as
/// `tts.speak.text`.
pub trait Localizer: Send + Sync {
    /// Locale used when a lookup misses in the requested locale.
    fn default_locale(&self) -> &str;

    /// The string for `key` in exactly `locale`, without any fallback.
    fn get(&self, locale: &str, key: &str) -> Option<String>;

    /// Every translation of `key`, keyed by locale.
    fn get_all(&self, key: &str) -> BTreeMap<String, String>;

    /// The string for `key` in `locale`, falling back to the default locale
    /// and finally to the key itself so a missing translation is visible
    /// rather than silent.
    fn text(&self, locale: &str, key: &str) -> String {
        self.get(locale, key)
            .or_else(|| self.get(self.default_locale(), key))
            .unwrap_or_else(|| key.to_string())
    }

    /// `text` with `{0}`, `{1}`, ... replaced by `args`.
    fn format(&self, locale: &str, key: &str, args: &[&dyn Display]) -> String {
        format_placeholders(&self.text(locale, key), args)
    }
}

/// Replaces positional `{N}` placeholders. Placeholders without a matching
/// argument are left untouched.
pub fn format_placeholders(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substituted = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            let arg = args.get(index)?;
            Some((arg.to_string(), close))
        });

        match substituted {
            Some((value, close)) => {
                out.push_str(&value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_placeholders_in_any_order() {
        let out = format_placeholders("{1} then {0}, again {1}", &[&"a", &2]);
        assert_eq!(out, "2 then a, again 2");
    }

    #[test]
    fn test_format_placeholders_keeps_unknown() {
        let out = format_placeholders("{0} {5} {x} {", &[&"only"]);
        assert_eq!(out, "only {5} {x} {");
    }

    #[test]
    fn test_format_placeholders_without_placeholders() {
        assert_eq!(format_placeholders("plain text", &[&"unused"]), "plain text");
    }
}
