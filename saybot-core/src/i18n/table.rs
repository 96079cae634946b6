use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::Localizer;

const BUILTIN_TABLES: &[(&str, &str)] = &[
    ("en-US", include_str!("../../locales/en-US.toml")),
    ("ko-KR", include_str!("../../locales/ko-KR.toml")),
];

/// In-memory string tables, one flat `key = "value"` TOML document per
/// locale.
#[derive(Debug, Clone)]
pub struct StringTable {
    default_locale: String,
    tables: HashMap<String, HashMap<String, String>>,
}

impl StringTable {
    pub fn empty(default_locale: &str) -> Self {
        Self {
            default_locale: default_locale.to_string(),
            tables: HashMap::new(),
        }
    }

    /// The tables compiled into the binary.
    pub fn builtin(default_locale: &str) -> Result<Self> {
        let mut table = Self::empty(default_locale);
        for (locale, contents) in BUILTIN_TABLES {
            table
                .merge_toml(locale, contents)
                .with_context(|| format!("Built-in string table {locale} is invalid"))?;
        }
        Ok(table)
    }

    /// Built-in tables extended by every `<locale>.toml` file in `dir`.
    /// Keys in the directory override built-in ones.
    pub fn with_overrides(default_locale: &str, dir: &Path) -> Result<Self> {
        let mut table = Self::builtin(default_locale)?;
        table.load_dir(dir)?;
        Ok(table)
    }

    pub fn load_dir(&mut self, dir: &Path) -> Result<()> {
        let entries =
            fs::read_dir(dir).with_context(|| format!("Failed to read locale dir {dir:?}"))?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read string table {path:?}"))?;
            self.merge_toml(locale, &contents)
                .with_context(|| format!("Invalid string table {path:?}"))?;
            info!(locale, ?path, "Loaded string table");
        }

        Ok(())
    }

    pub fn merge_toml(&mut self, locale: &str, contents: &str) -> Result<()> {
        let entries: BTreeMap<String, String> = toml::from_str(contents)?;
        debug!(locale, keys = entries.len(), "Merging string table");
        self.tables
            .entry(locale.to_string())
            .or_default()
            .extend(entries);
        Ok(())
    }

    pub fn insert(&mut self, locale: &str, key: &str, value: &str) {
        self.tables
            .entry(locale.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }
}

impl Localizer for StringTable {
    fn default_locale(&self) -> &str {
        &self.default_locale
    }

    fn get(&self, locale: &str, key: &str) -> Option<String> {
        self.tables.get(locale)?.get(key).cloned()
    }

    fn get_all(&self, key: &str) -> BTreeMap<String, String> {
        self.tables
            .iter()
            .filter_map(|(locale, table)| Some((locale.clone(), table.get(key)?.clone())))
            .collect()
    }
}
