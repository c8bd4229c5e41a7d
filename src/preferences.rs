//! Persisted defaults for the reader's display settings.
//!
//! Values live in the `settings` table of the config database as strings.
//! Only the binary and the MCP server read them; the library functions
//! take a [`DisplayPreferences`] snapshot instead.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{
    config_db::ConfigDb,
    corpus::ChapterOrder,
    error::{Error, Result},
    format::DisplayPreferences,
    language::{Language, SecondaryLanguage},
};

/// A persisted preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum PreferenceKey {
    Subtitles,
    Footnotes,
    Arabic,
    Transliteration,
    PrimaryLanguage,
    SecondaryLanguage,
    SortChaptersByRevelationOrder,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 7] = [
        PreferenceKey::Subtitles,
        PreferenceKey::Footnotes,
        PreferenceKey::Arabic,
        PreferenceKey::Transliteration,
        PreferenceKey::PrimaryLanguage,
        PreferenceKey::SecondaryLanguage,
        PreferenceKey::SortChaptersByRevelationOrder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PreferenceKey::Subtitles => "subtitles",
            PreferenceKey::Footnotes => "footnotes",
            PreferenceKey::Arabic => "arabic",
            PreferenceKey::Transliteration => "transliteration",
            PreferenceKey::PrimaryLanguage => "primary_language",
            PreferenceKey::SecondaryLanguage => "secondary_language",
            PreferenceKey::SortChaptersByRevelationOrder => {
                "sort_chapters_by_revelation_order"
            }
        }
    }

    pub fn default_value(self) -> &'static str {
        match self {
            PreferenceKey::Subtitles | PreferenceKey::Footnotes => "true",
            PreferenceKey::Arabic
            | PreferenceKey::Transliteration
            | PreferenceKey::SortChaptersByRevelationOrder => "false",
            PreferenceKey::PrimaryLanguage => "english",
            PreferenceKey::SecondaryLanguage => "none",
        }
    }

    /// Normalize a user-supplied value, rejecting anything that would not
    /// load back.
    pub fn validate(self, value: &str) -> Result<String> {
        match self {
            PreferenceKey::PrimaryLanguage => {
                Ok(value.parse::<Language>()?.to_string())
            }
            PreferenceKey::SecondaryLanguage => {
                Ok(value.parse::<SecondaryLanguage>()?.to_string())
            }
            _ => parse_bool(value).map(|b| b.to_string()).ok_or_else(|| {
                Error::Config(format!(
                    "{} expects true or false, got '{value}'",
                    self.as_str()
                ))
            }),
        }
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreferenceKey {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PreferenceKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::NotFound {
                kind: "preference",
                name: s.to_string(),
            })
    }
}

/// Every persisted preference, resolved against its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub display: DisplayPreferences,
    pub chapter_order: ChapterOrder,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            display: DisplayPreferences::default(),
            chapter_order: ChapterOrder::Mushaf,
        }
    }
}

impl Preferences {
    /// Read all preferences. Unreadable stored values fall back to their
    /// default with a warning.
    pub fn load(config_db: &ConfigDb) -> Result<Self> {
        let get = |key: PreferenceKey| -> Result<String> {
            config_db.get_setting_or(key.as_str(), key.default_value())
        };
        let flag = |key: PreferenceKey| -> Result<bool> {
            let raw = get(key)?;
            Ok(parse_bool(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    key = %key,
                    value = %raw,
                    "ignoring stored preference"
                );
                key.default_value() == "true"
            }))
        };
        let parsed = |key: PreferenceKey| -> Result<String> {
            let raw = get(key)?;
            Ok(key.validate(&raw).unwrap_or_else(|_| {
                tracing::warn!(
                    key = %key,
                    value = %raw,
                    "ignoring stored preference"
                );
                key.default_value().to_string()
            }))
        };

        let primary_language = parsed(PreferenceKey::PrimaryLanguage)?
            .parse::<Language>()?;
        let secondary_language = parsed(PreferenceKey::SecondaryLanguage)?
            .parse::<SecondaryLanguage>()?;

        Ok(Self {
            display: DisplayPreferences {
                show_subtitles: flag(PreferenceKey::Subtitles)?,
                show_footnotes: flag(PreferenceKey::Footnotes)?,
                show_arabic: flag(PreferenceKey::Arabic)?,
                show_transliteration: flag(PreferenceKey::Transliteration)?,
                primary_language,
                secondary_language,
            },
            chapter_order: if flag(
                PreferenceKey::SortChaptersByRevelationOrder,
            )? {
                ChapterOrder::Revelation
            } else {
                ChapterOrder::Mushaf
            },
        })
    }

    /// Validate and persist one preference.
    pub fn set(
        config_db: &ConfigDb,
        key: PreferenceKey,
        value: &str,
    ) -> Result<String> {
        let normalized = key.validate(value)?;
        config_db.set_setting(key.as_str(), &normalized)?;
        Ok(normalized)
    }

    /// Drop the stored value of `key`, or of every preference.
    pub fn reset(
        config_db: &ConfigDb,
        key: Option<PreferenceKey>,
    ) -> Result<()> {
        match key {
            Some(key) => {
                config_db.remove_setting(key.as_str())?;
            }
            None => {
                for key in PreferenceKey::ALL {
                    config_db.remove_setting(key.as_str())?;
                }
            }
        }
        Ok(())
    }

    /// Current value of every preference, for display.
    pub fn entries(&self) -> Vec<PreferenceEntry> {
        let d = &self.display;
        let value = |key: PreferenceKey| -> String {
            match key {
                PreferenceKey::Subtitles => d.show_subtitles.to_string(),
                PreferenceKey::Footnotes => d.show_footnotes.to_string(),
                PreferenceKey::Arabic => d.show_arabic.to_string(),
                PreferenceKey::Transliteration => {
                    d.show_transliteration.to_string()
                }
                PreferenceKey::PrimaryLanguage => d.primary_language.to_string(),
                PreferenceKey::SecondaryLanguage => {
                    d.secondary_language.to_string()
                }
                PreferenceKey::SortChaptersByRevelationOrder => {
                    (self.chapter_order == ChapterOrder::Revelation).to_string()
                }
            }
        };

        PreferenceKey::ALL
            .into_iter()
            .map(|key| PreferenceEntry {
                key: key.as_str(),
                value: value(key),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceEntry {
    pub key: &'static str,
    pub value: String,
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
