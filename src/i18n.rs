// Static translation bundle and locale handling for the resolution layer

use anyhow::{Context, Result};
use fluent_langneg::{accepted_languages, negotiate_languages, NegotiationStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use unic_langid::LanguageIdentifier;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Zh,
    Es,
    Hi,
    Ar,
    Bn,
    Pt,
    Ru,
    Ja,
    De,
    Te,
}

impl Locale {
    pub const ALL: [Locale; 11] = [
        Locale::En,
        Locale::Zh,
        Locale::Es,
        Locale::Hi,
        Locale::Ar,
        Locale::Bn,
        Locale::Pt,
        Locale::Ru,
        Locale::Ja,
        Locale::De,
        Locale::Te,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
            Locale::Es => "es",
            Locale::Hi => "hi",
            Locale::Ar => "ar",
            Locale::Bn => "bn",
            Locale::Pt => "pt",
            Locale::Ru => "ru",
            Locale::Ja => "ja",
            Locale::De => "de",
            Locale::Te => "te",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnsupportedLocale(pub String);

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    /// Accepts bare codes ("ja") as well as tagged forms ("zh-CN", "pt_BR").
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let primary = raw
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default();
        Locale::from_code(primary).ok_or_else(|| UnsupportedLocale(raw.to_string()))
    }
}

/**
 * negotiate_locale
 * Picks the best supported locale for an Accept-Language header, falling back to en.
 */
pub fn negotiate_locale(accept_language: Option<&str>) -> Locale {
    let Some(header) = accept_language.filter(|h| !h.trim().is_empty()) else {
        return Locale::En;
    };

    let requested = accepted_languages::parse(header);
    let available: Vec<LanguageIdentifier> = Locale::ALL
        .iter()
        .filter_map(|l| l.code().parse().ok())
        .collect();
    let default: LanguageIdentifier = match Locale::En.code().parse() {
        Ok(id) => id,
        Err(_) => return Locale::En,
    };

    negotiate_languages(
        &requested,
        &available,
        Some(&default),
        NegotiationStrategy::Filtering,
    )
    .first()
    .and_then(|id| Locale::from_code(id.language.as_str()))
    .unwrap_or(Locale::En)
}

const EN_JSON: &str = include_str!("../locales/en.json");
const ZH_JSON: &str = include_str!("../locales/zh.json");
const ES_JSON: &str = include_str!("../locales/es.json");

/// Locale-keyed dictionaries. `en` is complete; other locales may be partial or absent.
#[derive(Debug, Clone, Default)]
pub struct StaticBundle {
    messages: HashMap<Locale, HashMap<String, String>>,
}

impl StaticBundle {
    /// Parses the dictionaries compiled into the binary.
    pub fn load() -> Result<Self> {
        let mut messages = HashMap::new();
        for (locale, raw) in [(Locale::En, EN_JSON), (Locale::Zh, ZH_JSON), (Locale::Es, ES_JSON)] {
            let dict: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("invalid {} translation bundle", locale))?;
            messages.insert(locale, dict);
        }
        Ok(Self { messages })
    }

    #[cfg(test)]
    pub fn from_maps(messages: HashMap<Locale, HashMap<String, String>>) -> Self {
        Self { messages }
    }

    pub fn get(&self, locale: Locale, key: &str) -> Option<&str> {
        self.messages
            .get(&locale)
            .and_then(|dict| dict.get(key))
            .map(String::as_str)
    }

    /// English text for `key`, or the key itself.
    pub fn source_text<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(Locale::En, key).unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_english() {
        let bundle = StaticBundle::load().unwrap();
        assert_eq!(bundle.get(Locale::En, "buy_now"), Some("Buy Now"));
        assert_eq!(bundle.source_text("missing_key"), "missing_key");
    }

    #[test]
    fn test_bundle_chinese_partial() {
        let bundle = StaticBundle::load().unwrap();
        assert_eq!(bundle.get(Locale::Zh, "buy_now"), Some("立即购买"));
        assert_eq!(bundle.get(Locale::Zh, "occasion"), None);
        assert_eq!(bundle.get(Locale::Ja, "buy_now"), None);
    }

    #[test]
    fn test_partial_bundles_only_use_english_keys() {
        let bundle = StaticBundle::load().unwrap();
        for locale in [Locale::Zh, Locale::Es] {
            for key in bundle.messages[&locale].keys() {
                assert!(bundle.get(Locale::En, key).is_some(), "{locale}:{key}");
            }
        }
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!("zh-CN".parse::<Locale>(), Ok(Locale::Zh));
        assert_eq!("PT_br".parse::<Locale>(), Ok(Locale::Pt));
        let err = "fr".parse::<Locale>().unwrap_err();
        assert_eq!(err, UnsupportedLocale("fr".into()));
        assert_eq!(err.to_string(), "unsupported locale: fr");
    }

    #[test]
    fn test_negotiate_locale() {
        assert_eq!(negotiate_locale(None), Locale::En);
        assert_eq!(negotiate_locale(Some("ja-JP,ja;q=0.9,en;q=0.8")), Locale::Ja);
        assert_eq!(negotiate_locale(Some("fr-FR,de;q=0.7")), Locale::De);
        assert_eq!(negotiate_locale(Some("fr-FR")), Locale::En);
    }
}
