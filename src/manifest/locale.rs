//! Localized strings keyed by locale tag (`en_US`, `zh_Hans`, ...).

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Locale used when neither the caller nor the loader configuration names one.
pub const DEFAULT_LOCALE: &str = "en_US";

/// An ordered `locale → text` map.
///
/// Entries keep document order so that the last-resort fallback ("first
/// available entry") is the one the plugin author wrote first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedText {
    entries: Vec<(String, String)>,
}

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Replaces the text of an existing locale in place.
    pub fn with(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(locale, text);
        self
    }

    pub fn insert(&mut self, locale: impl Into<String>, text: impl Into<String>) {
        let locale = locale.into();
        let text = text.into();
        match self.entries.iter_mut().find(|(l, _)| *l == locale) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((locale, text)),
        }
    }

    /// Exact lookup, no fallback.
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == locale)
            .map(|(_, t)| t.as_str())
    }

    /// Looks up `requested`, falling back in this order:
    ///
    /// 1. exact locale match
    /// 2. first entry sharing the language subtag (`zh_Hans` ~ `zh-CN`)
    /// 3. `default_locale`
    /// 4. first non-empty entry in document order
    pub fn resolve(&self, requested: &str, default_locale: &str) -> Option<&str> {
        let present = |t: &&str| !t.trim().is_empty();

        if let Some(text) = self.get(requested).filter(present) {
            return Some(text);
        }

        let language = language_subtag(requested);
        if let Some(text) = self
            .entries
            .iter()
            .find(|(l, t)| language_subtag(l).eq_ignore_ascii_case(language) && !t.trim().is_empty())
            .map(|(_, t)| t.as_str())
        {
            return Some(text);
        }

        if let Some(text) = self.get(default_locale).filter(present) {
            return Some(text);
        }

        self.entries
            .iter()
            .map(|(_, t)| t.as_str())
            .find(present)
    }

    /// True when at least one locale carries non-blank text.
    pub fn has_text(&self) -> bool {
        self.entries.iter().any(|(_, t)| !t.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }
}

impl<L: Into<String>, T: Into<String>> FromIterator<(L, T)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (L, T)>>(iter: I) -> Self {
        let mut text = Self::new();
        for (locale, value) in iter {
            text.insert(locale, value);
        }
        text
    }
}

fn language_subtag(tag: &str) -> &str {
    tag.split(['_', '-']).next().unwrap_or(tag)
}

impl Serialize for LocalizedText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (locale, text) in &self.entries {
            map.serialize_entry(locale, text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LocalizedTextVisitor;

        impl<'de> Visitor<'de> for LocalizedTextVisitor {
            type Value = LocalizedText;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of locale to string")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(LocalizedText::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, String)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((locale, text)) = access.next_entry::<String, String>()? {
                    if entries.iter().any(|(l, _)| *l == locale) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate locale '{locale}'"
                        )));
                    }
                    entries.push((locale, text));
                }
                Ok(LocalizedText { entries })
            }
        }

        deserializer.deserialize_map(LocalizedTextVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LocalizedText {
        LocalizedText::new()
            .with("zh_Hans", "喜报生成器")
            .with("en_US", "Good News Generator")
    }

    #[test]
    fn test_exact_match() {
        let text = sample();
        assert_eq!(text.resolve("zh_Hans", DEFAULT_LOCALE), Some("喜报生成器"));
        assert_eq!(text.get("en_US"), Some("Good News Generator"));
        assert_eq!(text.get("ja_JP"), None);
    }

    #[test]
    fn test_language_subtag_fallback() {
        let text = sample();
        assert_eq!(text.resolve("zh-CN", DEFAULT_LOCALE), Some("喜报生成器"));
        assert_eq!(text.resolve("en_GB", "zh_Hans"), Some("Good News Generator"));
    }

    #[test]
    fn test_default_locale_fallback() {
        let text = sample();
        assert_eq!(text.resolve("ja_JP", "en_US"), Some("Good News Generator"));
        assert_eq!(text.resolve("ja_JP", "zh_Hans"), Some("喜报生成器"));
    }

    #[test]
    fn test_first_entry_fallback_skips_blank() {
        let text = LocalizedText::new()
            .with("fr_FR", "  ")
            .with("de_DE", "Gute Nachrichten")
            .with("en_US", "Good news");
        assert_eq!(text.resolve("ja_JP", "es_ES"), Some("Gute Nachrichten"));
    }

    #[test]
    fn test_empty_resolves_to_none() {
        let text = LocalizedText::new();
        assert_eq!(text.resolve("en_US", "en_US"), None);
        assert!(!text.has_text());
        assert!(text.is_empty());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut text = sample();
        text.insert("zh_Hans", "悲报");
        assert_eq!(text.len(), 2);
        assert_eq!(text.locales().next(), Some("zh_Hans"));
        assert_eq!(text.get("zh_Hans"), Some("悲报"));
    }

    #[test]
    fn test_deserialize_preserves_order() {
        let text: LocalizedText =
            serde_yaml_bw::from_str("zh_Hans: 字体路径\nen_US: Font Path\n").unwrap();
        let locales: Vec<&str> = text.locales().collect();
        assert_eq!(locales, vec!["zh_Hans", "en_US"]);
    }

    #[test]
    fn test_deserialize_rejects_non_string_text() {
        let result: Result<LocalizedText, _> = serde_yaml_bw::from_str("en_US: [1, 2]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_as_map() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["en_US"], "Good News Generator");
        assert_eq!(json["zh_Hans"], "喜报生成器");
    }
}
