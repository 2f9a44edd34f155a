//! Locale-keyed translation lookup.

use std::collections::HashMap;

/// Translation lookup keyed by locale.
pub trait Translator: Send + Sync {
    /// Translate `key` for `locale`, or `None` when there is no entry.
    fn translate(&self, locale: &str, key: &str) -> Option<String>;
}

/// Translator that has no entries; every lookup falls back to the key.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTranslations;

impl Translator for NoTranslations {
    fn translate(&self, _locale: &str, _key: &str) -> Option<String> {
        None
    }
}

/// In-memory catalog of translation tables.
///
/// Lookups for a regional locale (`de-AT`) fall back to the base language
/// table (`de`).
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    tables: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single entry.
    pub fn entry(
        mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.tables
            .entry(locale.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Add a whole table for a locale.
    pub fn table<I, K, V>(mut self, locale: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = self.tables.entry(locale.into()).or_default();
        table.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }
}

impl Translator for Catalog {
    fn translate(&self, locale: &str, key: &str) -> Option<String> {
        let lookup = |loc: &str| self.tables.get(loc).and_then(|t| t.get(key)).cloned();
        lookup(locale).or_else(|| {
            let base = locale.split(['-', '_']).next()?;
            if base == locale { None } else { lookup(base) }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regional_locale_falls_back_to_base() {
        let catalog = Catalog::new()
            .entry("de", "Name", "Name (de)")
            .entry("de-AT", "Page", "Seite");

        assert_eq!(catalog.translate("de-AT", "Page").as_deref(), Some("Seite"));
        assert_eq!(catalog.translate("de-AT", "Name").as_deref(), Some("Name (de)"));
        assert_eq!(catalog.translate("fr", "Name"), None);
        assert_eq!(catalog.locales(), vec!["de", "de-AT"]);
    }
}
