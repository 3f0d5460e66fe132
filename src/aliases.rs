//! Header alias resolution.
//!
//! Exports from different meters spell the same column several ways. Every
//! header cell is mapped to one canonical name before the table is built, so
//! validation and aggregation only ever see canonical names.

use std::collections::HashMap;

const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("Energy_Consumption (kWh)", "Energy_Consumption"),
    ("Energy Consumption", "Energy_Consumption"),
    ("Energy Consumption (kWh)", "Energy_Consumption"),
    ("Energy_Consumption_kWh", "Energy_Consumption"),
    ("Energy Source", "Energy_Source"),
];

const BOM: char = '\u{feff}';

/// Alias table consulted while reading the header row.
///
/// Configured aliases shadow the built-in ones.
#[derive(Debug, Clone, Default)]
pub struct HeaderAliases {
    extra: HashMap<String, String>,
}

impl HeaderAliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let extra: HashMap<String, String> = entries
            .into_iter()
            .map(|(raw, canonical)| {
                let raw: String = raw.into();
                let canonical: String = canonical.into();
                (raw.trim().to_string(), canonical)
            })
            .collect();
        Self { extra }
    }

    /// Returns the canonical column name for a raw header cell.
    pub fn canonical<'a>(&'a self, raw: &'a str) -> &'a str {
        let cleaned = clean_header(raw);
        if let Some(mapped) = self.extra.get(cleaned) {
            return mapped.as_str();
        }
        if let Some((_, canonical)) = BUILTIN_ALIASES.iter().find(|(alias, _)| *alias == cleaned)
        {
            return *canonical;
        }
        cleaned
    }

    pub fn len(&self) -> usize {
        BUILTIN_ALIASES.len() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn clean_header(raw: &str) -> &str {
    raw.trim_start_matches(BOM).trim()
}
