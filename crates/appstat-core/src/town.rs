//! Town name normalization
//!
//! Free-text town names are trimmed, lowercased, resolved through an alias
//! table and title-cased. The alias table is data: the built-in entries can
//! be extended at runtime (see `--town-alias` on the CLI).

use crate::error::{AppstatError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Built-in aliases, keyed by the trimmed lowercase spelling
static DEFAULT_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("yaounde", "yaoundé"),
        ("douala, yaoundé et edea", "yaoundé"),
        ("mélong, moungo-littoral", "mélong"),
    ])
});

/// Alias-based town normalizer
///
/// # Examples
/// ```
/// use appstat_core::town::TownNormalizer;
///
/// let towns = TownNormalizer::default();
/// assert_eq!(towns.normalize("  YAOUNDE "), "Yaoundé");
/// assert_eq!(towns.normalize("bafoussam"), "Bafoussam");
/// ```
#[derive(Debug, Clone)]
pub struct TownNormalizer {
    aliases: HashMap<String, String>,
}

impl Default for TownNormalizer {
    fn default() -> Self {
        Self {
            aliases: DEFAULT_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

impl TownNormalizer {
    /// A normalizer without any alias
    pub fn without_aliases() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Add or replace an alias; the key is matched after trim + lowercase
    pub fn with_alias(mut self, from: &str, to: &str) -> Self {
        self.aliases
            .insert(from.trim().to_lowercase(), to.trim().to_lowercase());
        self
    }

    /// Add an alias from a `FROM=TO` specification
    pub fn with_alias_spec(self, spec: &str) -> Result<Self> {
        match spec.split_once('=') {
            Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
                Ok(self.with_alias(from, to))
            }
            _ => Err(AppstatError::InvalidArgument(format!(
                "Invalid town alias '{spec}', expected FROM=TO"
            ))),
        }
    }

    /// Normalize a raw town name
    pub fn normalize(&self, raw: &str) -> String {
        let lowered = raw.trim().to_lowercase();
        let resolved = self
            .aliases
            .get(&lowered)
            .map(String::as_str)
            .unwrap_or(&lowered);
        title_case(resolved)
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
