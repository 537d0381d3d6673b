//! Per-language weight mapping produced by a scan.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Aggregate language composition of one commit: language name → weight.
///
/// Languages with zero weight are never stored, so two scans that classify
/// the same files always compare equal regardless of the order in which
/// weights were added and removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageStats(BTreeMap<String, u64>);

/// Subtracting a weight that the mapping does not hold.
///
/// Only happens when a cached baseline does not describe the commit it
/// claims to describe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot remove {requested} from '{language}' (holds {available})")]
pub struct StatsUnderflow {
    /// The language whose weight would go negative.
    pub language: String,
    /// Weight currently recorded for the language.
    pub available: u64,
    /// Weight that was asked to be removed.
    pub requested: u64,
}

impl LanguageStats {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the weight recorded for `language`, or zero.
    pub fn get(&self, language: &str) -> u64 {
        self.0.get(language).copied().unwrap_or(0)
    }

    /// Adds `weight` to `language`.
    pub fn add(&mut self, language: &str, weight: u64) {
        if weight == 0 {
            return;
        }
        let entry = self.0.entry(language.to_string()).or_insert(0);
        *entry = entry.saturating_add(weight);
    }

    /// Removes `weight` from `language`, dropping the entry when it reaches
    /// zero. The mapping is left untouched on underflow.
    pub fn subtract(&mut self, language: &str, weight: u64) -> Result<(), StatsUnderflow> {
        if weight == 0 {
            return Ok(());
        }
        let available = self.get(language);
        let remaining = available
            .checked_sub(weight)
            .ok_or_else(|| StatsUnderflow {
                language: language.to_string(),
                available,
                requested: weight,
            })?;
        if remaining == 0 {
            self.0.remove(language);
        } else {
            self.0.insert(language.to_string(), remaining);
        }
        Ok(())
    }

    /// Number of languages present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no language has any weight.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates languages in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, u64> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, u64>> for LanguageStats {
    fn from(map: BTreeMap<String, u64>) -> Self {
        map.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for LanguageStats {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut stats = Self::new();
        for (language, weight) in iter {
            let language: String = language.into();
            stats.add(&language, weight);
        }
        stats
    }
}

impl<'a> IntoIterator for &'a LanguageStats {
    type Item = (&'a String, &'a u64);
    type IntoIter = btree_map::Iter<'a, String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
