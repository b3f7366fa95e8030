//! Alias resolution between short names and canonical "Controller[:action]" targets.
//!
//! # Design Decisions
//! - Built from the configured table by first reversing it (canonical → alias)
//!   and then inverting that map (alias → canonical)
//! - When several aliases share a canonical target, only the last one (in
//!   alias name order) survives in both directions
//! - Built once per app and cached in `RouteCaches`

use std::collections::{BTreeMap, HashMap};

/// Bidirectional alias lookup for one app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    to_canonical: HashMap<String, String>,
    to_alias: HashMap<String, String>,
}

impl AliasTable {
    /// Build from a configured alias → canonical table.
    pub fn build(configured: &BTreeMap<String, String>) -> Self {
        let mut to_alias = HashMap::with_capacity(configured.len());
        for (alias, canonical) in configured {
            to_alias.insert(canonical.clone(), alias.clone());
        }

        let to_canonical = to_alias
            .iter()
            .map(|(canonical, alias)| (alias.clone(), canonical.clone()))
            .collect();

        Self {
            to_canonical,
            to_alias,
        }
    }

    /// Canonical target for an alias name.
    pub fn canonical(&self, alias: &str) -> Option<&str> {
        self.to_canonical.get(alias).map(String::as_str)
    }

    /// Alias name for a canonical target.
    pub fn alias_for(&self, canonical: &str) -> Option<&str> {
        self.to_alias.get(canonical).map(String::as_str)
    }

    /// Replace `input` with its canonical target when it is an alias.
    pub fn resolve<'a>(&'a self, input: &'a str) -> &'a str {
        self.canonical(input).unwrap_or(input)
    }

    pub fn len(&self) -> usize {
        self.to_canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_canonical.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, &str)]) -> AliasTable {
        let configured = pairs
            .iter()
            .map(|(a, c)| (a.to_string(), c.to_string()))
            .collect();
        AliasTable::build(&configured)
    }

    #[test]
    fn test_lookup_both_ways() {
        let aliases = table(&[("home", "Main:index"), ("about", "Page:about")]);
        assert_eq!(aliases.canonical("home"), Some("Main:index"));
        assert_eq!(aliases.alias_for("Page:about"), Some("about"));
        assert_eq!(aliases.resolve("home"), "Main:index");
        assert_eq!(aliases.resolve("Main:list"), "Main:list");
    }

    #[test]
    fn test_round_trip_for_unique_targets() {
        let aliases = table(&[("a", "X:one"), ("b", "X:two")]);
        for alias in ["a", "b"] {
            let canonical = aliases.canonical(alias).unwrap();
            assert_eq!(aliases.alias_for(canonical), Some(alias));
        }
    }

    #[test]
    fn test_shared_target_keeps_last_alias() {
        let aliases = table(&[("first", "Main:index"), ("second", "Main:index")]);
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases.alias_for("Main:index"), Some("second"));
        assert_eq!(aliases.canonical("first"), None);
    }
}
