//! Alias registry

use crate::ClassId;
use indexmap::IndexMap;
use plume_core::{SettingDecl, Value};

/// One alias or several
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasSpec {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for AliasSpec {
    fn from(alias: &str) -> Self {
        AliasSpec::One(alias.to_string())
    }
}

impl From<String> for AliasSpec {
    fn from(alias: String) -> Self {
        AliasSpec::One(alias)
    }
}

impl From<Vec<String>> for AliasSpec {
    fn from(aliases: Vec<String>) -> Self {
        AliasSpec::Many(aliases)
    }
}

impl From<Vec<&str>> for AliasSpec {
    fn from(aliases: Vec<&str>) -> Self {
        AliasSpec::Many(aliases.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for AliasSpec {
    fn from(aliases: &[&str]) -> Self {
        AliasSpec::Many(aliases.iter().map(|a| a.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AliasSpec {
    fn from(aliases: [&str; N]) -> Self {
        AliasSpec::Many(aliases.iter().map(|a| a.to_string()).collect())
    }
}

/// Normalize one alias or a list of aliases to a list of lower-cased,
/// non-empty, distinct aliases. Input order is kept.
pub fn standardize_alias_or_aliases(spec: impl Into<AliasSpec>) -> Vec<String> {
    let raw = match spec.into() {
        AliasSpec::One(alias) => vec![alias],
        AliasSpec::Many(aliases) => aliases,
    };
    let mut aliases: Vec<String> = Vec::with_capacity(raw.len());
    for alias in raw {
        let alias = alias.trim().to_lowercase();
        if !alias.is_empty() && !aliases.contains(&alias) {
            aliases.push(alias);
        }
    }
    aliases
}

/// Split a registration key such as `"foo|altfoo"` into its aliases
pub fn split_alias_key(key: &str) -> Vec<String> {
    standardize_alias_or_aliases(key.split('|').map(String::from).collect::<Vec<_>>())
}

/// What the registry stores for an alias
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub class: ClassId,
    /// Every alias of the registration this entry came from
    pub aliases: Vec<String>,
    /// Explicit overrides, applied with `update_settings` rules
    pub overrides: Vec<(String, SettingDecl)>,
    /// Values bound only when the merged table still has the setting
    pub(crate) implicit: Vec<(String, Value)>,
    pub(crate) registration: usize,
}

/// Alias -> entry mapping of one family
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<String, Entry>,
    registrations: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `class` under every alias. A later registration under the
    /// same alias replaces the earlier one. Returns the replaced classes.
    pub(crate) fn register(
        &mut self,
        aliases: Vec<String>,
        class: ClassId,
        overrides: Vec<(String, SettingDecl)>,
        implicit: Vec<(String, Value)>,
    ) -> Vec<(String, ClassId)> {
        let registration = self.registrations;
        self.registrations += 1;

        let mut replaced = Vec::new();
        for alias in &aliases {
            let entry = Entry {
                class,
                aliases: aliases.clone(),
                overrides: overrides.clone(),
                implicit: implicit.clone(),
                registration,
            };
            if let Some(previous) = self.entries.insert(alias.clone(), entry) {
                replaced.push((alias.clone(), previous.class));
            }
        }
        replaced
    }

    pub fn get(&self, alias: &str) -> Option<&Entry> {
        self.entries.get(&alias.trim().to_lowercase())
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.get(alias).is_some()
    }

    /// Registered aliases, in registration order
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
