//! Settings tables
//!
//! A settings table maps a setting name to its help text and value. Names use
//! `-` as separator; `_` is accepted on input and rewritten, so
//! `write_header` and `write-header` are the same entry.

use crate::{PluginError, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Canonical form of a setting name
pub fn normalize_name(name: &str) -> String {
    name.replace('_', "-")
}

/// One entry of a settings table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub help: String,
    pub value: Value,
}

impl Setting {
    pub fn new(help: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { help: help.into(), value: value.into() }
    }
}

/// A declared change to a settings table.
///
/// `Define` carries a help string and introduces (or redefines) an entry.
/// `Override` carries a bare value and may only target an existing entry.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingDecl {
    Define { help: String, value: Value },
    Override(Value),
}

impl SettingDecl {
    pub fn define(help: impl Into<String>, value: impl Into<Value>) -> Self {
        SettingDecl::Define { help: help.into(), value: value.into() }
    }

    pub fn value(value: impl Into<Value>) -> Self {
        SettingDecl::Override(value.into())
    }

    /// Read a declaration from JSON: `["help", value]` defines, anything
    /// else is a bare override.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json.as_array().map(Vec::as_slice) {
            Some([serde_json::Value::String(help), value]) => SettingDecl::Define {
                help: help.clone(),
                value: Value::from_json(value),
            },
            _ => SettingDecl::Override(Value::from_json(json)),
        }
    }
}

impl From<Setting> for SettingDecl {
    fn from(setting: Setting) -> Self {
        SettingDecl::Define { help: setting.help, value: setting.value }
    }
}

/// Ordered table of settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsTable {
    entries: IndexMap<String, Setting>,
}

impl SettingsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Introduce `name`, or redefine it together with a new help string.
    pub fn define(&mut self, name: &str, help: impl Into<String>, default: impl Into<Value>) -> Result<(), PluginError> {
        let name = normalize_name(name);
        let help = help.into();
        if help.trim().is_empty() {
            return Err(if self.entries.contains_key(&name) {
                PluginError::DuplicateWithoutHelp { name }
            } else {
                PluginError::UnknownSetting { name }
            });
        }
        self.entries.insert(name, Setting { help, value: default.into() });
        Ok(())
    }

    /// Replace the value of an existing entry, keeping its help text.
    pub fn override_value(&mut self, name: &str, value: impl Into<Value>) -> Result<(), PluginError> {
        let name = normalize_name(name);
        match self.entries.get_mut(&name) {
            Some(setting) => {
                setting.value = value.into();
                Ok(())
            }
            None => Err(PluginError::UnknownSetting { name }),
        }
    }

    pub fn apply(&mut self, name: &str, decl: SettingDecl) -> Result<(), PluginError> {
        match decl {
            SettingDecl::Define { help, value } => self.define(name, help, value),
            SettingDecl::Override(value) => self.override_value(name, value),
        }
    }

    /// Remove an entry. Unknown names are ignored.
    pub fn unset(&mut self, name: &str) {
        self.entries.shift_remove(&normalize_name(name));
    }

    pub fn get(&self, name: &str) -> Result<&Setting, PluginError> {
        let name = normalize_name(name);
        self.entries.get(&name).ok_or(PluginError::NoSuchSetting { name })
    }

    pub fn get_safe(&self, name: &str) -> Option<&Setting> {
        self.entries.get(&normalize_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_name(name))
    }

    /// Names of every entry except those in `excluding`, in definition order
    pub fn values(&self, excluding: &[&str]) -> Vec<String> {
        let excluded: Vec<String> = excluding.iter().map(|n| normalize_name(n)).collect();
        self.entries
            .keys()
            .filter(|name| !excluded.contains(name))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Setting)> {
        self.entries.iter().map(|(name, setting)| (name.as_str(), setting))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Setting)> for SettingsTable {
    fn from_iter<I: IntoIterator<Item = (S, Setting)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, setting)| (normalize_name(name.as_ref()), setting))
                .collect(),
        }
    }
}
