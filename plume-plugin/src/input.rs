//! Registration input
//!
//! Two JSON shapes describe a plugin registration:
//! - tuple: `{"foo|altfoo": ["Data", {"help": "..."}]}`
//! - dict:  `{"foo|altfoo": {"class": "Data", "help": "..."}}`

use crate::ClassRef;
use plume_core::{normalize_name, PluginError, SettingDecl, Value};

/// Class plus setting overrides for one registration
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub class: ClassRef,
    pub overrides: Vec<(String, SettingDecl)>,
}

impl Registration {
    pub fn new(class: impl Into<ClassRef>) -> Self {
        Self { class: class.into(), overrides: Vec::new() }
    }

    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.overrides.push((normalize_name(name), SettingDecl::value(value)));
        self
    }

    pub fn define(mut self, name: &str, help: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.push((normalize_name(name), SettingDecl::define(help, value)));
        self
    }

    /// `["Class", {overrides}]`, the overrides object being optional
    pub fn from_tuple_json(key: &str, json: &serde_json::Value) -> Result<Self, PluginError> {
        let items = json.as_array().ok_or_else(|| invalid(key, "expected [class, {settings}]"))?;
        match items.as_slice() {
            [class] => Ok(Self::new(ClassRef::from_json(class)?)),
            [class, overrides] => {
                let mut registration = Self::new(ClassRef::from_json(class)?);
                let overrides = overrides
                    .as_object()
                    .ok_or_else(|| invalid(key, "settings must be an object"))?;
                for (name, value) in overrides {
                    registration.overrides.push((normalize_name(name), SettingDecl::from_json(value)));
                }
                Ok(registration)
            }
            _ => Err(invalid(key, "expected [class, {settings}]")),
        }
    }

    /// `{"class": "Class", ...overrides}`
    pub fn from_dict_json(key: &str, json: &serde_json::Value) -> Result<Self, PluginError> {
        let fields = json.as_object().ok_or_else(|| invalid(key, "expected an object"))?;
        let class = fields.get("class").ok_or_else(|| invalid(key, "missing 'class'"))?;
        let mut registration = Self::new(ClassRef::from_json(class)?);
        for (name, value) in fields.iter().filter(|(name, _)| name.as_str() != "class") {
            registration.overrides.push((normalize_name(name), SettingDecl::from_json(value)));
        }
        Ok(registration)
    }

    /// Either shape, chosen by the JSON type
    pub fn from_json(key: &str, json: &serde_json::Value) -> Result<Self, PluginError> {
        if json.is_object() {
            Self::from_dict_json(key, json)
        } else {
            Self::from_tuple_json(key, json)
        }
    }
}

/// Entries of a registration document, keys left unsplit
pub(crate) fn entries<'a>(
    json: &'a serde_json::Value,
) -> Result<impl Iterator<Item = (&'a String, &'a serde_json::Value)>, PluginError> {
    json.as_object()
        .map(|map| map.iter())
        .ok_or_else(|| invalid("*", "registration table must be an object"))
}

fn invalid(key: &str, reason: &str) -> PluginError {
    PluginError::InvalidRegistration { alias: key.to_string(), reason: reason.to_string() }
}
