//! Constructed plugins and their settings

use crate::Plugin;
use indexmap::IndexMap;
use plume_core::{normalize_name, resolve_with, PluginError, SettingDecl, SettingsTable, Value};
use std::ops::{Deref, DerefMut};

/// A plugin object together with the alias it was created under and its own
/// copy of the merged settings.
pub struct PluginInstance<P: ?Sized> {
    alias: String,
    class_name: String,
    settings: SettingsTable,
    object: Box<P>,
}

impl<P: ?Sized> PluginInstance<P> {
    pub(crate) fn new(alias: String, class_name: String, settings: SettingsTable, object: Box<P>) -> Self {
        Self { alias, class_name, settings, object }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Display name: the first registered alias, capitalized
    pub fn name(&self) -> String {
        let first = self
            .settings
            .get_safe("aliases")
            .and_then(|s| s.value.as_list())
            .and_then(|aliases| aliases.first())
            .and_then(Value::as_text)
            .unwrap_or(self.alias.as_str());
        let mut chars = first.chars();
        match chars.next() {
            Some(c) => c.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn settings(&self) -> &SettingsTable {
        &self.settings
    }

    /// Value of `name` with environment references expanded
    pub fn setting(&self, name: &str) -> Result<Value, PluginError> {
        self.setting_with(name, |var| std::env::var(var).ok())
    }

    /// Like `setting`, reading environment variables through `lookup`
    pub fn setting_with<F>(&self, name: &str, lookup: F) -> Result<Value, PluginError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let setting = self.settings.get(name)?;
        resolve_with(&setting.value, lookup)
    }

    /// `Ok(None)` when no such setting exists
    pub fn safe_setting(&self, name: &str) -> Result<Option<Value>, PluginError> {
        if self.settings.contains(name) {
            self.setting(name).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn setting_help(&self, name: &str) -> Result<&str, PluginError> {
        Ok(self.settings.get(name)?.help.as_str())
    }

    /// Resolved values of every setting not listed in `skip`
    pub fn setting_values(&self, skip: &[&str]) -> Result<IndexMap<String, Value>, PluginError> {
        self.settings
            .values(skip)
            .into_iter()
            .map(|name| {
                let value = self.setting(&name)?;
                Ok((name, value))
            })
            .collect()
    }

    /// Apply updates to this instance's settings.
    ///
    /// A `Define` introduces or redefines a setting. A bare value may only
    /// change a setting that already has a help string on record.
    pub fn update_settings<I, K>(&mut self, updates: I) -> Result<(), PluginError>
    where
        I: IntoIterator<Item = (K, SettingDecl)>,
        K: AsRef<str>,
    {
        apply_updates(&mut self.settings, updates)
    }

    pub fn object(&self) -> &P {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut P {
        &mut self.object
    }

    pub fn into_object(self) -> Box<P> {
        self.object
    }
}

/// `update_settings` rules applied to a bare table
pub(crate) fn apply_updates<I, K>(table: &mut SettingsTable, updates: I) -> Result<(), PluginError>
where
    I: IntoIterator<Item = (K, SettingDecl)>,
    K: AsRef<str>,
{
    for (name, decl) in updates {
        let name = normalize_name(name.as_ref());
        match decl {
            SettingDecl::Define { help, value } => table.define(&name, help, value)?,
            SettingDecl::Override(value) => {
                if !table.contains(&name) {
                    return Err(PluginError::MissingHelpString { name });
                }
                table.override_value(&name, value)?;
            }
        }
    }
    Ok(())
}

/// Set `name` only when the table still has it
pub(crate) fn bind_implicit(table: &mut SettingsTable, name: &str, value: Value) -> Result<(), PluginError> {
    if table.contains(name) {
        table.override_value(name, value)?;
    }
    Ok(())
}

impl<P: ?Sized + Plugin> PluginInstance<P> {
    pub fn is_active(&self) -> bool {
        self.object.is_active()
    }
}

impl<P: ?Sized> Deref for PluginInstance<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.object
    }
}

impl<P: ?Sized> DerefMut for PluginInstance<P> {
    fn deref_mut(&mut self) -> &mut P {
        &mut self.object
    }
}

impl<P: ?Sized> std::fmt::Debug for PluginInstance<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginInstance")
            .field("alias", &self.alias)
            .field("class_name", &self.class_name)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
