//! Process-wide plugin catalog
//!
//! Families are created from a catalog and keep a handle to it. The catalog
//! holds the one table that crosses family boundaries: settings classes
//! contribute to other classes by alias.

use crate::{Contribution, Family, Plugin, PluginClass};
use indexmap::IndexMap;
use parking_lot::RwLock;
use plume_core::{PluginError, SettingsTable};
use std::sync::Arc;

#[derive(Debug, Default)]
struct CatalogState {
    other_class_settings: IndexMap<String, Vec<Contribution>>,
}

/// Shared registration state for every family of a process
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    inner: Arc<RwLock<CatalogState>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a family from its root class
    pub fn family<P, A>(&self, root: PluginClass<P, A>) -> Result<Family<P, A>, PluginError>
    where
        P: ?Sized + Plugin,
    {
        Family::new(self.clone(), root)
    }

    /// Contributions targeting `target`, in registration order
    pub fn other_class_settings(&self, target: &str) -> Vec<Contribution> {
        let state = self.inner.read();
        state
            .other_class_settings
            .get(&target.trim().to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Distinct setting names contributed to `target`
    pub fn contributed_names(&self, target: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for contribution in self.other_class_settings(target) {
            if !names.contains(&contribution.name) {
                names.push(contribution.name);
            }
        }
        names
    }

    pub(crate) fn record(&self, contributions: &[Contribution]) {
        if contributions.is_empty() {
            return;
        }
        let mut state = self.inner.write();
        for contribution in contributions {
            tracing::debug!(
                source = %contribution.source,
                target = %contribution.target,
                setting = %contribution.name,
                "recorded other-class setting"
            );
            state
                .other_class_settings
                .entry(contribution.target.clone())
                .or_default()
                .push(contribution.clone());
        }
    }

    /// Define every contribution targeting `alias` in `table`
    pub(crate) fn apply_to(&self, alias: &str, table: &mut SettingsTable) -> Result<(), PluginError> {
        let state = self.inner.read();
        if let Some(contributions) = state.other_class_settings.get(alias) {
            for contribution in contributions {
                table.define(
                    &contribution.name,
                    contribution.setting.help.clone(),
                    contribution.setting.value.clone(),
                )?;
            }
        }
        Ok(())
    }
}
