//! Plugin families
//!
//! A family is a root class plus every class defined under it. Defining a
//! class checks it, merges its settings down the inheritance chain and
//! registers it under its aliases. Settings are merged again on every access,
//! so contributions recorded later by other classes are still picked up.

use crate::input::{self, Registration};
use crate::instance::{apply_updates, bind_implicit};
use crate::registry::{standardize_alias_or_aliases, split_alias_key, AliasSpec, Entry, Registry};
use crate::{Catalog, ClassId, ClassRef, ClassResolver, Constructor, Plugin, PluginClass, PluginInstance};
use indexmap::IndexMap;
use plume_core::{PluginError, Setting, SettingDecl, SettingsTable, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_FAMILY: AtomicUsize = AtomicUsize::new(0);

/// Settings every plugin class starts from
pub fn plugin_base_settings() -> SettingsTable {
    [
        ("help", Setting::new("Helpstring for plugin.", "")),
        ("aliases", Setting::new("aliases for plugin", Value::List(Vec::new()))),
    ]
    .into_iter()
    .collect()
}

/// What an alias currently resolves to
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDescriptor {
    pub alias: String,
    pub aliases: Vec<String>,
    pub class: ClassId,
    pub class_name: String,
    pub docstring: Option<String>,
    pub settings: SettingsTable,
}

struct ClassRecord<P: ?Sized, A> {
    key: String,
    class: PluginClass<P, A>,
    parent: Option<ClassId>,
    aliases: Vec<String>,
}

/// A root class, the classes defined under it, and their alias registry
pub struct Family<P: ?Sized, A = ()> {
    name: String,
    tag: usize,
    catalog: Catalog,
    classes: Vec<ClassRecord<P, A>>,
    /// `module:Class`, or the bare name for classes without a module
    by_key: IndexMap<String, ClassId>,
    /// Bare name -> most recent definition
    latest: IndexMap<String, ClassId>,
    registry: Registry,
}

impl<P: ?Sized + Plugin, A> Family<P, A> {
    pub(crate) fn new(catalog: Catalog, root: PluginClass<P, A>) -> Result<Self, PluginError> {
        if !root.root {
            return Err(PluginError::NotAPlugin { class: root.name });
        }
        let mut family = Self {
            name: root.name.clone(),
            tag: NEXT_FAMILY.fetch_add(1, Ordering::Relaxed),
            catalog,
            classes: Vec::new(),
            by_key: IndexMap::new(),
            latest: IndexMap::new(),
            registry: Registry::new(),
        };
        family.admit(root, None)?;
        Ok(family)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn root(&self) -> ClassId {
        self.id_at(0)
    }

    fn id_at(&self, index: usize) -> ClassId {
        ClassId { family: self.tag, index }
    }

    // ========== Class Definition ==========

    /// Define a class under this family and register it under its aliases.
    ///
    /// Fails when the class does not extend a class of this family, lacks a
    /// docstring (unless it is a marker), or declares settings that do not
    /// merge onto its ancestors. The parent is named like any class
    /// reference: `Class` or `module:Class`.
    pub fn define(&mut self, class: PluginClass<P, A>) -> Result<ClassId, PluginError> {
        if class.root {
            return Err(PluginError::NestedRoot { class: class.name, family: self.name.clone() });
        }
        let parent = class
            .parent
            .as_deref()
            .and_then(|p| self.resolve_class(&ClassRef::parse(p)).ok())
            .ok_or_else(|| PluginError::NotAPlugin { class: class.name.clone() })?;
        self.admit(class, Some(parent))
    }

    fn admit(&mut self, class: PluginClass<P, A>, parent: Option<ClassId>) -> Result<ClassId, PluginError> {
        let key = class.qualified_name().unwrap_or_else(|| class.name.clone());
        if self.by_key.contains_key(&key) {
            return Err(PluginError::DuplicateClass { class: key, family: self.name.clone() });
        }
        if parent.is_some() && !class.marker && class.docstring().is_none() {
            return Err(PluginError::DocstringRequired { class: class.name });
        }

        let aliases = standardize_alias_or_aliases(class.alias_spec());
        if aliases.is_empty() {
            return Err(PluginError::InvalidRegistration {
                alias: class.name,
                reason: "class declares no usable alias".to_string(),
            });
        }

        // Contributions are definitions and need a help string
        let mut scratch = SettingsTable::new();
        for contribution in &class.other_class_settings {
            scratch.define(&contribution.name, contribution.setting.help.clone(), Value::Null)?;
        }

        let id = self.id_at(self.classes.len());
        self.classes.push(ClassRecord { key: key.clone(), class, parent, aliases });
        if let Err(e) = self.class_settings(id) {
            self.classes.pop();
            return Err(e);
        }

        // Roots without declared aliases and markers stay out of the registry
        let record = &self.classes[id.index];
        let abstract_class = record.class.marker || (parent.is_none() && record.class.aliases.is_empty());
        let aliases = record.aliases.clone();
        let name = record.class.name.clone();
        tracing::debug!(
            family = %self.name,
            class = %key,
            aliases = ?aliases,
            abstract_class,
            "admitted plugin class"
        );
        self.by_key.insert(key, id);
        self.latest.insert(name, id);

        if !abstract_class {
            self.insert(aliases, id, Vec::new());
        }
        self.catalog.record(&self.classes[id.index].class.other_class_settings);
        Ok(id)
    }

    // ========== Registration ==========

    /// Register `class` under one or more aliases with setting overrides
    pub fn register(
        &mut self,
        aliases: impl Into<AliasSpec>,
        class: impl Into<ClassRef>,
        overrides: Vec<(String, SettingDecl)>,
    ) -> Result<(), PluginError> {
        let class = class.into();
        let id = self.resolve_class(&class)?;
        let aliases = standardize_alias_or_aliases(aliases);
        if aliases.is_empty() {
            return Err(PluginError::InvalidRegistration {
                alias: class.to_string(),
                reason: "no aliases given".to_string(),
            });
        }
        self.insert(aliases, id, overrides);
        Ok(())
    }

    /// Register every `(key, registration)` pair; keys may hold several
    /// aliases separated by `|`.
    pub fn register_plugins<I, K>(&mut self, plugins: I) -> Result<(), PluginError>
    where
        I: IntoIterator<Item = (K, Registration)>,
        K: AsRef<str>,
    {
        for (key, registration) in plugins {
            let id = self.resolve_class(&registration.class)?;
            self.insert_key(key.as_ref(), id, registration.overrides)?;
        }
        Ok(())
    }

    /// Like `register_plugins`, resolving class references through `resolver`
    pub fn register_plugins_with<R, I, K>(&mut self, resolver: &R, plugins: I) -> Result<(), PluginError>
    where
        R: ClassResolver + ?Sized,
        I: IntoIterator<Item = (K, Registration)>,
        K: AsRef<str>,
    {
        for (key, registration) in plugins {
            let id = resolver.resolve_class(&registration.class)?;
            if self.record(id).is_err() {
                return Err(PluginError::ClassNotFound { reference: registration.class.to_string() });
            }
            self.insert_key(key.as_ref(), id, registration.overrides)?;
        }
        Ok(())
    }

    /// Register from a JSON object whose values use the tuple or dict shape
    pub fn register_plugins_from_json(&mut self, json: &serde_json::Value) -> Result<(), PluginError> {
        let parsed = input::entries(json)?
            .map(|(key, value)| -> Result<(String, Registration), PluginError> {
                Ok((key.clone(), Registration::from_json(key, value)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.register_plugins(parsed)
    }

    /// Register from a JSON object whose values use the dict shape only
    pub fn register_plugins_from_dict(&mut self, json: &serde_json::Value) -> Result<(), PluginError> {
        let parsed = input::entries(json)?
            .map(|(key, value)| -> Result<(String, Registration), PluginError> {
                Ok((key.clone(), Registration::from_dict_json(key, value)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.register_plugins(parsed)
    }

    fn insert_key(&mut self, key: &str, id: ClassId, overrides: Vec<(String, SettingDecl)>) -> Result<(), PluginError> {
        let aliases = split_alias_key(key);
        if aliases.is_empty() {
            return Err(PluginError::InvalidRegistration {
                alias: key.to_string(),
                reason: "no aliases given".to_string(),
            });
        }
        self.insert(aliases, id, overrides);
        Ok(())
    }

    fn insert(&mut self, aliases: Vec<String>, id: ClassId, overrides: Vec<(String, SettingDecl)>) {
        let record = &self.classes[id.index];
        let class_name = record.key.clone();

        let mut implicit = vec![("aliases".to_string(), Value::from(aliases.clone()))];
        if !overrides.iter().any(|(name, _)| name == "help") {
            if let Some(doc) = record.class.docstring() {
                implicit.push(("help".to_string(), Value::from(doc)));
            }
        }

        for (alias, previous) in self.registry.register(aliases.clone(), id, overrides, implicit) {
            tracing::debug!(
                family = %self.name,
                alias = %alias,
                previous = %self.classes[previous.index].key,
                class = %class_name,
                "alias re-registered, last registration wins"
            );
        }
        tracing::debug!(family = %self.name, class = %class_name, aliases = ?aliases, "registered plugin");
    }

    // ========== Lookup ==========

    pub fn lookup(&self, alias: &str) -> Result<&Entry, PluginError> {
        self.registry.get(alias).ok_or_else(|| PluginError::UnrecognizedAlias {
            alias: alias.to_string(),
            family: self.name.clone(),
        })
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.registry.contains(alias)
    }

    /// Registered aliases, sorted
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.registry.aliases().collect();
        aliases.sort_unstable();
        aliases
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn class(&self, id: ClassId) -> Option<&PluginClass<P, A>> {
        self.record(id).ok().map(|r| &r.class)
    }

    /// `Class` (most recent definition) or `module:Class`
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.resolve_class(&ClassRef::parse(name)).ok()
    }

    /// Aliases a class was admitted with
    pub fn class_aliases(&self, id: ClassId) -> Option<&[String]> {
        self.record(id).ok().map(|r| r.aliases.as_slice())
    }

    /// `id` and its ancestors, root first
    pub fn ancestry(&self, id: ClassId) -> Vec<ClassId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(class) = current {
            let Ok(record) = self.record(class) else { break };
            chain.push(class);
            current = record.parent;
        }
        chain.reverse();
        chain
    }

    /// Merged settings of a class: the plugin base table, then for each class
    /// from the root down its own declarations, its unsets and the
    /// contributions other classes made to its aliases.
    pub fn class_settings(&self, id: ClassId) -> Result<SettingsTable, PluginError> {
        self.record(id)?;
        let mut table = plugin_base_settings();
        for ancestor in self.ancestry(id) {
            let record = &self.classes[ancestor.index];
            for (name, decl) in &record.class.settings {
                table.apply(name, decl.clone())?;
            }
            for name in &record.class.unset {
                table.unset(name);
            }
            for alias in &record.aliases {
                self.catalog.apply_to(alias, &mut table)?;
            }
        }
        Ok(table)
    }

    /// Settings an instance created under `alias` would start with
    pub fn describe(&self, alias: &str) -> Result<PluginDescriptor, PluginError> {
        let entry = self.lookup(alias)?;
        let record = self.record(entry.class)?;
        let settings = self.entry_settings(entry)?;
        Ok(PluginDescriptor {
            alias: alias.trim().to_lowercase(),
            aliases: entry.aliases.clone(),
            class: entry.class,
            class_name: record.class.name.clone(),
            docstring: record.class.docstring().map(String::from),
            settings,
        })
    }

    fn entry_settings(&self, entry: &Entry) -> Result<SettingsTable, PluginError> {
        let mut settings = self.class_settings(entry.class)?;
        for (name, value) in &entry.implicit {
            bind_implicit(&mut settings, name, value.clone())?;
        }
        apply_updates(&mut settings, entry.overrides.iter().cloned())?;
        Ok(settings)
    }

    fn record(&self, id: ClassId) -> Result<&ClassRecord<P, A>, PluginError> {
        self.classes
            .get(id.index)
            .filter(|_| id.family == self.tag)
            .ok_or_else(|| PluginError::ClassNotFound { reference: ClassRef::Id(id).to_string() })
    }

    fn constructor_for(&self, id: ClassId) -> Option<&Constructor<P, A>> {
        self.ancestry(id)
            .into_iter()
            .rev()
            .find_map(|class| self.classes[class.index].class.constructor.as_ref())
    }

    // ========== Instances ==========

    pub fn create_instance(&self, alias: &str, args: &A) -> Result<PluginInstance<P>, PluginError> {
        self.create_instance_with(alias, args, Vec::<(String, SettingDecl)>::new())
    }

    /// Create an instance, then apply `overrides` on top of the registered
    /// settings
    pub fn create_instance_with<I, K>(&self, alias: &str, args: &A, overrides: I) -> Result<PluginInstance<P>, PluginError>
    where
        I: IntoIterator<Item = (K, SettingDecl)>,
        K: AsRef<str>,
    {
        let entry = self.lookup(alias)?;
        let record = self.record(entry.class)?;
        let constructor = self
            .constructor_for(entry.class)
            .ok_or_else(|| PluginError::NotInstantiable { class: record.class.name.clone() })?;

        let object = constructor(args);
        let mut settings = self.entry_settings(entry)?;
        apply_updates(&mut settings, overrides)?;

        Ok(PluginInstance::new(
            alias.trim().to_lowercase(),
            record.class.name.clone(),
            settings,
            object,
        ))
    }

    /// One instance per registration whose plugin is active, aliases visited
    /// in sorted order
    pub fn iter_active<'a>(&'a self, args: &'a A) -> ActiveInstances<'a, P, A> {
        ActiveInstances {
            family: self,
            args,
            aliases: self.aliases(),
            position: 0,
            seen: HashSet::new(),
        }
    }
}

impl<P: ?Sized, A> ClassResolver for Family<P, A> {
    fn resolve_class(&self, reference: &ClassRef) -> Result<ClassId, PluginError> {
        let found = match reference {
            ClassRef::Name(name) => self.latest.get(name).copied(),
            ClassRef::Qualified { module, name } => self.by_key.get(&format!("{}:{}", module, name)).copied(),
            ClassRef::Id(id) => (id.family == self.tag && id.index < self.classes.len()).then_some(*id),
        };
        found.ok_or_else(|| PluginError::ClassNotFound { reference: reference.to_string() })
    }
}

impl<P: ?Sized, A> fmt::Debug for Family<P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Family")
            .field("name", &self.name)
            .field("classes", &self.by_key.keys().collect::<Vec<_>>())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Iterator returned by `Family::iter_active`
pub struct ActiveInstances<'a, P: ?Sized, A> {
    family: &'a Family<P, A>,
    args: &'a A,
    aliases: Vec<&'a str>,
    position: usize,
    seen: HashSet<usize>,
}

impl<'a, P: ?Sized + Plugin, A> Iterator for ActiveInstances<'a, P, A> {
    type Item = Result<PluginInstance<P>, PluginError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(alias) = self.aliases.get(self.position).copied() {
            self.position += 1;
            let Some(entry) = self.family.registry.get(alias) else { continue };
            if !self.seen.insert(entry.registration) {
                continue;
            }
            match self.family.create_instance(alias, self.args) {
                Ok(instance) if instance.is_active() => return Some(Ok(instance)),
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

impl<'a, P: ?Sized, A> Clone for ActiveInstances<'a, P, A> {
    fn clone(&self) -> Self {
        Self {
            family: self.family,
            args: self.args,
            aliases: self.aliases.clone(),
            position: self.position,
            seen: self.seen.clone(),
        }
    }
}
