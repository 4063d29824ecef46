//! Plugin class declarations

use crate::traits::Constructor;
use plume_core::{normalize_name, Setting, SettingDecl, Value};
use std::fmt;
use std::sync::Arc;

/// Settings one class contributes to whichever class is registered under
/// `target`, possibly in another family.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub target: String,
    pub source: String,
    pub name: String,
    pub setting: Setting,
}

/// Declaration of a plugin class.
///
/// Built with chained calls and handed to `Catalog::family` (for a family
/// root) or `Family::define` (for everything else), which validates it,
/// merges its settings and registers it.
pub struct PluginClass<P: ?Sized, A = ()> {
    pub(crate) name: String,
    pub(crate) module: Option<String>,
    pub(crate) doc: Option<String>,
    pub(crate) parent: Option<String>,
    pub(crate) root: bool,
    pub(crate) marker: bool,
    pub(crate) aliases: Vec<String>,
    pub(crate) settings: Vec<(String, SettingDecl)>,
    pub(crate) unset: Vec<String>,
    pub(crate) other_class_settings: Vec<Contribution>,
    pub(crate) constructor: Option<Constructor<P, A>>,
}

impl<P: ?Sized, A> PluginClass<P, A> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: None,
            doc: None,
            parent: None,
            root: false,
            marker: false,
            aliases: Vec::new(),
            settings: Vec::new(),
            unset: Vec::new(),
            other_class_settings: Vec::new(),
            constructor: None,
        }
    }

    /// Declare the root class of a new family
    pub fn root(name: impl Into<String>) -> Self {
        let mut class = Self::new(name);
        class.root = true;
        class
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Module path used for `module:Class` lookups
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Base class that needs no docstring and is not registered by itself
    pub fn marker(mut self) -> Self {
        self.marker = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Introduce a setting with its help text
    pub fn define(mut self, name: &str, help: impl Into<String>, default: impl Into<Value>) -> Self {
        self.settings.push((normalize_name(name), SettingDecl::define(help, default)));
        self
    }

    /// Override the value of a setting an ancestor defined
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.settings.push((normalize_name(name), SettingDecl::value(value)));
        self
    }

    pub fn unset(mut self, name: &str) -> Self {
        self.unset.push(normalize_name(name));
        self
    }

    /// Contribute a setting to the class registered under `target`
    pub fn other_class_setting(
        mut self,
        target: &str,
        name: &str,
        help: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        self.other_class_settings.push(Contribution {
            target: target.trim().to_lowercase(),
            source: self.name.clone(),
            name: normalize_name(name),
            setting: Setting::new(help, default),
        });
        self
    }

    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn(&A) -> Box<P> + Send + Sync + 'static,
    {
        let constructor: Constructor<P, A> = Arc::new(f);
        self.constructor = Some(constructor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn docstring(&self) -> Option<&str> {
        self.doc.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    pub fn qualified_name(&self) -> Option<String> {
        self.module.as_ref().map(|m| format!("{}:{}", m, self.name))
    }

    /// Declared aliases, or the lower-cased class name when none are declared
    pub(crate) fn alias_spec(&self) -> Vec<String> {
        if self.aliases.is_empty() {
            vec![self.name.to_lowercase()]
        } else {
            self.aliases.clone()
        }
    }
}

impl<P: ?Sized, A> Clone for PluginClass<P, A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            module: self.module.clone(),
            doc: self.doc.clone(),
            parent: self.parent.clone(),
            root: self.root,
            marker: self.marker,
            aliases: self.aliases.clone(),
            settings: self.settings.clone(),
            unset: self.unset.clone(),
            other_class_settings: self.other_class_settings.clone(),
            constructor: self.constructor.clone(),
        }
    }
}

impl<P: ?Sized, A> fmt::Debug for PluginClass<P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginClass")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("parent", &self.parent)
            .field("root", &self.root)
            .field("marker", &self.marker)
            .field("aliases", &self.aliases)
            .field("settings", &self.settings)
            .field("unset", &self.unset)
            .field("other_class_settings", &self.other_class_settings)
            .field("constructor", &self.constructor.is_some())
            .finish()
    }
}
