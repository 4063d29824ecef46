//! Plume Plugin System
//!
//! Lets independently declared plugin classes:
//! - Register under one or more aliases in their family's registry
//! - Inherit, override and unset a hierarchical settings table
//! - Contribute settings to classes of other families by alias
//! - Be instantiated by alias at runtime

mod traits;
mod class;
mod resolver;
mod registry;
mod catalog;
mod input;
mod instance;
mod family;

pub use traits::{Plugin, Constructor};
pub use class::{PluginClass, Contribution};
pub use resolver::{ClassId, ClassRef, ClassResolver};
pub use registry::{Registry, Entry, AliasSpec, standardize_alias_or_aliases, split_alias_key};
pub use catalog::Catalog;
pub use input::Registration;
pub use instance::PluginInstance;
pub use family::{Family, PluginDescriptor, ActiveInstances, plugin_base_settings};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        Plugin, PluginClass, Catalog, Family, PluginInstance,
        ClassRef, ClassResolver, Registration, standardize_alias_or_aliases,
    };
    pub use plume_core::prelude::*;
}
