//! Class references and their resolution

use plume_core::PluginError;
use std::fmt;

/// Handle to a class defined in a family. Handles from one family never
/// resolve in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId {
    pub(crate) family: usize,
    pub(crate) index: usize,
}

/// A reference to a class, as it appears in registration input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassRef {
    /// Bare class name, resolved in the caller's scope
    Name(String),
    /// `module:Class`
    Qualified { module: String, name: String },
    /// Already resolved
    Id(ClassId),
}

impl ClassRef {
    pub fn parse(reference: &str) -> Self {
        match reference.split_once(':') {
            Some((module, name)) => ClassRef::Qualified {
                module: module.trim().to_string(),
                name: name.trim().to_string(),
            },
            None => ClassRef::Name(reference.trim().to_string()),
        }
    }

    /// Only JSON strings name a class
    pub fn from_json(json: &serde_json::Value) -> Result<Self, PluginError> {
        match json {
            serde_json::Value::String(s) => Ok(Self::parse(s)),
            other => Err(PluginError::UnexpectedType { got: json_type_name(other).to_string() }),
        }
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassRef::Name(name) => write!(f, "{}", name),
            ClassRef::Qualified { module, name } => write!(f, "{}:{}", module, name),
            ClassRef::Id(id) => write!(f, "#{}.{}", id.family, id.index),
        }
    }
}

impl From<&str> for ClassRef {
    fn from(reference: &str) -> Self {
        ClassRef::parse(reference)
    }
}

impl From<String> for ClassRef {
    fn from(reference: String) -> Self {
        ClassRef::parse(&reference)
    }
}

impl From<ClassId> for ClassRef {
    fn from(id: ClassId) -> Self {
        ClassRef::Id(id)
    }
}

/// Turns a `ClassRef` into a class handle
pub trait ClassResolver {
    fn resolve_class(&self, reference: &ClassRef) -> Result<ClassId, PluginError>;
}

fn json_type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
