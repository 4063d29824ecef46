//! Structured errors for plugin registration and settings lookup
//!
//! Errors raised while a plugin class is being defined are programmer
//! mistakes and are fatal. Errors raised by lookups and updates are
//! returned to the caller for reporting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const NOT_A_PLUGIN: &str = "NOT_A_PLUGIN";
    pub const NESTED_ROOT: &str = "NESTED_ROOT";
    pub const DUPLICATE_CLASS: &str = "DUPLICATE_CLASS";
    pub const DOCSTRING_REQUIRED: &str = "DOCSTRING_REQUIRED";
    pub const DUPLICATE_WITHOUT_HELP: &str = "DUPLICATE_WITHOUT_HELP";
    pub const UNKNOWN_SETTING_NO_HELP: &str = "UNKNOWN_SETTING_NO_HELP";
    pub const MISSING_HELP_STRING: &str = "MISSING_HELP_STRING";
    pub const NO_SUCH_SETTING: &str = "NO_SUCH_SETTING";
    pub const UNRECOGNIZED_ALIAS: &str = "UNRECOGNIZED_ALIAS";
    pub const UNDEFINED_ENV_VAR: &str = "UNDEFINED_ENV_VAR";
    pub const UNEXPECTED_TYPE: &str = "UNEXPECTED_TYPE";
    pub const CLASS_NOT_FOUND: &str = "CLASS_NOT_FOUND";
    pub const NOT_INSTANTIABLE: &str = "NOT_INSTANTIABLE";
    pub const INVALID_REGISTRATION: &str = "INVALID_REGISTRATION";
}

/// Which side of the contract was violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    /// A plugin class does not belong to a plugin family
    Structural,
    /// A settings declaration is malformed
    Config,
    /// A caller asked for something that does not exist
    User,
    /// A plugin author or caller broke an internal contract
    Internal,
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported to the caller, who may carry on
    Error,
    /// Loading of the offending plugin module must stop
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    #[error("{class} should inherit from class Plugin")]
    NotAPlugin { class: String },

    #[error("{class} declares itself a family root but was defined inside family {family}")]
    NestedRoot { class: String, family: String },

    #[error("class '{class}' is already defined in family {family}")]
    DuplicateClass { class: String, family: String },

    #[error("docstring required for class '{class}'")]
    DocstringRequired { class: String },

    #[error("Setting '{name}' is already defined, redefining it requires a help string")]
    DuplicateWithoutHelp { name: String },

    #[error("Setting '{name}' has not been defined, introduce it with a help string first")]
    UnknownSetting { name: String },

    #[error("You must specify param '{name}' as a tuple of (helpstring, value)")]
    MissingHelpString { name: String },

    #[error("No setting named '{name}'")]
    NoSuchSetting { name: String },

    #[error("No alias '{alias}' available for {family}")]
    UnrecognizedAlias { alias: String, family: String },

    #[error("'{var}' is not defined in your environment")]
    UndefinedEnvVar { var: String },

    #[error("Unexpected Type: expected a class name or class reference, got {got}")]
    UnexpectedType { got: String },

    #[error("Class '{reference}' could not be resolved")]
    ClassNotFound { reference: String },

    #[error("class '{class}' has no constructor and cannot be instantiated")]
    NotInstantiable { class: String },

    #[error("Invalid registration for '{alias}': {reason}")]
    InvalidRegistration { alias: String, reason: String },
}

impl PluginError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            PluginError::NotAPlugin { .. } => codes::NOT_A_PLUGIN,
            PluginError::NestedRoot { .. } => codes::NESTED_ROOT,
            PluginError::DuplicateClass { .. } => codes::DUPLICATE_CLASS,
            PluginError::DocstringRequired { .. } => codes::DOCSTRING_REQUIRED,
            PluginError::DuplicateWithoutHelp { .. } => codes::DUPLICATE_WITHOUT_HELP,
            PluginError::UnknownSetting { .. } => codes::UNKNOWN_SETTING_NO_HELP,
            PluginError::MissingHelpString { .. } => codes::MISSING_HELP_STRING,
            PluginError::NoSuchSetting { .. } => codes::NO_SUCH_SETTING,
            PluginError::UnrecognizedAlias { .. } => codes::UNRECOGNIZED_ALIAS,
            PluginError::UndefinedEnvVar { .. } => codes::UNDEFINED_ENV_VAR,
            PluginError::UnexpectedType { .. } => codes::UNEXPECTED_TYPE,
            PluginError::ClassNotFound { .. } => codes::CLASS_NOT_FOUND,
            PluginError::NotInstantiable { .. } => codes::NOT_INSTANTIABLE,
            PluginError::InvalidRegistration { .. } => codes::INVALID_REGISTRATION,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            PluginError::NotAPlugin { .. }
            | PluginError::NestedRoot { .. }
            | PluginError::DuplicateClass { .. } => ErrorClass::Structural,
            PluginError::DuplicateWithoutHelp { .. } | PluginError::UnknownSetting { .. } => ErrorClass::Config,
            PluginError::NoSuchSetting { .. }
            | PluginError::UnrecognizedAlias { .. }
            | PluginError::UndefinedEnvVar { .. }
            | PluginError::InvalidRegistration { .. } => ErrorClass::User,
            PluginError::DocstringRequired { .. }
            | PluginError::MissingHelpString { .. }
            | PluginError::UnexpectedType { .. }
            | PluginError::ClassNotFound { .. }
            | PluginError::NotInstantiable { .. } => ErrorClass::Internal,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            PluginError::DocstringRequired { .. } | PluginError::UnexpectedType { .. } => Severity::Fatal,
            _ if self.class() == ErrorClass::Structural => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}
