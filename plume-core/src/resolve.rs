//! Read-time resolution of setting values
//!
//! A text value starting with `$` names an environment variable: the whole
//! rest of the text is the name, and the value is replaced by the variable's
//! value. `\$` escapes the dollar sign.

use crate::{PluginError, Value};

/// Resolve `value` against the process environment
pub fn resolve(value: &Value) -> Result<Value, PluginError> {
    resolve_with(value, |var| std::env::var(var).ok())
}

/// Resolve `value` using `lookup` to read environment variables
pub fn resolve_with<F>(value: &Value, mut lookup: F) -> Result<Value, PluginError>
where
    F: FnMut(&str) -> Option<String>,
{
    let text = match value {
        Value::Text(text) => text,
        other => return Ok(other.clone()),
    };

    if text.contains("\\$") {
        return Ok(Value::Text(text.replace("\\$", "$")));
    }

    let Some(var) = text.strip_prefix('$') else {
        return Ok(value.clone());
    };

    // Everything after the leading `$` is the variable name
    let found = lookup(var).ok_or_else(|| PluginError::UndefinedEnvVar { var: var.to_string() })?;
    tracing::trace!(reference = %text, "expanded environment reference");
    Ok(Value::Text(found))
}
