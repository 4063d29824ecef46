//! Plume Core - Fundamental types
//!
//! This crate provides the core types used throughout Plume:
//! - `Value`: Setting values (scalars, text, lists, maps)
//! - `SettingsTable`: Ordered name -> (help, value) table with merge rules
//! - `PluginError`: Typed errors with codes and severities
//! - `resolve`: Environment substitution applied when a setting is read

mod value;
mod error;
mod settings;
mod resolve;

pub use value::Value;
pub use error::{PluginError, ErrorClass, Severity, codes};
pub use settings::{Setting, SettingDecl, SettingsTable, normalize_name};
pub use resolve::{resolve, resolve_with};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Value, PluginError, ErrorClass, Severity, Setting, SettingDecl, SettingsTable};
    pub use crate::error::codes;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod value_tests {
        use super::*;

        #[test]
        fn test_from_json_scalars() {
            let json = serde_json::json!({"a": 1, "b": 1.5, "c": "x", "d": null, "e": true});
            let value = Value::from_json(&json);
            let map = value.as_map().unwrap();
            assert_eq!(map.get("a"), Some(&Value::Int(1)));
            assert_eq!(map.get("b"), Some(&Value::Float(1.5)));
            assert_eq!(map.get("c"), Some(&Value::Text("x".to_string())));
            assert_eq!(map.get("d"), Some(&Value::Null));
            assert_eq!(map.get("e"), Some(&Value::Bool(true)));
        }

        #[test]
        fn test_untagged_serialization() {
            let v = Value::from(vec![Value::Int(1), Value::from("a"), Value::Null]);
            assert_eq!(serde_json::to_string(&v).unwrap(), r#"[1,"a",null]"#);
        }

        #[test]
        fn test_display() {
            let v = Value::from(vec!["foo", "bar"]);
            assert_eq!(v.to_string(), "[foo, bar]");
            assert_eq!(Value::Null.to_string(), "null");
        }

        #[test]
        fn test_option_conversion() {
            assert!(Value::from(None::<i64>).is_null());
            assert_eq!(Value::from(Some(3)), Value::Int(3));
        }
    }

    mod settings_tests {
        use super::*;

        fn table() -> SettingsTable {
            let mut t = SettingsTable::new();
            t.define("write-header", "Whether to write a header row.", true).unwrap();
            t.define("delimiter", "Field delimiter.", ",").unwrap();
            t
        }

        #[test]
        fn test_underscore_normalizes_to_hyphen() {
            let mut t = table();
            assert_eq!(normalize_name("write_header"), "write-header");
            t.override_value("write_header", false).unwrap();
            assert_eq!(t.get("write-header").unwrap().value, Value::Bool(false));
            assert!(t.contains("write_header"));
        }

        #[test]
        fn test_override_preserves_help() {
            let mut t = table();
            t.override_value("delimiter", ";").unwrap();
            let s = t.get("delimiter").unwrap();
            assert_eq!(s.help, "Field delimiter.");
            assert_eq!(s.value, Value::from(";"));
        }

        #[test]
        fn test_override_unknown_fails() {
            let mut t = table();
            let err = t.override_value("quote-char", "\"").unwrap_err();
            assert_eq!(err, PluginError::UnknownSetting { name: "quote-char".to_string() });
            assert_eq!(err.code(), codes::UNKNOWN_SETTING_NO_HELP);
            assert_eq!(err.class(), ErrorClass::Config);
        }

        #[test]
        fn test_define_replaces_help_and_value() {
            let mut t = table();
            t.define("delimiter", "Separator.", "|").unwrap();
            let s = t.get("delimiter").unwrap();
            assert_eq!(s.help, "Separator.");
            assert_eq!(s.value, Value::from("|"));
        }

        #[test]
        fn test_define_existing_without_help_fails() {
            let mut t = table();
            let err = t.define("delimiter", "", "|").unwrap_err();
            assert_eq!(err.code(), codes::DUPLICATE_WITHOUT_HELP);
            let err = t.define("quote-char", "  ", "\"").unwrap_err();
            assert_eq!(err.code(), codes::UNKNOWN_SETTING_NO_HELP);
        }

        #[test]
        fn test_apply_decl() {
            let mut t = table();
            t.apply("quote_char", SettingDecl::define("Quote character.", "\"")).unwrap();
            t.apply("quote-char", SettingDecl::value("'")).unwrap();
            assert_eq!(t.get("quote-char").unwrap().value, Value::from("'"));
            assert!(t.apply("escape", SettingDecl::value("\\")).is_err());
        }

        #[test]
        fn test_unset() {
            let mut t = table();
            t.unset("delimiter");
            t.unset("never-defined");
            let err = t.get("delimiter").unwrap_err();
            assert_eq!(err.to_string(), "No setting named 'delimiter'");
            assert_eq!(err.class(), ErrorClass::User);
            assert!(t.get_safe("delimiter").is_none());
            assert_eq!(t.len(), 1);
        }

        #[test]
        fn test_values_excluding() {
            let t = table();
            assert_eq!(t.values(&[]), vec!["write-header", "delimiter"]);
            assert_eq!(t.values(&["write_header"]), vec!["delimiter"]);
        }

        #[test]
        fn test_decl_from_json() {
            let def = SettingDecl::from_json(&serde_json::json!(["Help text.", 3]));
            assert_eq!(def, SettingDecl::define("Help text.", 3));
            let bare = SettingDecl::from_json(&serde_json::json!("plain"));
            assert_eq!(bare, SettingDecl::value("plain"));
            let list = SettingDecl::from_json(&serde_json::json!([1, 2]));
            assert_eq!(list, SettingDecl::value(vec![1, 2]));
        }
    }

    mod resolve_tests {
        use super::*;

        fn env(var: &str) -> Option<String> {
            match var {
                "PWD" => Some("/home/plume/work".to_string()),
                _ => None,
            }
        }

        #[test]
        fn test_dollar_reference_substituted() {
            let v = resolve_with(&Value::from("$PWD"), env).unwrap();
            assert_eq!(v, Value::from("/home/plume/work"));
        }

        #[test]
        fn test_escaped_dollar_is_literal() {
            let v = resolve_with(&Value::from("\\$PWD"), env).unwrap();
            assert_eq!(v, Value::from("$PWD"));

            let v = resolve_with(&Value::from("cost: \\$5 or \\$6"), env).unwrap();
            assert_eq!(v, Value::from("cost: $5 or $6"));
        }

        #[test]
        fn test_undefined_variable() {
            let err = resolve_with(&Value::from("$NOPE"), env).unwrap_err();
            assert_eq!(err.to_string(), "'NOPE' is not defined in your environment");
        }

        #[test]
        fn test_whole_remainder_is_the_name() {
            let err = resolve_with(&Value::from("$PWD/sub"), env).unwrap_err();
            assert_eq!(err, PluginError::UndefinedEnvVar { var: "PWD/sub".to_string() });

            let err = resolve_with(&Value::from("$"), env).unwrap_err();
            assert_eq!(err, PluginError::UndefinedEnvVar { var: String::new() });
        }

        #[test]
        fn test_plain_values_untouched() {
            assert_eq!(resolve_with(&Value::from("a$PWD"), env).unwrap(), Value::from("a$PWD"));
            assert_eq!(resolve_with(&Value::Int(4), env).unwrap(), Value::Int(4));
            let list = Value::from(vec!["$PWD"]);
            assert_eq!(resolve_with(&list, env).unwrap(), list);
        }

        #[test]
        fn test_process_environment() {
            std::env::set_var("PLUME_CORE_RESOLVE_TEST", "from-env");
            let v = resolve(&Value::from("$PLUME_CORE_RESOLVE_TEST")).unwrap();
            assert_eq!(v, Value::from("from-env"));
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_severity() {
            let structural = PluginError::NotAPlugin { class: "BadPlugin".to_string() };
            assert_eq!(structural.to_string(), "BadPlugin should inherit from class Plugin");
            assert!(structural.is_fatal());

            let doc = PluginError::DocstringRequired { class: "NoDocstring".to_string() };
            assert!(doc.to_string().contains("docstring required"));
            assert_eq!(doc.severity(), Severity::Fatal);

            let missing = PluginError::NoSuchSetting { name: "foo".to_string() };
            assert_eq!(missing.severity(), Severity::Error);
        }
    }
}
