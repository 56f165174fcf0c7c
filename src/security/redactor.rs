//! Redaction of sensitive fields in container metadata.
//!
//! Container configs carry the full environment of the container, which
//! routinely holds passwords and tokens. Unless danger mode is enabled every
//! `Config.Env` entry keeps its variable name and loses its value.
//!
//! Redaction never fails the run: documents that do not look like a container
//! config are replaced by a fixed placeholder.

use log::{debug, warn};
use serde_json::Value;

use crate::constants::{REDACTION_MARKER, UNPARSABLE_ENV, UNRECOGNIZED_FORMAT};
use crate::error::CollectError;

/// Redaction policy, fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Redactor {
    danger: bool,
}

impl Redactor {
    /// A redactor that masks environment values.
    pub fn safe() -> Self {
        Self { danger: false }
    }

    /// A redactor that lets documents through untouched.
    pub fn danger() -> Self {
        warn!("Danger mode activated. The archive will include container logs and environment variables, which may contain sensitive information.");
        Self { danger: true }
    }

    pub fn new(danger: bool) -> Self {
        if danger {
            Self::danger()
        } else {
            Self::safe()
        }
    }

    pub fn is_danger(&self) -> bool {
        self.danger
    }

    /// Redact a parsed container config.
    ///
    /// # Errors
    ///
    /// [`CollectError::MalformedDocument`] when the document is not an object
    /// with a `Config` object, or when `Config.Env` is not a list of strings.
    pub fn redact(&self, mut document: Value) -> Result<Value, CollectError> {
        let config = document
            .as_object_mut()
            .and_then(|root| root.get_mut("Config"))
            .ok_or_else(|| CollectError::MalformedDocument("no Config key".to_string()))?;

        if self.danger {
            return Ok(document);
        }

        let config = config
            .as_object_mut()
            .ok_or_else(|| CollectError::MalformedDocument("Config is not an object".to_string()))?;

        if let Some(env) = config.get_mut("Env") {
            *env = mask_env(env)?;
        }

        Ok(document)
    }

    /// Parse, redact and pretty-print a raw container config.
    ///
    /// Always returns printable content; malformed input degrades to a
    /// placeholder payload.
    pub fn redact_bytes(&self, raw: &[u8], container_id: &str) -> Vec<u8> {
        let document: Value = match serde_json::from_slice(raw) {
            Ok(document) => document,
            Err(e) => {
                warn!("Error parsing configuration of container {:?}: {}", container_id, e);
                return UNRECOGNIZED_FORMAT.as_bytes().to_vec();
            }
        };

        let redacted = match self.redact(document) {
            Ok(redacted) => redacted,
            Err(CollectError::MalformedDocument(reason)) if reason.starts_with("Env") => {
                warn!("Error parsing environment of container {:?}: {}", container_id, reason);
                return UNPARSABLE_ENV.as_bytes().to_vec();
            }
            Err(e) => {
                warn!("Unrecognized configuration for container {:?}: {}", container_id, e);
                return UNRECOGNIZED_FORMAT.as_bytes().to_vec();
            }
        };

        debug!("Redacted configuration of container {:?}", container_id);
        serde_json::to_vec_pretty(&redacted).unwrap_or_else(|e| {
            warn!("Error serializing configuration of container {:?}: {}", container_id, e);
            UNRECOGNIZED_FORMAT.as_bytes().to_vec()
        })
    }
}

fn mask_env(env: &Value) -> Result<Value, CollectError> {
    let entries = env
        .as_array()
        .ok_or_else(|| CollectError::MalformedDocument("Env is not a list".to_string()))?;

    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(|s| Value::String(mask_variable(s)))
                .ok_or_else(|| CollectError::MalformedDocument("Env entry is not a string".to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Keep everything up to and including the first `=`, replace the rest.
///
/// `mask_variable(mask_variable(x)) == mask_variable(x)` for every `x`.
pub fn mask_variable(entry: &str) -> String {
    match entry.find('=') {
        Some(pos) => format!("{}{}", &entry[..=pos], REDACTION_MARKER),
        None => format!("{}={}", entry, REDACTION_MARKER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const CONFIG: &str =
        r#"{"Config": {"Safe": "abc", "Env": ["POSTGRES_PASSWORD=mysecretpassword", "FOO=bar"]}}"#;

    #[test]
    fn test_safe_mode_masks_env() {
        let document: Value = serde_json::from_str(CONFIG).unwrap();
        let redacted = Redactor::safe().redact(document).unwrap();

        assert_eq!(
            redacted,
            json!({"Config": {"Safe": "abc", "Env": [
                "POSTGRES_PASSWORD=<REDACTED>",
                "FOO=<REDACTED>"
            ]}})
        );
    }

    #[test]
    fn test_danger_mode_passes_through() {
        let document: Value = serde_json::from_str(CONFIG).unwrap();
        let redacted = Redactor::danger().redact(document.clone()).unwrap();
        assert_eq!(redacted, document);
    }

    #[test]
    fn test_redaction_is_idempotent() {
        let document: Value = serde_json::from_str(CONFIG).unwrap();
        let redactor = Redactor::safe();
        let once = redactor.redact(document).unwrap();
        let twice = redactor.redact(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_mask_variable() {
        assert_eq!(mask_variable("X=secret"), "X=<REDACTED>");
        assert_eq!(mask_variable("X=a=b"), "X=<REDACTED>");
        assert_eq!(mask_variable("X="), "X=<REDACTED>");
        assert_eq!(mask_variable("NOVALUE"), "NOVALUE=<REDACTED>");
    }

    #[test]
    fn test_config_without_env_is_unchanged() {
        let document = json!({"Config": {"Image": "nginx"}, "State": {"Running": true}});
        let redacted = Redactor::safe().redact(document.clone()).unwrap();
        assert_eq!(redacted, document);
    }

    #[test]
    fn test_missing_config_key_is_malformed() {
        let result = Redactor::safe().redact(json!({"State": {}}));
        assert!(matches!(result, Err(CollectError::MalformedDocument(_))));

        let result = Redactor::danger().redact(json!(["not", "an", "object"]));
        assert!(matches!(result, Err(CollectError::MalformedDocument(_))));
    }

    #[test]
    fn test_redact_bytes_placeholders() {
        let redactor = Redactor::safe();
        assert_eq!(redactor.redact_bytes(b"not json", "c1"), UNRECOGNIZED_FORMAT.as_bytes());
        assert_eq!(redactor.redact_bytes(br#"{"State": {}}"#, "c1"), UNRECOGNIZED_FORMAT.as_bytes());
        assert_eq!(
            redactor.redact_bytes(br#"{"Config": {"Env": "X=1"}}"#, "c1"),
            UNPARSABLE_ENV.as_bytes()
        );
        assert_eq!(
            redactor.redact_bytes(br#"{"Config": {"Env": [1, 2]}}"#, "c1"),
            UNPARSABLE_ENV.as_bytes()
        );
    }

    #[test]
    fn test_redact_bytes_never_leaks_secret() {
        let content = Redactor::safe().redact_bytes(br#"{"Config": {"Env": ["X=secret"]}}"#, "c1");
        let text = String::from_utf8(content).unwrap();
        assert!(!text.contains("secret"));
        assert!(text.contains("X=<REDACTED>"));
    }

    proptest! {
        #[test]
        fn prop_mask_variable_is_idempotent(entry in ".*") {
            let once = mask_variable(&entry);
            prop_assert_eq!(mask_variable(&once), once.clone());
            prop_assert!(once.ends_with(REDACTION_MARKER));
        }

        #[test]
        fn prop_masked_value_is_gone(key in "[A-Z_]{1,12}", value in "[a-z0-9]{8,24}") {
            let masked = mask_variable(&format!("{}={}", key, value));
            let prefix = format!("{}=", key);
            prop_assert!(!masked.contains(&value));
            prop_assert!(masked.starts_with(&prefix));
        }
    }
}
