//! Content-hash configuration signature.
//!
//! Two [`crate::config::BrowserConfig`] values with an identical
//! signature are interchangeable for browser pool reuse. The signature
//! is the SHA1 of the canonical JSON serialization of the effective
//! config, with object keys sorted lexicographically and
//! default-valued keys elided, so it stays stable across process
//! restarts given identical inputs.

use serde::Serialize;
use serde_json::Value;
use sha1::{Digest, Sha1};

/// Compute the config signature of any serializable config value.
///
/// `default` is compared against the serialized value key-by-key so
/// that fields still holding their default are elided before hashing,
/// per the canonicalization rule above.
pub fn config_signature<T: Serialize>(config: &T, default: &T) -> String {
    let value = serde_json::to_value(config).expect("config must serialize to JSON");
    let default_value = serde_json::to_value(default).expect("default config must serialize");
    let canonical = canonicalize(&value, Some(&default_value));
    let bytes = serde_json::to_vec(&canonical).expect("canonical value must serialize");
    let mut hasher = Sha1::new();
    hasher.update(&bytes);
    hex::encode(hasher.finalize())
}

/// Recursively sort object keys and drop entries whose value equals
/// the corresponding default value.
fn canonicalize(value: &Value, default: Option<&Value>) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                let v = &map[key];
                let default_v = default.and_then(|d| d.get(key));
                if default_v == Some(v) {
                    continue;
                }
                let nested_default = default_v;
                sorted.insert(key.clone(), canonicalize(v, nested_default));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| canonicalize(item, None)).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrowserConfig;

    #[test]
    fn identical_configs_yield_identical_signatures() {
        let default = BrowserConfig::default();
        let a = BrowserConfig::default();
        let b = BrowserConfig::default();
        assert_eq!(config_signature(&a, &default), config_signature(&b, &default));
    }

    #[test]
    fn differing_configs_yield_differing_signatures() {
        let default = BrowserConfig::default();
        let mut variant = BrowserConfig::default();
        variant.headless = false;
        assert_ne!(
            config_signature(&default, &default),
            config_signature(&variant, &default)
        );
    }

    #[test]
    fn signature_is_stable_across_recomputation() {
        let default = BrowserConfig::default();
        let mut variant = BrowserConfig::default();
        variant.text_mode = true;
        let sig1 = config_signature(&variant, &default);
        let sig2 = config_signature(&variant, &default);
        assert_eq!(sig1, sig2);
    }
}
