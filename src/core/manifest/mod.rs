//! The app manifest: its on-disk shape, location, and schema migration.
//!
//! - `locator` - resolve legacy/current manifest paths to one canonical file
//! - `schema` - map deprecated fields onto the current schema

pub mod locator;
pub mod schema;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::io;

pub const TAG_AUDIO_SOURCE: &str = "audiosource";
pub const TAG_SCREEN_SAVER: &str = "screensaver";

/// Host-platform version ranges an app declares it works with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredVersions {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub client: String,
}

/// The persisted descriptor of a scaffolded app (`manifest.json`).
///
/// Every field is optional on read because manifests written by older tool
/// versions omit most of them. Keys this struct does not model are kept in
/// `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(
        rename = "requiredVersions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub required_versions: Option<RequiredVersions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(rename = "updateUrl", default, skip_serializing_if = "Option::is_none")]
    pub update_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Deprecated: numeric or string minimum server version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_server: Option<Value>,
    /// Deprecated: numeric or string minimum client version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_client: Option<Value>,
    /// Deprecated: superseded by the `audiosource` tag.
    #[serde(rename = "isAudioSource", default, skip_serializing_if = "Option::is_none")]
    pub is_audio_source: Option<Value>,
    /// Deprecated: superseded by the `screensaver` tag.
    #[serde(rename = "isScreenSaver", default, skip_serializing_if = "Option::is_none")]
    pub is_screen_saver: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppManifest {
    pub fn from_json(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| Error::internal_json(e.to_string(), Some("serialize manifest".to_string())))
    }
}

pub fn load(path: &Path) -> Result<AppManifest> {
    let content = io::read_file(path, "read manifest")?;
    AppManifest::from_json(&content, path)
}

/// Write the manifest in one atomic replace.
pub fn save(path: &Path, manifest: &AppManifest) -> Result<()> {
    let content = manifest.to_json()?;
    io::write_file_atomic(path, &content, "write manifest")
}

/// JavaScript-style truthiness, which is how legacy manifests were read.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_round_trip() {
        let raw = r#"{
            "id": "weather",
            "version": "0.1.0",
            "version_code": 10,
            "customSetting": { "nested": [1, 2, 3] }
        }"#;

        let manifest = AppManifest::from_json(raw, Path::new("manifest.json")).unwrap();
        assert_eq!(manifest.extra["version_code"], json!(10));
        assert_eq!(manifest.extra["customSetting"], json!({ "nested": [1, 2, 3] }));

        let written: Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(written["customSetting"], json!({ "nested": [1, 2, 3] }));
        assert_eq!(written["version_code"], json!(10));
    }

    #[test]
    fn legacy_compatibility_accepts_numbers_and_strings() {
        let raw = r#"{ "compatible_server": 0.9, "compatible_client": "0.10.1" }"#;
        let manifest = AppManifest::from_json(raw, Path::new("manifest.json")).unwrap();
        assert_eq!(manifest.compatible_server, Some(json!(0.9)));
        assert_eq!(manifest.compatible_client, Some(json!("0.10.1")));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = AppManifest::from_json("{ \"id\": ", Path::new("deskthing/manifest.json"))
            .unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }

    #[test]
    fn truthiness_matches_legacy_reader() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }
}
