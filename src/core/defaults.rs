use serde::{Deserialize, Serialize};
use std::fs;

use crate::manifest::schema::is_valid_version;
use crate::paths;

/// Root configuration structure for deskthing.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via deskthing.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_versions")]
    pub versions: KnownVersions,

    #[serde(default = "default_manifest")]
    pub manifest: ManifestDefaults,

    #[serde(default = "default_templates")]
    pub templates: TemplateConfig,

    #[serde(default = "default_codemod")]
    pub codemod: CodemodConfig,

    #[serde(default = "default_packages")]
    pub packages: PackageConfig,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            versions: default_versions(),
            manifest: default_manifest(),
            templates: default_templates(),
            codemod: default_codemod(),
            packages: default_packages(),
        }
    }
}

impl Defaults {
    /// Reject overrides that would write an unusable manifest.
    pub fn validate(&self) -> crate::Result<()> {
        let versions = [
            ("versions.app_version", &self.versions.app_version),
            ("versions.compatible_server", &self.versions.compatible_server),
            ("versions.compatible_client", &self.versions.compatible_client),
        ];
        for (key, value) in versions {
            if !is_valid_version(value) {
                return Err(crate::Error::config_invalid_value(
                    key,
                    Some(value.clone()),
                    "must be a full semantic version (e.g. 0.11.5)",
                ));
            }
        }

        if self.templates.default_variant.trim().is_empty() {
            return Err(crate::Error::config_invalid_value(
                "templates.default_variant",
                None,
                "must not be empty",
            ));
        }

        Ok(())
    }
}

/// Versions this tool knows to be good for new and upgraded apps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownVersions {
    pub app_version: String,
    pub compatible_server: String,
    pub compatible_client: String,
}

/// Fallback values used when an existing manifest lacks a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestDefaults {
    pub id: String,
    pub label: String,
    pub description: String,
    pub author: String,
    pub platforms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub default_variant: String,
    /// Template-governed files, relative to the project root.
    pub files: Vec<String>,
    /// The one file whose `scripts` table is merged instead of overwritten.
    pub package_descriptor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodemodConfig {
    pub source_extensions: Vec<String>,
    /// Directory names skipped at any depth.
    pub skip_dirs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    pub uninstall: Vec<String>,
    pub install: Vec<String>,
    pub install_dev: Vec<String>,
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_versions() -> KnownVersions {
    KnownVersions {
        app_version: "0.11.5".to_string(),
        compatible_server: "0.11.18".to_string(),
        compatible_client: "0.11.2".to_string(),
    }
}

fn default_manifest() -> ManifestDefaults {
    ManifestDefaults {
        id: "deskthingtemplateapp".to_string(),
        label: "Template App".to_string(),
        description: "Description was not found while updating".to_string(),
        author: "Unknown".to_string(),
        platforms: vec![
            "windows".to_string(),
            "mac".to_string(),
            "linux".to_string(),
        ],
    }
}

fn default_templates() -> TemplateConfig {
    TemplateConfig {
        default_variant: "full".to_string(),
        files: vec![
            "vite.config.ts".to_string(),
            "tsconfig.json".to_string(),
            "tsconfig.node.json".to_string(),
            "tsconfig.app.json".to_string(),
            "eslint.config.js".to_string(),
            "package.json".to_string(),
        ],
        package_descriptor: "package.json".to_string(),
    }
}

fn default_codemod() -> CodemodConfig {
    CodemodConfig {
        source_extensions: vec!["ts".to_string(), "tsx".to_string()],
        skip_dirs: vec![
            "node_modules".to_string(),
            "dist".to_string(),
            ".git".to_string(),
        ],
    }
}

fn default_packages() -> PackageConfig {
    PackageConfig {
        uninstall: vec![
            "deskthing-client".to_string(),
            "deskthing-server".to_string(),
            "concurrently".to_string(),
        ],
        install: vec![
            "@deskthing/client@latest".to_string(),
            "@deskthing/server@latest".to_string(),
        ],
        install_dev: vec![
            "vite".to_string(),
            "tsm".to_string(),
            "@deskthing/types@latest".to_string(),
            "@deskthing/cli@latest".to_string(),
        ],
    }
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If deskthing.json is missing or invalid, falls back to built-in defaults.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

/// Load the full deskthing.json config, falling back to defaults on any error.
pub fn load_config() -> ToolConfig {
    match load_config_from_file() {
        Ok(Some(config)) => match config.defaults.validate() {
            Ok(()) => config,
            Err(err) => {
                log_warning!("config", "Ignoring deskthing.json: {}", err);
                ToolConfig::default()
            }
        },
        Ok(None) => ToolConfig::default(),
        Err(err) => {
            log_warning!("config", "Ignoring deskthing.json: {}", err);
            ToolConfig::default()
        }
    }
}

fn load_config_from_file() -> crate::Result<Option<ToolConfig>> {
    let path = paths::config_json()?;

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    let config: ToolConfig = serde_json::from_str(&content)
        .map_err(|e| crate::Error::config_invalid_json(path.display().to_string(), e))?;

    Ok(Some(config))
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_builtin_sections() {
        let raw = r#"{ "defaults": { "versions": {
            "app_version": "1.0.0",
            "compatible_server": "0.12.0",
            "compatible_client": "0.12.1"
        } } }"#;

        let config: ToolConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.defaults.versions.compatible_server, "0.12.0");
        assert_eq!(config.defaults.manifest.author, "Unknown");
        assert_eq!(config.defaults.templates.default_variant, "full");
        assert!(config
            .defaults
            .codemod
            .skip_dirs
            .contains(&"node_modules".to_string()));
    }

    #[test]
    fn builtin_defaults_are_valid() {
        assert!(builtin_defaults().validate().is_ok());
    }

    #[test]
    fn invalid_version_override_is_rejected() {
        let mut defaults = builtin_defaults();
        defaults.versions.compatible_client = "latest".to_string();

        let err = defaults.validate().unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_value");
        assert_eq!(err.details["key"], "versions.compatible_client");
    }

    #[test]
    fn builtin_template_set_includes_package_descriptor() {
        let defaults = builtin_defaults();
        assert!(defaults
            .templates
            .files
            .contains(&defaults.templates.package_descriptor));
        assert_eq!(defaults.templates.files.len(), 6);
    }
}
