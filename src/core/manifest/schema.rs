//! Manifest schema migration.
//!
//! Maps manifests written by any earlier tool version onto the current
//! schema. Precedence per field is "first present value wins"; empty strings
//! count as absent, matching how the legacy tooling read them. Fields outside
//! the mapping are carried through unchanged.

use semver::{Version, VersionReq};
use serde::Serialize;
use serde_json::Value;

use super::{is_truthy, AppManifest, RequiredVersions, TAG_AUDIO_SOURCE, TAG_SCREEN_SAVER};
use crate::defaults::Defaults;
use crate::error::Result;
use crate::paths::ProjectPaths;
use crate::prompt::{Prompter, VersionPrompt, YesNoPrompt};

// ============================================================================
// Validation
// ============================================================================

/// Strip the loose prefixes node-style tooling tolerates (`v1.2.3`, `=1.2.3`).
fn clean_version(input: &str) -> &str {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed).trim_start();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
}

/// Parse a full `MAJOR.MINOR.PATCH[-pre][+build]` version, returning its
/// canonical string form.
pub fn normalize_version(input: &str) -> Option<String> {
    Version::parse(clean_version(input))
        .ok()
        .map(|v| v.to_string())
}

pub fn is_valid_version(input: &str) -> bool {
    normalize_version(input).is_some()
}

/// Whether `input` is a usable compatibility range.
///
/// Accepts node-style ranges: comparators separated by spaces or commas,
/// `||` alternatives, and `a - b` hyphen ranges.
pub fn is_valid_range(input: &str) -> bool {
    let input = input.trim();
    if input.is_empty() {
        return false;
    }

    input
        .split("||")
        .all(|alternative| to_version_req(alternative).is_some())
}

fn to_version_req(alternative: &str) -> Option<VersionReq> {
    let alternative = alternative.trim();
    if alternative.is_empty() {
        return None;
    }

    if let Some((low, high)) = alternative.split_once(" - ") {
        let bounded = format!(">={}, <={}", low.trim(), high.trim());
        return VersionReq::parse(&bounded).ok();
    }

    // Glue bare operators to the following token: ">= 1.2.3" -> ">=1.2.3"
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op = String::new();
    for token in alternative.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '^' | '~')) {
            pending_op.push_str(token);
            continue;
        }
        comparators.push(format!("{}{}", std::mem::take(&mut pending_op), token));
    }
    if !pending_op.is_empty() || comparators.is_empty() {
        return None;
    }

    VersionReq::parse(&comparators.join(", ")).ok()
}

// ============================================================================
// Field mapping
// ============================================================================

/// Answers gathered before migration.
#[derive(Debug, Clone, Default)]
pub struct MigrationInput {
    /// The freshly confirmed app version.
    pub version: Option<String>,
    /// Reset both compatibility ranges to the tool's known-good versions.
    pub force_compatibility: bool,
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Render a deprecated numeric-or-string compatibility value.
fn legacy_compat(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn tags_from_legacy(manifest: &AppManifest) -> Vec<String> {
    let mut tags = Vec::new();
    if manifest.is_audio_source.as_ref().is_some_and(is_truthy) {
        tags.push(TAG_AUDIO_SOURCE.to_string());
    }
    if manifest.is_screen_saver.as_ref().is_some_and(is_truthy) {
        tags.push(TAG_SCREEN_SAVER.to_string());
    }
    tags
}

/// `>=<legacy>` when that forms a valid range, else `>=<known good>`.
fn fallback_range(legacy: Option<String>, known_good: &str) -> String {
    legacy
        .map(|v| format!(">={}", v))
        .filter(|range| is_valid_range(range))
        .unwrap_or_else(|| format!(">={}", known_good))
}

fn resolve_required_versions(
    manifest: &AppManifest,
    input: &MigrationInput,
    defaults: &Defaults,
) -> RequiredVersions {
    let known = &defaults.versions;

    if input.force_compatibility {
        return RequiredVersions {
            server: format!(">={}", known.compatible_server),
            client: format!(">={}", known.compatible_client),
        };
    }

    let server_fallback = || {
        fallback_range(
            legacy_compat(&manifest.compatible_server),
            &known.compatible_server,
        )
    };
    let client_fallback = || {
        fallback_range(
            legacy_compat(&manifest.compatible_client),
            &known.compatible_client,
        )
    };

    match &manifest.required_versions {
        Some(existing) => RequiredVersions {
            server: if is_valid_range(&existing.server) {
                existing.server.clone()
            } else {
                server_fallback()
            },
            client: if is_valid_range(&existing.client) {
                existing.client.clone()
            } else {
                client_fallback()
            },
        },
        None => RequiredVersions {
            server: server_fallback(),
            client: client_fallback(),
        },
    }
}

/// Build the current-schema manifest from an existing one.
///
/// Pure: the result is fully constructed in memory so the caller can write
/// it in one call.
pub fn migrate(existing: &AppManifest, input: &MigrationInput, defaults: &Defaults) -> AppManifest {
    let fallback = &defaults.manifest;
    let repository = present(&existing.repository);

    AppManifest {
        id: present(&existing.id).or_else(|| Some(fallback.id.clone())),
        label: present(&existing.label).or_else(|| Some(fallback.label.clone())),
        version: input
            .version
            .clone()
            .filter(|v| !v.is_empty())
            .or_else(|| present(&existing.version))
            .or_else(|| Some(defaults.versions.app_version.clone())),
        required_versions: Some(resolve_required_versions(existing, input, defaults)),
        tags: Some(
            existing
                .tags
                .clone()
                .unwrap_or_else(|| tags_from_legacy(existing)),
        ),
        requires: Some(existing.requires.clone().unwrap_or_default()),
        description: present(&existing.description)
            .or_else(|| Some(fallback.description.clone())),
        author: present(&existing.author).or_else(|| Some(fallback.author.clone())),
        platforms: Some(
            existing
                .platforms
                .clone()
                .unwrap_or_else(|| fallback.platforms.clone()),
        ),
        homepage: present(&existing.homepage)
            .or_else(|| repository.clone())
            .or_else(|| Some(String::new())),
        repository: Some(repository.clone().unwrap_or_default()),
        update_url: present(&existing.update_url)
            .or_else(|| repository.clone())
            .or_else(|| Some(String::new())),
        template: existing.template.clone(),
        compatible_server: existing.compatible_server.clone(),
        compatible_client: existing.compatible_client.clone(),
        is_audio_source: existing.is_audio_source.clone(),
        is_screen_saver: existing.is_screen_saver.clone(),
        extra: existing.extra.clone(),
    }
}

// ============================================================================
// Interactive update
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ManifestUpdate {
    #[serde(skip)]
    pub manifest: AppManifest,
    pub id: String,
    pub previous_version: Option<String>,
    pub version: String,
    pub required_versions: RequiredVersions,
    pub forced_compatibility: bool,
    pub template: Option<String>,
}

/// Read the canonical manifest, ask for the target version and whether to
/// reset compatibility ranges, then write the migrated manifest once.
pub fn update_manifest(
    paths: &ProjectPaths,
    prompter: &dyn Prompter,
    defaults: &Defaults,
) -> Result<ManifestUpdate> {
    let path = paths.manifest();
    let existing = super::load(&path)?;

    let default_version = present(&existing.version)
        .filter(|v| is_valid_version(v))
        .unwrap_or_else(|| defaults.versions.app_version.clone());

    let version = prompter.ask_version(&VersionPrompt {
        question: "Enter the version of the app you want to update to".to_string(),
        default: default_version,
    })?;

    let force_compatibility = prompter.ask_yes_no(&YesNoPrompt {
        question: format!(
            "Update the server and client compatibilities to {} and {}?",
            defaults.versions.compatible_server, defaults.versions.compatible_client
        ),
        default: true,
    });

    let input = MigrationInput {
        version: Some(version.clone()),
        force_compatibility,
    };
    let manifest = migrate(&existing, &input, defaults);

    super::save(&path, &manifest)?;
    log_debug!("manifest", "Wrote {}", paths.relative(&path));

    Ok(ManifestUpdate {
        id: manifest.id.clone().unwrap_or_default(),
        previous_version: existing.version.clone(),
        version,
        required_versions: manifest.required_versions.clone().unwrap_or_default(),
        forced_compatibility: force_compatibility,
        template: manifest.template.clone(),
        manifest,
    })
}
