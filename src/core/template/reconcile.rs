//! Bring template-governed project files in line with a template variant.
//!
//! Each file is handled on its own scoped thread. A failing file becomes a
//! warning in the report; siblings always run to completion.

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::thread;

use super::TemplateSource;
use crate::defaults::TemplateConfig;
use crate::error::{Error, Result};
use crate::paths::{self, ProjectPaths};
use crate::utils::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    /// Replaced with template content.
    Overwritten,
    /// Package descriptor scripts merged and version set.
    Merged,
    /// Did not exist; written from the template.
    Created,
    /// Already identical to the template.
    Unchanged,
    /// The variant has no template for this file.
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub outcome: FileOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub variant: String,
    pub files: Vec<FileReport>,
}

impl ReconcileReport {
    pub fn backups(&self) -> Vec<String> {
        self.files.iter().filter_map(|f| f.backup.clone()).collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.files.iter().filter_map(|f| f.warning.clone()).collect()
    }
}

/// What a reconciliation run needs beyond the project root.
pub struct ReconcileRequest<'a> {
    pub variant: &'a str,
    /// Confirmed app version, written into the package descriptor.
    pub version: &'a str,
    pub config: &'a TemplateConfig,
}

/// Merge the template's `scripts` over the user's and set `version`.
///
/// User scripts absent from the template are kept; on a shared name the
/// template wins. Every other top-level key is left as the user had it.
pub fn merge_package_scripts(user: Value, template: &Value, version: &str) -> Value {
    let mut package = match user {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let mut scripts = match package.remove("scripts") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    if let Some(Value::Object(template_scripts)) = template.get("scripts") {
        for (name, command) in template_scripts {
            scripts.insert(name.clone(), command.clone());
        }
    }

    package.insert("scripts".to_string(), Value::Object(scripts));
    package.insert("version".to_string(), Value::String(version.to_string()));
    Value::Object(package)
}

fn to_pretty_json(value: &Value, file: &str) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map(|mut s| {
            s.push('\n');
            s
        })
        .map_err(|e| Error::internal_json(e.to_string(), Some(format!("serialize {}", file))))
}

fn parse_json(raw: &str, file: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| Error::validation_invalid_json(e, Some(file.to_string())))
}

fn back_up(paths: &ProjectPaths, target: &Path, current: &str) -> Result<Option<String>> {
    let written = io::write_backup(&paths::backup_path(target), current, "back up project file")?;
    if written.is_none() {
        log_debug!("template", "{} already backed up", paths.relative(target));
    }
    Ok(written.map(|backup| paths.relative(&backup)))
}

/// Reconcile one file.
///
/// A malformed package descriptor is backed up and reported as `Failed`
/// with a warning. Other errors are returned to the caller, which records
/// them as warnings.
pub fn reconcile_file(
    paths: &ProjectPaths,
    source: &dyn TemplateSource,
    request: &ReconcileRequest,
    file: &str,
) -> Result<FileReport> {
    let report = |outcome, backup| FileReport {
        file: file.to_string(),
        outcome,
        backup,
        warning: None,
    };

    let Some(template) = source.read(request.variant, file)? else {
        log_debug!(
            "template",
            "Template file {} not found. Skipping...",
            source.describe(request.variant, file)
        );
        return Ok(report(FileOutcome::Skipped, None));
    };

    let target = paths.file(file);
    let existing = io::read_optional(&target, "read project file")?;

    let (content, outcome) = if file == request.config.package_descriptor {
        let template_json = parse_json(&template, &source.describe(request.variant, file))?;
        let (user_json, outcome) = match &existing {
            Some(current) => match parse_json(current, file) {
                Ok(user_json) => (user_json, FileOutcome::Merged),
                Err(err) => {
                    let backup = back_up(paths, &target, current)?;
                    let warning = format!("Error processing file {}: {}", file, err);
                    log_warning!("template", "{}", warning);
                    return Ok(FileReport {
                        file: file.to_string(),
                        outcome: FileOutcome::Failed,
                        backup,
                        warning: Some(warning),
                    });
                }
            },
            None => (template_json.clone(), FileOutcome::Created),
        };
        let merged = merge_package_scripts(user_json, &template_json, request.version);
        (to_pretty_json(&merged, file)?, outcome)
    } else {
        let outcome = if existing.is_some() {
            FileOutcome::Overwritten
        } else {
            FileOutcome::Created
        };
        (template.clone(), outcome)
    };

    let backup = match &existing {
        Some(current) if *current == content => return Ok(report(FileOutcome::Unchanged, None)),
        Some(current) if *current != template => back_up(paths, &target, current)?,
        _ => None,
    };

    if let Some(parent) = target.parent() {
        io::ensure_dir(parent, "create template target directory")?;
    }
    io::write_file_atomic(&target, &content, "write template file")?;
    Ok(report(outcome, backup))
}

/// Reconcile every governed file concurrently. Reports keep the configured
/// file order.
pub fn reconcile_all(
    paths: &ProjectPaths,
    source: &dyn TemplateSource,
    request: &ReconcileRequest,
) -> ReconcileReport {
    log_debug!("template", "Found the template used: {}", request.variant);

    let files = thread::scope(|scope| {
        let handles: Vec<_> = request
            .config
            .files
            .iter()
            .map(|file| {
                let handle = scope.spawn(move || reconcile_file(paths, source, request, file));
                (file, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(file, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(Error::internal_unexpected(format!("worker for {} panicked", file))));

                result.unwrap_or_else(|err| {
                    let warning = format!("Error processing file {}: {}", file, err);
                    log_warning!("template", "{}", warning);
                    FileReport {
                        file: file.clone(),
                        outcome: FileOutcome::Failed,
                        backup: None,
                        warning: Some(warning),
                    }
                })
            })
            .collect()
    });

    ReconcileReport {
        variant: request.variant.to_string(),
        files,
    }
}
