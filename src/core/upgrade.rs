//! Upgrade an existing DeskThing app project to the current layout, schema,
//! dependencies, and import conventions.
//!
//! Stages run in a fixed order: manifest location, manifest schema,
//! dependencies, template files, source imports. Manifest and dependency
//! failures abort the run; template and source failures are collected as
//! warnings.

use serde::Serialize;
use std::path::PathBuf;

use crate::defaults::Defaults;
use crate::error::Result;
use crate::logger;
use crate::manifest::locator::{self, LocateResult};
use crate::manifest::schema::{self, ManifestUpdate};
use crate::package_manager::{self, PackageManager};
use crate::paths::ProjectPaths;
use crate::prompt::{Prompter, YesNoPrompt};
use crate::refactor::{self, CodemodReport, WalkFilter};
use crate::template::reconcile::{self, ReconcileReport, ReconcileRequest};
use crate::template::TemplateSource;

/// Per-run options. The project root is resolved once by the caller.
#[derive(Debug, Clone)]
pub struct UpgradeConfig {
    pub project_root: PathBuf,
    /// Leave template-governed files alone.
    pub no_overwrite: bool,
    /// Do not run the package manager.
    pub skip_install: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeStatus {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Done,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradeReport {
    pub status: UpgradeStatus,
    pub project_root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<LocateResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<ManifestUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<StageStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<ReconcileReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codemod: Option<CodemodReport>,
    pub backups: Vec<String>,
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
}

impl UpgradeReport {
    fn new(status: UpgradeStatus, paths: &ProjectPaths) -> Self {
        Self {
            status,
            project_root: paths.root().display().to_string(),
            manifest: None,
            schema: None,
            dependencies: None,
            templates: None,
            codemod: None,
            backups: Vec::new(),
            warnings: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Run a stage under a spinner, marking it failed if it returns an error.
fn with_progress<T>(message: &str, stage: impl FnOnce() -> Result<T>) -> Result<T> {
    logger::start_progress(message);
    let result = stage();
    logger::stop_progress(result.is_ok());
    result
}

pub fn run_upgrade(
    config: &UpgradeConfig,
    defaults: &Defaults,
    prompter: &dyn Prompter,
    packages: &dyn PackageManager,
    templates: &dyn TemplateSource,
) -> Result<UpgradeReport> {
    let paths = ProjectPaths::new(&config.project_root);
    log_debug!("upgrade", "Updating project at {}", paths.root().display());

    let state = locator::ensure_present(&paths)?;
    log_debug!("upgrade", "Manifest state: {:?}", state);

    let proceed = prompter.ask_yes_no(&YesNoPrompt {
        question: format!(
            "Update the DeskThing app in {}? Modified files will be backed up",
            paths.root().display()
        ),
        default: true,
    });
    if !proceed {
        log_status!("upgrade", "Update cancelled. Nothing was changed");
        return Ok(UpgradeReport::new(UpgradeStatus::Cancelled, &paths));
    }

    let mut report = UpgradeReport::new(UpgradeStatus::Completed, &paths);

    let located = locator::resolve_manifest(&paths)?;
    if let Some(backup) = &located.legacy_backup {
        report.backups.push(backup.clone());
    }
    report.manifest = Some(located);

    let update = schema::update_manifest(&paths, prompter, defaults)?;
    log_status!(
        "manifest",
        "{} updated to {} (server {}, client {})",
        update.id,
        update.version,
        update.required_versions.server,
        update.required_versions.client
    );

    if config.skip_install {
        log_debug!("upgrade", "Skipping dependency update");
        report.dependencies = Some(StageStatus::Skipped);
    } else {
        with_progress("Updating dependencies...", || {
            package_manager::update_dependencies(packages, &defaults.packages)
        })?;
        report.dependencies = Some(StageStatus::Done);
    }

    if config.no_overwrite {
        log_debug!("upgrade", "Not overwriting template files (--no-overwrite)");
    } else {
        let variant = update
            .template
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| defaults.templates.default_variant.clone());
        let request = ReconcileRequest {
            variant: &variant,
            version: &update.version,
            config: &defaults.templates,
        };

        logger::start_progress("Updating template files...");
        let reconciled = reconcile::reconcile_all(&paths, templates, &request);
        logger::stop_progress(reconciled.warnings().is_empty());

        report.backups.extend(reconciled.backups());
        report.warnings.extend(reconciled.warnings());
        report.templates = Some(reconciled);
    }

    logger::start_progress("Updating import statements...");
    let codemod = refactor::run_codemod(&paths, &WalkFilter::from(&defaults.codemod));
    logger::stop_progress(codemod.warnings.is_empty());
    report.warnings.extend(codemod.warnings.iter().cloned());
    report.codemod = Some(codemod);

    report.schema = Some(update);

    logger::success("upgrade", "Project updated successfully!");
    if !report.backups.is_empty() {
        let note = "Backup files have been created for modified files (.backup extension)";
        log_warning!("upgrade", "{}", note);
        report.notes.push(note.to_string());
    }
    let review = "Please review the changes and test your application";
    log_status!("upgrade", "{}", review);
    report.notes.push(review.to_string());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::builtin_defaults;
    use crate::prompt::VersionPrompt;
    use crate::template::BundledTemplates;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    struct Scripted {
        proceed: bool,
    }

    impl Prompter for Scripted {
        fn ask_version(&self, prompt: &VersionPrompt) -> Result<String> {
            Ok(prompt.default.clone())
        }

        fn ask_yes_no(&self, _prompt: &YesNoPrompt) -> bool {
            self.proceed
        }
    }

    #[derive(Default)]
    struct NoopPackages {
        calls: RefCell<usize>,
    }

    impl PackageManager for NoopPackages {
        fn uninstall(&self, _packages: &[String]) -> Result<()> {
            *self.calls.borrow_mut() += 1;
            Ok(())
        }

        fn install(&self, _packages: &[String], _dev: bool) -> Result<()> {
            *self.calls.borrow_mut() += 1;
            Ok(())
        }
    }

    fn config(root: &std::path::Path) -> UpgradeConfig {
        UpgradeConfig {
            project_root: root.to_path_buf(),
            no_overwrite: false,
            skip_install: false,
        }
    }

    #[test]
    fn missing_manifest_fails_before_prompting() {
        let dir = tempdir().unwrap();
        let packages = NoopPackages::default();

        let err = run_upgrade(
            &config(dir.path()),
            &builtin_defaults(),
            &Scripted { proceed: true },
            &packages,
            &BundledTemplates,
        )
        .unwrap_err();

        assert_eq!(err.code.as_str(), "project.manifest_missing");
        assert_eq!(*packages.calls.borrow(), 0);
    }

    #[test]
    fn declining_leaves_project_untouched() {
        let dir = tempdir().unwrap();
        let legacy = dir.path().join("public/manifest.json");
        fs::create_dir_all(legacy.parent().unwrap()).unwrap();
        fs::write(&legacy, r#"{"id":"x"}"#).unwrap();
        let packages = NoopPackages::default();

        let report = run_upgrade(
            &config(dir.path()),
            &builtin_defaults(),
            &Scripted { proceed: false },
            &packages,
            &BundledTemplates,
        )
        .unwrap();

        assert_eq!(report.status, UpgradeStatus::Cancelled);
        assert!(legacy.exists());
        assert!(!dir.path().join("deskthing").exists());
        assert_eq!(*packages.calls.borrow(), 0);
    }

    #[test]
    fn no_overwrite_and_skip_install_limit_the_run() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("deskthing/manifest.json");
        fs::create_dir_all(manifest.parent().unwrap()).unwrap();
        fs::write(&manifest, r#"{"id":"x","version":"0.2.0"}"#).unwrap();
        fs::write(dir.path().join("vite.config.ts"), "custom").unwrap();
        let packages = NoopPackages::default();

        let report = run_upgrade(
            &UpgradeConfig {
                project_root: dir.path().to_path_buf(),
                no_overwrite: true,
                skip_install: true,
            },
            &builtin_defaults(),
            &Scripted { proceed: true },
            &packages,
            &BundledTemplates,
        )
        .unwrap();

        assert_eq!(report.status, UpgradeStatus::Completed);
        assert_eq!(report.dependencies, Some(StageStatus::Skipped));
        assert!(report.templates.is_none());
        assert_eq!(*packages.calls.borrow(), 0);
        assert_eq!(fs::read_to_string(dir.path().join("vite.config.ts")).unwrap(), "custom");
        assert_eq!(report.schema.as_ref().unwrap().version, "0.2.0");
    }
}
