//! Resolve the project's manifest to the one canonical location.
//!
//! Older tool versions wrote `public/manifest.json` with `public/images` and
//! `public/icons` beside it. The current layout keeps all three under
//! `deskthing/`. Resolution is idempotent: every state converges on
//! "only the current manifest exists", and running again is a no-op.

use serde::Serialize;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::paths::{self, ProjectPaths, ASSET_DIRS};
use crate::utils::io;

/// Which manifests were found, as (legacy, current).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestState {
    LegacyOnly,
    Both,
    CurrentOnly,
    Missing,
}

impl ManifestState {
    pub fn detect(paths: &ProjectPaths) -> Self {
        match (paths.legacy_manifest().is_file(), paths.manifest().is_file()) {
            (true, false) => ManifestState::LegacyOnly,
            (true, true) => ManifestState::Both,
            (false, true) => ManifestState::CurrentOnly,
            (false, false) => ManifestState::Missing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocateAction {
    /// Legacy manifest and assets were moved under `deskthing/`.
    Migrated,
    /// Both existed; the legacy copy was removed.
    RemovedDuplicate,
    /// Already in the current layout.
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocateResult {
    #[serde(skip)]
    pub manifest_path: PathBuf,
    pub action: LocateAction,
    /// Asset directories moved from `public/` to `deskthing/`.
    pub moved_assets: Vec<String>,
    /// Asset directories left in `public/` because the target already existed.
    pub kept_assets: Vec<String>,
    /// Backup of a removed legacy manifest whose content differed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_backup: Option<String>,
}

/// Fail with a "no manifest" error unless at least one manifest exists.
/// Nothing is modified.
pub fn ensure_present(paths: &ProjectPaths) -> Result<ManifestState> {
    match ManifestState::detect(paths) {
        ManifestState::Missing => Err(missing(paths)),
        state => Ok(state),
    }
}

fn missing(paths: &ProjectPaths) -> Error {
    Error::project_manifest_missing(
        paths.root().display().to_string(),
        vec![
            paths.relative(&paths.legacy_manifest()),
            paths.relative(&paths.manifest()),
        ],
    )
}

/// Resolve legacy/current manifest locations to exactly one canonical file.
///
/// Any filesystem failure here is returned as an error; the caller treats
/// it as fatal because every later stage depends on the canonical path.
pub fn resolve_manifest(paths: &ProjectPaths) -> Result<LocateResult> {
    match ManifestState::detect(paths) {
        ManifestState::LegacyOnly => migrate_legacy(paths),
        ManifestState::Both => remove_duplicate(paths),
        ManifestState::CurrentOnly => {
            log_debug!("manifest", "Using manifest.json in /deskthing");
            Ok(LocateResult {
                manifest_path: paths.manifest(),
                action: LocateAction::Unchanged,
                moved_assets: Vec::new(),
                kept_assets: Vec::new(),
                legacy_backup: None,
            })
        }
        ManifestState::Missing => Err(missing(paths)),
    }
}

fn migrate_legacy(paths: &ProjectPaths) -> Result<LocateResult> {
    log_warning!(
        "manifest",
        "Old manifest.json found. Migrating to the new layout in /deskthing"
    );

    io::ensure_dir(&paths.current_root(), "create deskthing directory")?;

    let mut moved_assets = Vec::new();
    let mut kept_assets = Vec::new();

    for dir in ASSET_DIRS {
        let from = paths.legacy_root().join(dir);
        let to = paths.current_root().join(dir);

        if !from.is_dir() {
            log_debug!("manifest", "No legacy {}/ directory, skipping", dir);
            continue;
        }

        if to.exists() {
            log_warning!(
                "manifest",
                "{} already exists, leaving {} in place",
                paths.relative(&to),
                paths.relative(&from)
            );
            kept_assets.push(dir.to_string());
            continue;
        }

        io::rename_path(&from, &to, "move asset directory")?;
        moved_assets.push(dir.to_string());
    }

    io::rename_path(&paths.legacy_manifest(), &paths.manifest(), "move manifest")?;

    Ok(LocateResult {
        manifest_path: paths.manifest(),
        action: LocateAction::Migrated,
        moved_assets,
        kept_assets,
        legacy_backup: None,
    })
}

fn remove_duplicate(paths: &ProjectPaths) -> Result<LocateResult> {
    log_warning!(
        "manifest",
        "Both old and new manifest.json found. Keeping the new one and removing the old one"
    );

    let legacy = paths.legacy_manifest();
    let legacy_content = io::read_file(&legacy, "read legacy manifest")?;
    let current_content = io::read_file(&paths.manifest(), "read manifest")?;

    let legacy_backup = if legacy_content != current_content {
        io::write_backup(&paths::backup_path(&legacy), &legacy_content, "back up legacy manifest")?
            .map(|backup| paths.relative(&backup))
    } else {
        None
    };

    io::remove_file(&legacy, "remove legacy manifest")?;

    Ok(LocateResult {
        manifest_path: paths.manifest(),
        action: LocateAction::RemovedDuplicate,
        moved_assets: Vec::new(),
        kept_assets: Vec::new(),
        legacy_backup,
    })
}
