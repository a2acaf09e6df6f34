use crate::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Base tool config directory (~/.config/deskthing/ on all platforms)
pub fn config_dir() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected("APPDATA environment variable not set on Windows".to_string())
        })?;
        Ok(PathBuf::from(appdata).join("deskthing"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("deskthing"))
    }
}

/// Global deskthing.json config file path
pub fn config_json() -> Result<PathBuf> {
    Ok(config_dir()?.join("deskthing.json"))
}

pub const LEGACY_ROOT: &str = "public";
pub const CURRENT_ROOT: &str = "deskthing";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const ASSET_DIRS: &[&str] = &["images", "icons"];
pub const BACKUP_SUFFIX: &str = ".backup";

/// Well-known locations inside one app project.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `public/`, where older tool versions kept the manifest and assets.
    pub fn legacy_root(&self) -> PathBuf {
        self.root.join(LEGACY_ROOT)
    }

    /// `deskthing/`: the current manifest and asset root.
    pub fn current_root(&self) -> PathBuf {
        self.root.join(CURRENT_ROOT)
    }

    pub fn legacy_manifest(&self) -> PathBuf {
        self.legacy_root().join(MANIFEST_FILE)
    }

    pub fn manifest(&self) -> PathBuf {
        self.current_root().join(MANIFEST_FILE)
    }

    pub fn file(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Path relative to the project root, for display and reporting.
    pub fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Sibling path holding the pre-overwrite copy of `path`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_locations_hang_off_the_project_root() {
        let paths = ProjectPaths::new("/work/my-app");
        assert_eq!(
            paths.legacy_manifest(),
            PathBuf::from("/work/my-app/public/manifest.json")
        );
        assert_eq!(
            paths.manifest(),
            PathBuf::from("/work/my-app/deskthing/manifest.json")
        );
    }

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/work/app/tsconfig.json")),
            PathBuf::from("/work/app/tsconfig.json.backup")
        );
    }

    #[test]
    fn relative_strips_root() {
        let paths = ProjectPaths::new("/work/app");
        assert_eq!(
            paths.relative(Path::new("/work/app/server/index.ts")),
            "server/index.ts"
        );
    }
}
