//! Source file discovery for the import codemod.

use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults::CodemodConfig;

/// Which files the walker yields.
#[derive(Debug, Clone)]
pub struct WalkFilter {
    pub extensions: Vec<String>,
    /// Directory names skipped at any depth.
    pub skip_dirs: Vec<String>,
}

impl From<&CodemodConfig> for WalkFilter {
    fn from(config: &CodemodConfig) -> Self {
        Self {
            extensions: config.source_extensions.clone(),
            skip_dirs: config.skip_dirs.clone(),
        }
    }
}

/// Collect matching source files under `root`, sorted.
///
/// Symlinks are neither followed nor returned, so a link cycle cannot
/// recurse and nothing outside the project is rewritten.
pub fn walk_source_files(root: &Path, filter: &WalkFilter) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk_recursive(root, filter, &mut files);
    files.sort();
    files
}

fn walk_recursive(dir: &Path, filter: &WalkFilter, files: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log_debug!("codemod", "Skipping unreadable directory {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_symlink() {
            continue;
        }

        let path = entry.path();
        if file_type.is_dir() {
            let name = entry.file_name().to_string_lossy().to_string();
            if filter.skip_dirs.iter().any(|skip| *skip == name) {
                continue;
            }
            walk_recursive(&path, filter, files);
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if filter.extensions.iter().any(|allowed| allowed == ext) {
                files.push(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::builtin_defaults;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn finds_ts_and_tsx_sorted() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "src/App.tsx");
        touch(dir.path(), "server/index.ts");
        touch(dir.path(), "src/main.ts");
        touch(dir.path(), "src/styles.css");
        touch(dir.path(), "vite.config.js");

        let filter = WalkFilter::from(&builtin_defaults().codemod);
        let files = walk_source_files(dir.path(), &filter);

        assert_eq!(
            relative(dir.path(), &files),
            vec!["server/index.ts", "src/App.tsx", "src/main.ts"]
        );
    }

    #[test]
    fn skips_dependency_and_build_dirs_at_any_depth() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "node_modules/pkg/index.ts");
        touch(dir.path(), "dist/index.ts");
        touch(dir.path(), "server/dist/out.ts");
        touch(dir.path(), "packages/a/node_modules/b/x.ts");
        touch(dir.path(), "packages/a/src/keep.ts");

        let filter = WalkFilter::from(&builtin_defaults().codemod);
        let files = walk_source_files(dir.path(), &filter);

        assert_eq!(relative(dir.path(), &files), vec!["packages/a/src/keep.ts"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_followed() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        touch(outside.path(), "external.ts");
        touch(dir.path(), "src/real.ts");
        std::os::unix::fs::symlink(outside.path(), dir.path().join("src/linked")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("src/real.ts"), dir.path().join("src/alias.ts"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("src/loop")).unwrap();

        let filter = WalkFilter::from(&builtin_defaults().codemod);
        let files = walk_source_files(dir.path(), &filter);

        assert_eq!(relative(dir.path(), &files), vec!["src/real.ts"]);
    }
}
