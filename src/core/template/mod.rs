//! Template variants and their reconciliation against a user project.
//!
//! Template content is looked up by `(variant, file)` through [`TemplateSource`].
//! The bundled set is compiled into the binary; `--template-dir` swaps in a
//! directory laid out as `<dir>/<variant>/<file>`.

pub mod reconcile;

use std::path::PathBuf;

use crate::error::Result;
use crate::utils::io;

pub trait TemplateSource: Sync {
    /// Template content for `file` in `variant`, or `None` when the variant
    /// does not govern that file.
    fn read(&self, variant: &str, file: &str) -> Result<Option<String>>;

    /// Human-readable origin, for logs.
    fn describe(&self, variant: &str, file: &str) -> String;
}

/// Templates shipped with the tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledTemplates;

const BUNDLED: &[(&str, &str, &str)] = &[
    ("full", "vite.config.ts", include_str!("../../../template/full/vite.config.ts")),
    ("full", "tsconfig.json", include_str!("../../../template/full/tsconfig.json")),
    ("full", "tsconfig.node.json", include_str!("../../../template/full/tsconfig.node.json")),
    ("full", "tsconfig.app.json", include_str!("../../../template/full/tsconfig.app.json")),
    ("full", "eslint.config.js", include_str!("../../../template/full/eslint.config.js")),
    ("full", "package.json", include_str!("../../../template/full/package.json")),
    ("base", "package.json", include_str!("../../../template/base/package.json")),
    ("min", "vite.config.ts", include_str!("../../../template/min/vite.config.ts")),
    ("min", "package.json", include_str!("../../../template/min/package.json")),
];

impl BundledTemplates {
    pub fn variants() -> Vec<&'static str> {
        let mut variants: Vec<&str> = BUNDLED.iter().map(|(v, _, _)| *v).collect();
        variants.dedup();
        variants
    }
}

impl TemplateSource for BundledTemplates {
    fn read(&self, variant: &str, file: &str) -> Result<Option<String>> {
        Ok(BUNDLED
            .iter()
            .find(|(v, f, _)| *v == variant && *f == file)
            .map(|(_, _, content)| content.to_string()))
    }

    fn describe(&self, variant: &str, file: &str) -> String {
        format!("bundled:{}/{}", variant, file)
    }
}

/// Templates read from disk at `<root>/<variant>/<file>`.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    root: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, variant: &str, file: &str) -> PathBuf {
        self.root.join(variant).join(file)
    }
}

impl TemplateSource for DirectoryTemplates {
    fn read(&self, variant: &str, file: &str) -> Result<Option<String>> {
        io::read_optional(&self.path_for(variant, file), "read template")
    }

    fn describe(&self, variant: &str, file: &str) -> String {
        self.path_for(variant, file).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn bundled_full_variant_covers_every_governed_file() {
        let defaults = crate::defaults::builtin_defaults();
        for file in &defaults.templates.files {
            assert!(
                BundledTemplates.read("full", file).unwrap().is_some(),
                "missing bundled full/{}",
                file
            );
        }
    }

    #[test]
    fn bundled_lookup_of_unknown_variant_is_none() {
        assert!(BundledTemplates.read("react-native", "package.json").unwrap().is_none());
        assert_eq!(BundledTemplates::variants(), vec!["full", "base", "min"]);
    }

    #[test]
    fn base_variant_does_not_govern_vite_config() {
        assert!(BundledTemplates.read("base", "vite.config.ts").unwrap().is_none());
        assert!(BundledTemplates.read("base", "package.json").unwrap().is_some());
    }

    #[test]
    fn bundled_vite_configs_keep_scaffold_bytes() {
        let full = BundledTemplates.read("full", "vite.config.ts").unwrap().unwrap();
        assert!(full.contains("import legacy from '@vitejs/plugin-legacy';\n"));

        let min = BundledTemplates.read("min", "vite.config.ts").unwrap().unwrap();
        assert!(min.ends_with("});"));
    }

    #[test]
    fn bundled_package_descriptors_are_valid_json() {
        for variant in BundledTemplates::variants() {
            let raw = BundledTemplates.read(variant, "package.json").unwrap().unwrap();
            let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
            assert!(parsed["scripts"].is_object());
        }
    }

    #[test]
    fn directory_templates_read_from_variant_subdir() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("min")).unwrap();
        fs::write(dir.path().join("min/vite.config.ts"), "export default {}").unwrap();

        let source = DirectoryTemplates::new(dir.path());
        assert_eq!(
            source.read("min", "vite.config.ts").unwrap().as_deref(),
            Some("export default {}")
        );
        assert!(source.read("min", "tsconfig.json").unwrap().is_none());
    }
}
