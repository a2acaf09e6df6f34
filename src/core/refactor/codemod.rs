//! Apply the import rewrite rules across a project's source tree.

use serde::Serialize;
use std::path::Path;

use super::imports::{Rule, RuleContext, RULES};
use super::walk::{walk_source_files, WalkFilter};
use crate::error::Result;
use crate::paths::ProjectPaths;
use crate::utils::io;

#[derive(Debug, Clone, Serialize)]
pub struct FileRewrite {
    pub file: String,
    /// Names of the rules that changed this file, in application order.
    pub rules: Vec<&'static str>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CodemodReport {
    pub scanned: usize,
    pub rewritten: Vec<FileRewrite>,
    pub warnings: Vec<String>,
}

/// Run `rules` over `content` in order. Returns the final text and the
/// names of rules that changed it.
pub fn apply_rules(rules: &[Rule], ctx: &RuleContext, content: &str) -> (String, Vec<&'static str>) {
    let mut current = content.to_string();
    let mut applied = Vec::new();

    for rule in rules {
        let next = (rule.apply)(ctx, &current);
        if next != current {
            applied.push(rule.name);
            current = next;
        }
    }

    (current, applied)
}

/// Rewrite one file in place. Unchanged files are not written.
pub fn rewrite_file(path: &Path) -> Result<Vec<&'static str>> {
    let content = io::read_file(path, "read source file")?;
    let ctx = RuleContext { path };
    let (updated, applied) = apply_rules(RULES, &ctx, &content);

    if !applied.is_empty() {
        io::write_file_atomic(path, &updated, "write source file")?;
    }

    Ok(applied)
}

/// Rewrite every source file under the project root, one at a time.
///
/// A file that cannot be read or written is recorded as a warning and the
/// run moves on.
pub fn run_codemod(paths: &ProjectPaths, filter: &WalkFilter) -> CodemodReport {
    let files = walk_source_files(paths.root(), filter);
    let mut report = CodemodReport {
        scanned: files.len(),
        ..Default::default()
    };

    for path in &files {
        let relative = paths.relative(path);
        log_debug!("codemod", "Processing file {}", relative);

        match rewrite_file(path) {
            Ok(rules) if rules.is_empty() => {}
            Ok(rules) => {
                log_debug!("codemod", "Rewrote {} ({})", relative, rules.join(", "));
                report.rewritten.push(FileRewrite {
                    file: relative,
                    rules,
                });
            }
            Err(err) => {
                let warning = format!("Error updating imports in {}: {}", relative, err);
                log_warning!("codemod", "{}", warning);
                report.warnings.push(warning);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::builtin_defaults;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn rules_compose_in_order() {
        let source = "import { DeskThing, ServerEvent } from 'deskthing-server'\n\
                      DeskThing.on(ServerEvent.DATA, () => {})\n\
                      export { DeskThing }\n";
        let ctx = RuleContext {
            path: Path::new("server/index.ts"),
        };

        let (out, applied) = apply_rules(RULES, &ctx, source);

        assert_eq!(
            out,
            "import { DESKTHING_EVENTS } from '@deskthing/types'\n\
             import { DeskThing } from '@deskthing/server'\n\
             DeskThing.on(DESKTHING_EVENTS.DATA, () => {})\n"
        );
        assert_eq!(
            applied,
            vec!["split_server_imports", "remove_deskthing_reexport", "rename_tokens"]
        );
    }

    #[test]
    fn untouched_files_are_not_rewritten() {
        let dir = tempdir().unwrap();
        write(dir.path(), "src/plain.ts", "export const a = 1\n");
        let path = dir.path().join("src/plain.ts");
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        let applied = rewrite_file(&path).unwrap();

        assert!(applied.is_empty());
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn rewrite_replaces_file_without_temp_leftover() {
        let dir = tempdir().unwrap();
        write(dir.path(), "src/App.tsx", "import { DeskThing } from 'deskthing-client'\n");
        let path = dir.path().join("src/App.tsx");

        let applied = rewrite_file(&path).unwrap();

        assert_eq!(applied, vec!["split_client_imports"]);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "import { DeskThing } from '@deskthing/client'\n"
        );
        assert!(!dir.path().join("src/App.tsx.tmp").exists());
    }

    #[test]
    fn run_codemod_reports_rewritten_files() {
        let dir = tempdir().unwrap();
        write(dir.path(), "src/App.tsx", "import { DeskThing } from 'deskthing-client'\n");
        write(dir.path(), "src/util.ts", "export const x = 1\n");
        write(dir.path(), "node_modules/dep/index.ts", "import { DeskThing } from 'deskthing-client'\n");

        let paths = ProjectPaths::new(dir.path());
        let report = run_codemod(&paths, &WalkFilter::from(&builtin_defaults().codemod));

        assert_eq!(report.scanned, 2);
        assert_eq!(report.rewritten.len(), 1);
        assert_eq!(report.rewritten[0].file, "src/App.tsx");
        assert!(report.warnings.is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("src/App.tsx")).unwrap(),
            "import { DeskThing } from '@deskthing/client'\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("node_modules/dep/index.ts")).unwrap(),
            "import { DeskThing } from 'deskthing-client'\n"
        );
    }

    #[test]
    fn rerunning_is_a_no_op() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "server/index.ts",
            "import { DeskThing, SocketData } from 'deskthing-server'\nexport { DeskThing }\n",
        );
        let paths = ProjectPaths::new(dir.path());
        let filter = WalkFilter::from(&builtin_defaults().codemod);

        let first = run_codemod(&paths, &filter);
        let second = run_codemod(&paths, &filter);

        assert_eq!(first.rewritten.len(), 1);
        assert!(second.rewritten.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_becomes_a_warning() {
        let dir = tempdir().unwrap();
        // Invalid UTF-8 cannot be read as source text.
        let path = dir.path().join("src/binary.ts");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        write(dir.path(), "src/ok.ts", "DeskThing.sendLog('hi')\n");

        let paths = ProjectPaths::new(dir.path());
        let report = run_codemod(&paths, &WalkFilter::from(&builtin_defaults().codemod));

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("src/binary.ts"));
        assert_eq!(fs::read_to_string(dir.path().join("src/ok.ts")).unwrap(), "console.log('hi')\n");
    }
}
