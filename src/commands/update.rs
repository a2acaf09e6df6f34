use clap::Args;
use std::env;
use std::path::PathBuf;

use deskthing_template::defaults;
use deskthing_template::package_manager::Npm;
use deskthing_template::prompt::PromptEngine;
use deskthing_template::template::{BundledTemplates, DirectoryTemplates, TemplateSource};
use deskthing_template::upgrade::{self, UpgradeConfig, UpgradeReport};
use deskthing_template::Error;

use crate::commands::{CmdResult, GlobalArgs};

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    /// Upgrade an existing app project to the current template
    #[arg(long)]
    pub update: bool,

    /// Leave template-governed files (vite/tsconfig/eslint/package.json) untouched
    #[arg(long)]
    pub no_overwrite: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub path: Option<String>,

    /// Read templates from <DIR>/<variant>/<file> instead of the bundled set
    #[arg(long, value_name = "DIR")]
    pub template_dir: Option<String>,

    /// Do not run npm to replace the legacy packages
    #[arg(long)]
    pub skip_install: bool,
}

/// Expand `~` and make `raw` absolute against the working directory.
fn resolve_dir(field: &str, raw: &str) -> deskthing_template::Result<PathBuf> {
    let expanded = PathBuf::from(shellexpand::tilde(raw).as_ref());
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        current_dir()?.join(expanded)
    };

    if !absolute.is_dir() {
        return Err(Error::validation_invalid_argument(
            field,
            "Directory does not exist",
            Some(raw.to_string()),
            None,
        ));
    }
    Ok(absolute)
}

fn current_dir() -> deskthing_template::Result<PathBuf> {
    env::current_dir()
        .map_err(|e| Error::internal_io(e.to_string(), Some("read current directory".to_string())))
}

pub fn run(args: UpdateArgs, global: &GlobalArgs) -> CmdResult<UpgradeReport> {
    if !args.update {
        return Err(Error::validation_invalid_argument(
            "update",
            "Only project upgrades are supported here",
            None,
            None,
        )
        .with_hint("Run 'npm create deskthing@latest' to scaffold a new app")
        .with_hint("Pass --update inside an existing app to upgrade it"));
    }

    let project_root = match &args.path {
        Some(raw) => resolve_dir("path", raw)?,
        None => current_dir()?,
    };

    let templates: Box<dyn TemplateSource> = match &args.template_dir {
        Some(raw) => Box::new(DirectoryTemplates::new(resolve_dir("template-dir", raw)?)),
        None => Box::new(BundledTemplates),
    };

    let prompter = if global.yes {
        PromptEngine::non_interactive()
    } else {
        PromptEngine::new()
    };

    let config = UpgradeConfig {
        project_root: project_root.clone(),
        no_overwrite: args.no_overwrite,
        skip_install: args.skip_install,
    };

    let report = upgrade::run_upgrade(
        &config,
        &defaults::load_defaults(),
        &prompter,
        &Npm::new(project_root),
        templates.as_ref(),
    )?;

    Ok((report, 0))
}
