//! Dependency changes through the project's package manager.

use std::path::PathBuf;

use crate::defaults::PackageConfig;
use crate::error::Result;
use crate::utils::command;

pub trait PackageManager {
    fn uninstall(&self, packages: &[String]) -> Result<()>;

    fn install(&self, packages: &[String], dev: bool) -> Result<()>;
}

/// `npm`, run in the project root with output streamed to the terminal.
#[derive(Debug, Clone)]
pub struct Npm {
    root: PathBuf,
    program: String,
}

impl Npm {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            program: npm_program().to_string(),
        }
    }

    fn run(&self, args: Vec<String>) -> Result<()> {
        log_debug!("npm", "{}", command::display_command(&self.program, &args));
        command::run_in_streaming(&self.root, &self.program, &args)
    }
}

fn npm_program() -> &'static str {
    if cfg!(windows) {
        "npm.cmd"
    } else {
        "npm"
    }
}

pub fn uninstall_args(packages: &[String]) -> Vec<String> {
    std::iter::once("uninstall".to_string())
        .chain(packages.iter().cloned())
        .collect()
}

pub fn install_args(packages: &[String], dev: bool) -> Vec<String> {
    let flag = if dev { "--save-dev" } else { "--save" };
    std::iter::once("install".to_string())
        .chain(packages.iter().cloned())
        .chain(std::iter::once(flag.to_string()))
        .collect()
}

impl PackageManager for Npm {
    fn uninstall(&self, packages: &[String]) -> Result<()> {
        self.run(uninstall_args(packages))
    }

    fn install(&self, packages: &[String], dev: bool) -> Result<()> {
        self.run(install_args(packages, dev))
    }
}

/// Remove the pre-split packages, then install the current ones.
///
/// Stops at the first failing command.
pub fn update_dependencies(manager: &dyn PackageManager, packages: &PackageConfig) -> Result<()> {
    if !packages.uninstall.is_empty() {
        log_status!("npm", "Removing legacy packages: {}", packages.uninstall.join(" "));
        manager.uninstall(&packages.uninstall)?;
    }
    if !packages.install.is_empty() {
        log_status!("npm", "Installing: {}", packages.install.join(" "));
        manager.install(&packages.install, false)?;
    }
    if !packages.install_dev.is_empty() {
        log_status!("npm", "Installing dev dependencies: {}", packages.install_dev.join(" "));
        manager.install(&packages.install_dev, true)?;
    }
    Ok(())
}
