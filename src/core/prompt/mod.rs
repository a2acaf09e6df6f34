mod types;

pub use types::*;

use crate::error::{Error, Result};
use crate::manifest::schema::normalize_version;
use std::io::{self, BufRead, IsTerminal, Write};

/// Interactive questions the upgrade flow needs answered.
///
/// Rendering and input handling live behind this trait so the engine can be
/// driven by a terminal, a `--yes` run, or a scripted test double.
pub trait Prompter {
    /// Ask for a semantic version. Implementations only ever return a
    /// value that passes [`crate::manifest::schema::is_valid_version`].
    fn ask_version(&self, prompt: &VersionPrompt) -> Result<String>;

    fn ask_yes_no(&self, prompt: &YesNoPrompt) -> bool;
}

/// Terminal prompt engine.
/// Handles TTY detection and provides consistent prompting behavior.
pub struct PromptEngine {
    interactive: bool,
}

impl PromptEngine {
    /// Create engine with automatic TTY detection.
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal() && io::stderr().is_terminal(),
        }
    }

    /// Force non-interactive mode (useful for --yes flags).
    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    fn read_line(&self, prompt: &str) -> Option<String> {
        eprint!("{}", prompt);
        io::stderr().flush().ok();

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(input.trim().to_string()),
        }
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for PromptEngine {
    fn ask_version(&self, prompt: &VersionPrompt) -> Result<String> {
        if !self.interactive {
            return normalize_version(&prompt.default)
                .ok_or_else(|| Error::validation_invalid_version("version", &prompt.default));
        }

        loop {
            let Some(answer) = self.read_line(&format!("{} ({}): ", prompt.question, prompt.default))
            else {
                // stdin closed: fall back to the default rather than spinning
                return normalize_version(&prompt.default)
                    .ok_or_else(|| Error::validation_invalid_version("version", &prompt.default));
            };

            let candidate = if answer.is_empty() {
                prompt.default.as_str()
            } else {
                answer.as_str()
            };

            match normalize_version(candidate) {
                Some(version) => return Ok(version),
                None => eprintln!("Invalid version format: '{}' (expected e.g. 1.2.3)", candidate),
            }
        }
    }

    fn ask_yes_no(&self, prompt: &YesNoPrompt) -> bool {
        if !self.interactive {
            return prompt.default;
        }

        let suffix = if prompt.default { "[Y/n]" } else { "[y/N]" };
        let Some(answer) = self.read_line(&format!("{} {}: ", prompt.question, suffix)) else {
            return prompt.default;
        };

        let trimmed = answer.to_lowercase();
        if trimmed.is_empty() {
            return prompt.default;
        }

        trimmed.starts_with('y')
    }
}
