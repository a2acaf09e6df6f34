/// A yes/no confirmation prompt.
pub struct YesNoPrompt {
    pub question: String,
    /// true = default yes [Y/n], false = default no [y/N]
    pub default: bool,
}

/// Free-text prompt for a semantic version, re-asked until valid.
pub struct VersionPrompt {
    pub question: String,
    /// Offered when the user just presses enter, and used verbatim when
    /// running non-interactively.
    pub default: String,
}
