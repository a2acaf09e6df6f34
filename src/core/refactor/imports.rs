//! Import and identifier rewrite rules for the DeskThing package split.
//!
//! The monolithic `deskthing-server` / `deskthing-client` packages were split
//! into `@deskthing/server`, `@deskthing/client` and `@deskthing/types`, and
//! several event and request names were renamed. Each rule is a pure
//! `fn(&RuleContext, &str) -> String`; [`RULES`] fixes their order.

use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

use super::lexer::CodeMap;

pub const TYPES_PACKAGE: &str = "@deskthing/types";
pub const SERVER_PACKAGE: &str = "@deskthing/server";
pub const CLIENT_PACKAGE: &str = "@deskthing/client";

/// Identifier that stays on the runtime package after the split.
const RUNTIME_EXPORT: &str = "DeskThing";

/// Renamed tokens, applied in order. Longer names that share a prefix
/// come first.
pub const TOKEN_RENAMES: &[(&str, &str)] = &[
    ("ServerEvent", "DESKTHING_EVENTS"),
    ("taskId: ", "taskReference: "),
    ("SEND_TYPES", "APP_REQUESTS"),
    ("ToServerData", "GenericTransitData"),
    ("FromDeviceDataEvents", "DEVICE_CLIENT"),
    ("ToDeviceDataEvents", "CLIENT_REQUESTS"),
    ("DeskThing.sendLog", "console.log"),
    ("DeskThing.sendDebug", "console.debug"),
    ("DeskThing.sendWarning", "console.warn"),
    ("DeskThing.sendWarn", "console.warn"),
    ("DeskThing.sendError", "console.error"),
    ("DeskThing.sendDataToClient", "DeskThing.send"),
];

static SERVER_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s*\{([^}]+)\}\s*from\s*['"]deskthing-server['"]"#).unwrap()
});

static CLIENT_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s*\{([^}]+)\}\s*from\s*['"]deskthing-client['"]"#).unwrap()
});

static DESKTHING_REEXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s*\{\s*DeskThing\s*\};?[ \t]*(?:\r?\n)?").unwrap()
});

/// Per-file facts a rule may depend on.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub path: &'a Path,
}

impl RuleContext<'_> {
    /// `server/index.ts`, matched case-insensitively with either separator.
    pub fn is_server_entry(&self) -> bool {
        let path = self.path.to_string_lossy().to_lowercase();
        path.ends_with("server/index.ts") || path.ends_with("server\\index.ts")
    }
}

pub type RuleFn = fn(&RuleContext, &str) -> String;

#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub apply: RuleFn,
}

pub const RULES: &[Rule] = &[
    Rule {
        name: "split_server_imports",
        apply: split_server_imports,
    },
    Rule {
        name: "split_client_imports",
        apply: split_client_imports,
    },
    Rule {
        name: "remove_deskthing_reexport",
        apply: remove_deskthing_reexport,
    },
    Rule {
        name: "rename_tokens",
        apply: rename_tokens,
    },
];

// ============================================================================
// Import splitting
// ============================================================================

fn split_import_list(names: &str, runtime_package: &str) -> String {
    let names: Vec<&str> = names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    let types: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| *name != RUNTIME_EXPORT)
        .collect();
    let has_runtime = names.contains(&RUNTIME_EXPORT);

    let mut lines = Vec::new();
    if !types.is_empty() {
        lines.push(format!("import {{ {} }} from '{}'", types.join(", "), TYPES_PACKAGE));
    }
    if has_runtime {
        lines.push(format!("import {{ {} }} from '{}'", RUNTIME_EXPORT, runtime_package));
    }
    lines.join("\n")
}

/// Replace each match of `pattern` that starts in code.
fn replace_in_code<F>(content: &str, pattern: &Regex, mut replacement: F) -> String
where
    F: FnMut(&Captures) -> String,
{
    let map = CodeMap::scan(content);
    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for caps in pattern.captures_iter(content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if !map.is_code(whole.start()) {
            continue;
        }
        out.push_str(&content[last..whole.start()]);
        out.push_str(&replacement(&caps));
        last = whole.end();
    }

    out.push_str(&content[last..]);
    out
}

pub fn split_server_imports(_ctx: &RuleContext, content: &str) -> String {
    replace_in_code(content, &SERVER_IMPORT, |caps| {
        split_import_list(&caps[1], SERVER_PACKAGE)
    })
}

pub fn split_client_imports(_ctx: &RuleContext, content: &str) -> String {
    replace_in_code(content, &CLIENT_IMPORT, |caps| {
        split_import_list(&caps[1], CLIENT_PACKAGE)
    })
}

// ============================================================================
// Re-export removal
// ============================================================================

/// The server entry must no longer re-export `DeskThing`; every
/// `export { DeskThing }` statement in it is removed.
pub fn remove_deskthing_reexport(ctx: &RuleContext, content: &str) -> String {
    if !ctx.is_server_entry() {
        return content.to_string();
    }
    replace_in_code(content, &DESKTHING_REEXPORT, |_| String::new())
}

// ============================================================================
// Token renames
// ============================================================================

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Whole-identifier check. An edge is only checked when the token's own
/// edge byte is an identifier byte, so `taskId: ` still matches before any
/// value.
fn at_identifier_boundary(text: &str, start: usize, token: &str) -> bool {
    let bytes = text.as_bytes();
    let token_bytes = token.as_bytes();
    let end = start + token_bytes.len();

    let left_ok = match token_bytes.first() {
        Some(&first) if is_identifier_byte(first) => {
            start == 0 || !is_identifier_byte(bytes[start - 1])
        }
        _ => true,
    };
    let right_ok = match token_bytes.last() {
        Some(&last) if is_identifier_byte(last) => {
            end >= bytes.len() || !is_identifier_byte(bytes[end])
        }
        _ => true,
    };

    left_ok && right_ok
}

/// Replace `from` with `to` wherever it appears as a whole token in code.
pub fn replace_token(content: &str, from: &str, to: &str) -> String {
    if from.is_empty() || !content.contains(from) {
        return content.to_string();
    }

    let map = CodeMap::scan(content);
    let mut out = String::with_capacity(content.len());
    let mut last = 0;

    for (start, matched) in content.match_indices(from) {
        let end = start + matched.len();
        if !map.is_code_range(start, end) || !at_identifier_boundary(content, start, from) {
            continue;
        }
        out.push_str(&content[last..start]);
        out.push_str(to);
        last = end;
    }

    out.push_str(&content[last..]);
    out
}

pub fn rename_tokens(_ctx: &RuleContext, content: &str) -> String {
    TOKEN_RENAMES
        .iter()
        .fold(content.to_string(), |text, (from, to)| replace_token(&text, from, to))
}
