//! Source rewrites for the DeskThing package split.
//!
//! Walks a project's TypeScript sources and runs an ordered list of pure
//! rewrite rules over each file. Matching is scoped to code: comments and
//! string literals are never rewritten, and renames respect identifier
//! boundaries.

pub mod codemod;
pub mod imports;
pub mod lexer;
pub mod walk;

pub use codemod::{apply_rules, rewrite_file, run_codemod, CodemodReport, FileRewrite};
pub use imports::{Rule, RuleContext, RULES, TOKEN_RENAMES};
pub use walk::{walk_source_files, WalkFilter};
