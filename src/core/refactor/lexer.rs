//! Minimal JS/TS scanner that separates code from comments and strings.
//!
//! Only the distinctions the codemod needs are tracked: line and block
//! comments, single/double quoted strings, and template literals. Inside a
//! template literal, `${ ... }` interpolations are code again and may nest.
//!
//! A `'` directly after an identifier character never opens a string, so
//! apostrophes in JSX text (`<p>It's {value}</p>`) stay code. Regex literals
//! are not recognized: a quote or backtick inside one (`` /`/g ``) opens a
//! string, and renames after it on that line (or, for a backtick, up to the
//! next backtick) are skipped.

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Quoted(u8),
    Template,
}

/// Per-byte classification of a source text.
#[derive(Debug, Clone)]
pub struct CodeMap {
    code: Vec<bool>,
}

impl CodeMap {
    pub fn scan(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut code = vec![false; bytes.len()];
        let mut state = State::Code;
        // Brace depth at which each open `${` interpolation closes.
        let mut interpolations: Vec<usize> = Vec::new();
        let mut depth = 0usize;
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            let next = bytes.get(i + 1).copied();

            match state {
                State::Code => match (b, next) {
                    (b'/', Some(b'/')) => {
                        state = State::LineComment;
                        i += 2;
                        continue;
                    }
                    (b'/', Some(b'*')) => {
                        state = State::BlockComment;
                        i += 2;
                        continue;
                    }
                    (b'\'', _) if i > 0 && is_word_byte(bytes[i - 1]) => code[i] = true,
                    (b'\'' | b'"', _) => state = State::Quoted(b),
                    (b'`', _) => state = State::Template,
                    (b'{', _) => {
                        depth += 1;
                        code[i] = true;
                    }
                    (b'}', _) if interpolations.last() == Some(&depth) => {
                        interpolations.pop();
                        state = State::Template;
                    }
                    (b'}', _) => {
                        depth = depth.saturating_sub(1);
                        code[i] = true;
                    }
                    _ => code[i] = true,
                },
                State::LineComment => {
                    if b == b'\n' {
                        state = State::Code;
                        code[i] = true;
                    }
                }
                State::BlockComment => {
                    if b == b'*' && next == Some(b'/') {
                        state = State::Code;
                        i += 2;
                        continue;
                    }
                }
                State::Quoted(quote) => match b {
                    b'\\' => {
                        i += 2;
                        continue;
                    }
                    b'\n' => {
                        // Unterminated string; recover at end of line.
                        state = State::Code;
                        code[i] = true;
                    }
                    _ if b == quote => state = State::Code,
                    _ => {}
                },
                State::Template => match (b, next) {
                    (b'\\', _) => {
                        i += 2;
                        continue;
                    }
                    (b'`', _) => state = State::Code,
                    (b'$', Some(b'{')) => {
                        interpolations.push(depth);
                        state = State::Code;
                        i += 2;
                        continue;
                    }
                    _ => {}
                },
            }
            i += 1;
        }

        Self { code }
    }

    pub fn is_code(&self, offset: usize) -> bool {
        self.code.get(offset).copied().unwrap_or(false)
    }

    /// True when every byte of `start..end` is code.
    pub fn is_code_range(&self, start: usize, end: usize) -> bool {
        end <= self.code.len() && self.code[start..end].iter().all(|&c| c)
    }
}
