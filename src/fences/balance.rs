//! Bracket and quote balance scanning
//!
//! A best-effort lexical pass: skips strings and comments the way the
//! fence's language would, and counts `()`, `[]`, `{}` per kind. Only a count
//! that differs at the end is a problem, so `([)]` passes. It is not a parser
//! and will miss plenty of real syntax errors.

/// Lexical conventions of one fence language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub quotes: &'static [char],
    pub line_comments: &'static [&'static str],
    pub block_comment: Option<(&'static str, &'static str)>,
    /// Python-style `'''` / `"""` strings
    pub triple_quotes: bool,
}

/// No strings, no comments: every bracket counts
pub const PLAIN: Dialect = Dialect {
    quotes: &[],
    line_comments: &[],
    block_comment: None,
    triple_quotes: false,
};

const PHP: Dialect = Dialect {
    quotes: &['\'', '"', '`'],
    line_comments: &["//", "#"],
    block_comment: Some(("/*", "*/")),
    triple_quotes: false,
};

const JAVASCRIPT: Dialect = Dialect {
    quotes: &['\'', '"', '`'],
    line_comments: &["//"],
    block_comment: Some(("/*", "*/")),
    triple_quotes: false,
};

const PYTHON: Dialect = Dialect {
    quotes: &['\'', '"'],
    line_comments: &["#"],
    block_comment: None,
    triple_quotes: true,
};

const JSON: Dialect = Dialect {
    quotes: &['"'],
    line_comments: &[],
    block_comment: None,
    triple_quotes: false,
};

const SQL: Dialect = Dialect {
    quotes: &['\'', '"', '`'],
    line_comments: &["--", "#"],
    block_comment: Some(("/*", "*/")),
    triple_quotes: false,
};

impl Dialect {
    /// Dialect for a (lower-cased) fence tag; `None` means [`PLAIN`] applies
    pub fn for_tag(tag: &str) -> Option<Dialect> {
        match tag {
            "php" => Some(PHP),
            "js" | "javascript" | "ts" | "typescript" => Some(JAVASCRIPT),
            "python" => Some(PYTHON),
            "json" => Some(JSON),
            "sql" => Some(SQL),
            _ => None,
        }
    }
}

/// First balance problem in a fence body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imbalance {
    /// 0-indexed line within the fence content
    pub line: u32,
    pub message: String,
}

impl Imbalance {
    fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

const BRACKETS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

/// Bookkeeping for one bracket kind
#[derive(Debug, Default)]
struct Tally {
    /// Lines of openers not yet closed
    open_lines: Vec<u32>,
    /// Closers seen with nothing open
    surplus: usize,
    first_surplus_line: Option<u32>,
}

impl Tally {
    fn open(&mut self, line: u32) {
        self.open_lines.push(line);
    }

    fn close(&mut self, line: u32) {
        if self.open_lines.pop().is_none() {
            self.surplus += 1;
            self.first_surplus_line.get_or_insert(line);
        }
    }

    /// `(line, message)` when openers and closers do not add up
    fn mismatch(&self, open: char, close: char) -> Option<(u32, String)> {
        let unclosed = self.open_lines.len();
        if unclosed > self.surplus {
            let line = self.open_lines[0];
            Some((line, format!("'{open}' is never closed")))
        } else if self.surplus > unclosed {
            let line = self.first_surplus_line?;
            Some((line, format!("'{close}' has no matching opening bracket")))
        } else {
            None
        }
    }
}

fn count_newlines(s: &str) -> u32 {
    s.bytes().filter(|b| *b == b'\n').count() as u32
}

/// Byte length of a string body up to and including `delim`, or `None` if unterminated
fn string_len(body: &str, delim: &str) -> Option<usize> {
    let mut chars = body.char_indices();
    while let Some((idx, ch)) = chars.next() {
        if ch == '\\' {
            chars.next();
            continue;
        }
        if body[idx..].starts_with(delim) {
            return Some(idx + delim.len());
        }
    }
    None
}

/// Scan `content` and report the earliest imbalance, if any
pub fn check(content: &str, dialect: &Dialect) -> Option<Imbalance> {
    let mut tallies: [Tally; 3] = Default::default();
    let mut line = 0u32;
    let mut i = 0usize;

    while i < content.len() {
        let rest = &content[i..];
        let Some(ch) = rest.chars().next() else {
            break;
        };

        if ch == '\n' {
            line += 1;
            i += 1;
            continue;
        }

        if dialect.line_comments.iter().any(|m| rest.starts_with(*m)) {
            i += rest.find('\n').unwrap_or(rest.len());
            continue;
        }

        if let Some((open, close)) = dialect.block_comment {
            if rest.starts_with(open) {
                match rest[open.len()..].find(close) {
                    Some(end) => {
                        let comment = &rest[..open.len() + end + close.len()];
                        line += count_newlines(comment);
                        i += comment.len();
                        continue;
                    }
                    None => return Some(Imbalance::new(line, "unterminated block comment")),
                }
            }
        }

        if dialect.quotes.contains(&ch) {
            let triple: String = std::iter::repeat(ch).take(3).collect();
            let delim = if dialect.triple_quotes && rest.starts_with(&triple) {
                triple.as_str()
            } else {
                &rest[..ch.len_utf8()]
            };

            match string_len(&rest[delim.len()..], delim) {
                Some(len) => {
                    let literal = &rest[..delim.len() + len];
                    line += count_newlines(literal);
                    i += literal.len();
                    continue;
                }
                None => {
                    return Some(Imbalance::new(
                        line,
                        format!("unterminated string starting with {delim}"),
                    ))
                }
            }
        }

        for (kind, (open, close)) in BRACKETS.iter().enumerate() {
            if ch == *open {
                tallies[kind].open(line);
            } else if ch == *close {
                tallies[kind].close(line);
            }
        }

        i += ch.len_utf8();
    }

    BRACKETS
        .iter()
        .zip(&tallies)
        .filter_map(|((open, close), tally)| tally.mismatch(*open, *close))
        .min_by_key(|(line, _)| *line)
        .map(|(line, message)| Imbalance::new(line, message))
}
