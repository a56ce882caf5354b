//! Block extraction
//!
//! Scans document text line by line and yields headings, code fences, links,
//! reference usages and tables in source order. Structural problems (an unterminated fence) are
//! yielded as findings in the same stream so one bad block never stops the
//! rest of the document from being read.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::VecDeque;

use crate::core::model::{Category, Finding};
use crate::markdown::block::{normalize_label, Block, CodeFence, Heading, Link, Reference, Table};
use crate::markdown::slug::{slugify, SlugRegistry};

/// ATX heading: `## Title`, optional closing `#`s
static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}(#{1,6})[ \t]+(.*?)(?:[ \t]+#+)?[ \t]*$").expect("Invalid HEADING_RE regex")
});

/// Inline link or image: `[text](target "title")`, `![alt](<target>)`
static INLINE_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"!?\[([^\[\]]*)\]\(\s*(?:<([^<>]*)>|([^\s()]+))(?:\s+(?:"[^"]*"|'[^']*'|\([^)]*\)))?\s*\)"#,
    )
    .expect("Invalid INLINE_LINK_RE regex")
});

/// Reference definition: `[label]: target`
static REF_DEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ {0,3}\[([^\]]+)\]:[ \t]*(?:<([^<>]*)>|(\S+))").expect("Invalid REF_DEF_RE regex")
});

/// Full or collapsed reference link: `[text][label]`, `![alt][]`
static REF_USE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!?\[([^\[\]]*)\]\[([^\[\]]*)\]").expect("Invalid REF_USE_RE regex")
});

/// Table separator row: `| --- | :-: |`
static TABLE_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*\|?[ \t]*:?-+:?[ \t]*(?:\|[ \t]*:?-+:?[ \t]*)*\|?[ \t]*$")
        .expect("Invalid TABLE_SEPARATOR_RE regex")
});

/// One item of the extraction stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Block(Block),
    Finding(Finding),
}

/// Lazy block iterator over one document.
///
/// Cloning restarts nothing: it forks the iterator at its current position.
/// Call [`extract`] again to start over.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    path: &'a str,
    lines: Vec<&'a str>,
    pos: usize,
    slugs: SlugRegistry,
    pending: VecDeque<Extracted>,
    /// Smallest opening run known to have no closing line before EOF
    unclosable: Option<usize>,
}

/// Start extracting blocks from `text`; findings are attributed to `path`
pub fn extract<'a>(path: &'a str, text: &'a str) -> Blocks<'a> {
    Blocks {
        path,
        lines: text.lines().collect(),
        pos: 0,
        slugs: SlugRegistry::new(),
        pending: VecDeque::new(),
        unclosable: None,
    }
}

impl Iterator for Blocks<'_> {
    type Item = Extracted;

    fn next(&mut self) -> Option<Extracted> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            if self.pos >= self.lines.len() {
                return None;
            }
            self.step();
        }
    }
}

impl<'a> Blocks<'a> {
    /// Consume at least one line and queue what it produced
    fn step(&mut self) {
        let index = self.pos;
        let line: &'a str = self.lines[index];
        let line_no = index as u32 + 1;

        if let Some(open) = fence_open(line) {
            match self.find_fence_close(index, open.ticks) {
                Some(close) => {
                    self.pending
                        .push_back(Extracted::Block(Block::CodeFence(CodeFence {
                            language: open.language.map(str::to_string),
                            content: self.lines[index + 1..close].join("\n"),
                            start_line: line_no,
                            end_line: close as u32 + 1,
                        })));
                    self.pos = close + 1;
                }
                None => {
                    // The opening line is dropped and scanning resumes right after it
                    self.pending.push_back(Extracted::Finding(Finding::error(
                        Category::UnbalancedFence,
                        self.path,
                        line_no,
                        format!(
                            "code fence opened with {} backticks is never closed",
                            open.ticks
                        ),
                    )));
                    self.pos = index + 1;
                }
            }
            return;
        }

        if let Some(heading) = self.heading(line, line_no) {
            self.pending.push_back(Extracted::Block(Block::Heading(heading)));
            self.queue_links(line, line_no);
            self.pos = index + 1;
            return;
        }

        if self
            .lines
            .get(index + 1)
            .is_some_and(|next| starts_table(line, next))
        {
            self.take_table(index);
            return;
        }

        self.queue_links(line, line_no);
        self.pos = index + 1;
    }

    fn find_fence_close(&mut self, index: usize, ticks: usize) -> Option<usize> {
        if self.unclosable.is_some_and(|min| ticks >= min) {
            return None;
        }

        let close = self.lines[index + 1..]
            .iter()
            .position(|line| is_fence_close(line, ticks))
            .map(|offset| index + 1 + offset);

        if close.is_none() {
            self.unclosable = Some(self.unclosable.map_or(ticks, |min| min.min(ticks)));
        }
        close
    }

    fn heading(&mut self, line: &str, line_no: u32) -> Option<Heading> {
        let caps = HEADING_RE.captures(line)?;
        let level = caps.get(1)?.as_str().len() as u8;
        let text = caps.get(2)?.as_str().trim();
        if text.is_empty() {
            return None;
        }

        Some(Heading {
            level,
            text: text.to_string(),
            slug: self.slugs.assign(&slugify(text)),
            line: line_no,
        })
    }

    fn take_table(&mut self, index: usize) {
        let mut rows = vec![split_cells(self.lines[index])];
        let mut cursor = index + 2;
        while let Some(row) = self.lines.get(cursor) {
            if row.trim().is_empty() || !row.contains('|') {
                break;
            }
            rows.push(split_cells(row));
            cursor += 1;
        }

        self.pending.push_back(Extracted::Block(Block::Table(Table {
            rows,
            start_line: index as u32 + 1,
        })));

        let header: &'a str = self.lines[index];
        self.queue_links(header, index as u32 + 1);
        for row_index in index + 2..cursor {
            let row: &'a str = self.lines[row_index];
            self.queue_links(row, row_index as u32 + 1);
        }
        self.pos = cursor;
    }

    fn queue_links(&mut self, line: &str, line_no: u32) {
        self.pending.extend(
            links_in_line(line, line_no)
                .into_iter()
                .map(Extracted::Block),
        );
    }
}

struct FenceOpen<'a> {
    ticks: usize,
    language: Option<&'a str>,
}

/// Allow up to three spaces of indentation, like CommonMark
fn strip_indent(line: &str) -> Option<&str> {
    let indent = line.bytes().take_while(|b| *b == b' ').count();
    (indent <= 3).then(|| &line[indent..])
}

fn backtick_run(s: &str) -> usize {
    s.bytes().take_while(|b| *b == b'`').count()
}

fn fence_open(line: &str) -> Option<FenceOpen<'_>> {
    let rest = strip_indent(line)?;
    let ticks = backtick_run(rest);
    if ticks < 3 {
        return None;
    }

    let info = rest[ticks..].trim();
    if info.contains('`') {
        return None;
    }

    Some(FenceOpen {
        ticks,
        language: info.split_whitespace().next(),
    })
}

fn is_fence_close(line: &str, ticks: usize) -> bool {
    let Some(rest) = strip_indent(line) else {
        return false;
    };
    let rest = rest.trim_end();
    let run = backtick_run(rest);
    run >= ticks && run == rest.len()
}

fn starts_table(header: &str, separator: &str) -> bool {
    header.contains('|')
        && separator.contains('|')
        && separator.contains('-')
        && TABLE_SEPARATOR_RE.is_match(separator)
}

/// Split a table row on unescaped pipes; `\|` becomes a literal pipe
fn split_cells(line: &str) -> Vec<String> {
    let row = line.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = match row.strip_suffix('|') {
        Some(stripped) if !stripped.ends_with('\\') => stripped,
        _ => row,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = row.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(ch),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

/// Replace inline code spans with spaces, keeping byte offsets intact
fn mask_code_spans(line: &str) -> String {
    let bytes = line.as_bytes();
    let mut masked = bytes.to_vec();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }

        let run = backtick_run(&line[i..]);
        let mut j = i + run;
        let mut close = None;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let other = backtick_run(&line[j..]);
                if other == run {
                    close = Some(j);
                    break;
                }
                j += other;
            } else {
                j += 1;
            }
        }

        match close {
            Some(close) => {
                masked[i..close + run].fill(b' ');
                i = close + run;
            }
            None => i += run,
        }
    }

    // Only whole characters between ASCII backticks were replaced
    String::from_utf8_lossy(&masked).into_owned()
}

/// Links and reference usages on one line, in source order
fn links_in_line(line: &str, line_no: u32) -> Vec<Block> {
    if !line.contains('[') {
        return Vec::new();
    }
    let masked = mask_code_spans(line);

    if let Some(caps) = REF_DEF_RE.captures(&masked) {
        let label = caps.get(1).map(|m| &line[m.range()]).unwrap_or_default();
        if !label.starts_with('^') {
            if let Some(target) = caps.get(2).or_else(|| caps.get(3)) {
                return vec![Block::Link(Link {
                    text: label.trim().to_string(),
                    target: line[target.range()].trim().to_string(),
                    line: line_no,
                    label: Some(normalize_label(label)),
                })];
            }
        }
    }

    let inline = INLINE_LINK_RE.captures_iter(&masked).filter_map(|caps| {
        let whole = caps.get(0)?;
        let text = caps.get(1)?;
        let target = caps.get(2).or_else(|| caps.get(3))?;
        let target = line[target.range()].trim();
        (!target.is_empty()).then(|| {
            let link = Link {
                text: line[text.range()].trim().to_string(),
                target: target.to_string(),
                line: line_no,
                label: None,
            };
            (whole.start(), Block::Link(link))
        })
    });

    let references = REF_USE_RE.captures_iter(&masked).filter_map(|caps| {
        let whole = caps.get(0)?;
        // `matrix[i][j]` is an index expression, not a link
        if masked[..whole.start()]
            .chars()
            .next_back()
            .is_some_and(|ch| ch.is_alphanumeric() || ch == '_')
        {
            return None;
        }
        let text = line[caps.get(1)?.range()].trim();
        let label = line[caps.get(2)?.range()].trim();
        let label = if label.is_empty() { text } else { label };
        if label.is_empty() || label.starts_with('^') {
            return None;
        }
        let reference = Reference {
            text: text.to_string(),
            label: normalize_label(label),
            line: line_no,
        };
        Some((whole.start(), Block::Reference(reference)))
    });

    let mut found: Vec<(usize, Block)> = inline.chain(references).collect();
    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, block)| block).collect()
}
