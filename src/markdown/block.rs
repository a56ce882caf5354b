//! Structural blocks extracted from a Markdown document

use serde::{Deserialize, Serialize};

/// An ATX heading (`## Title`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// Anchor slug, already disambiguated within the document
    pub slug: String,
    pub line: u32,
}

/// A fenced code block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFence {
    /// First token of the info string, if any
    pub language: Option<String>,
    pub content: String,
    /// Line of the opening backticks
    pub start_line: u32,
    /// Line of the closing backticks
    pub end_line: u32,
}

/// An inline link, image or reference definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub target: String,
    pub line: u32,
    /// Normalized label when this is a `[label]: target` definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A full or collapsed reference link: `[text][label]`, `[text][]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub text: String,
    /// Normalized label; for `[text][]` this is the text
    pub label: String,
    pub line: u32,
}

/// Reference labels match case-insensitively with whitespace runs collapsed
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A pipe table. `rows[0]` is the header; the separator row is not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
    pub start_line: u32,
}

impl Table {
    /// Document line of `rows[index]`, skipping the separator row
    pub fn row_line(&self, index: usize) -> u32 {
        if index == 0 {
            self.start_line
        } else {
            self.start_line + 1 + index as u32
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading(Heading),
    CodeFence(CodeFence),
    Link(Link),
    Reference(Reference),
    Table(Table),
}

impl Block {
    /// First line the block occupies
    pub fn line(&self) -> u32 {
        match self {
            Block::Heading(h) => h.line,
            Block::CodeFence(f) => f.start_line,
            Block::Link(l) => l.line,
            Block::Reference(r) => r.line,
            Block::Table(t) => t.start_line,
        }
    }
}
