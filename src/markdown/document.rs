//! A parsed Markdown document

use crate::core::model::Finding;
use crate::markdown::block::{Block, CodeFence, Heading, Link, Reference, Table};
use crate::markdown::extract::{extract, Blocks, Extracted};

/// One source file: its text plus everything extracted from it.
///
/// Immutable once parsed.
#[derive(Debug, Clone)]
pub struct Document {
    path: String,
    text: String,
    blocks: Vec<Block>,
    findings: Vec<Finding>,
}

impl Document {
    /// Parse `text`; `path` is root-relative with '/' separators
    pub fn parse(path: impl Into<String>, text: impl Into<String>) -> Self {
        let mut document = Self {
            path: path.into(),
            text: text.into(),
            blocks: Vec::new(),
            findings: Vec::new(),
        };

        let mut blocks = Vec::new();
        let mut findings = Vec::new();
        for item in document.extract() {
            match item {
                Extracted::Block(block) => blocks.push(block),
                Extracted::Finding(finding) => findings.push(finding),
            }
        }

        document.blocks = blocks;
        document.findings = findings;
        document
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Findings produced while extracting blocks
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// A fresh lazy pass over the text, identical to `blocks()` + `findings()`
    pub fn extract(&self) -> Blocks<'_> {
        extract(&self.path, &self.text)
    }

    /// Copy keeping only blocks and findings that start in `start..=end`
    pub fn restricted(&self, start: u32, end: u32) -> Document {
        let in_range = |line: u32| line >= start && line <= end;
        Document {
            path: self.path.clone(),
            text: self.text.clone(),
            blocks: self
                .blocks
                .iter()
                .filter(|block| in_range(block.line()))
                .cloned()
                .collect(),
            findings: self
                .findings
                .iter()
                .filter(|finding| in_range(finding.line))
                .cloned()
                .collect(),
        }
    }

    pub fn headings(&self) -> impl Iterator<Item = &Heading> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Heading(heading) => Some(heading),
            _ => None,
        })
    }

    pub fn code_fences(&self) -> impl Iterator<Item = &CodeFence> {
        self.blocks.iter().filter_map(|block| match block {
            Block::CodeFence(fence) => Some(fence),
            _ => None,
        })
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Link(link) => Some(link),
            _ => None,
        })
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Reference(reference) => Some(reference),
            _ => None,
        })
    }

    /// Whether a `[label]: target` definition with this normalized label exists
    pub fn defines(&self, label: &str) -> bool {
        self.links().any(|link| link.label.as_deref() == Some(label))
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }
}
