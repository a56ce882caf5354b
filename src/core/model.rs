//! Unified Finding Model
//!
//! Every check (extraction, fence validation, link resolution) reports its
//! problems as `Finding`s. Findings are merged into a single `Report` before
//! rendering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Severity of a finding. `Error` sorts before `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// What kind of problem a finding describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// A relative link or anchor that points nowhere
    UnresolvedLink,
    /// An unterminated fence, or unbalanced brackets/quotes inside one
    UnbalancedFence,
    /// A fence language tag outside the recognized set
    UnknownLanguageTag,
    /// A fence with whitespace-only content
    EmptyCodeBlock,
    /// A table row whose cell count differs from its header
    InconsistentTable,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::UnresolvedLink => "UNRESOLVED_LINK",
            Category::UnbalancedFence => "UNBALANCED_FENCE",
            Category::UnknownLanguageTag => "UNKNOWN_LANGUAGE_TAG",
            Category::EmptyCodeBlock => "EMPTY_CODE_BLOCK",
            Category::InconsistentTable => "INCONSISTENT_TABLE",
        }
    }
}

/// One reported issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub category: Category,

    /// Document path relative to root, using '/' as separator
    pub path: String,

    /// 1-indexed line in the document
    pub line: u32,

    pub message: String,
}

impl Finding {
    pub fn error(
        category: Category,
        path: impl Into<String>,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            category,
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    pub fn warning(
        category: Category,
        path: impl Into<String>,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Total order used for every rendering: path, severity, line, category, message
    fn report_order(&self, other: &Self) -> Ordering {
        self.path
            .cmp(&other.path)
            .then(self.severity.cmp(&other.severity))
            .then(self.line.cmp(&other.line))
            .then(self.category.cmp(&other.category))
            .then_with(|| self.message.cmp(&other.message))
    }
}

/// Per-severity counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub error_count: usize,
    pub warning_count: usize,
}

/// All findings of one run, in report order
#[derive(Debug, Clone, Default)]
pub struct Report {
    findings: Vec<Finding>,
    documents: usize,
}

impl Report {
    /// Build a report from findings in any order
    pub fn from_findings(findings: impl IntoIterator<Item = Finding>) -> Self {
        let mut report: Report = findings.into_iter().collect();
        report.sort();
        report
    }

    /// Record how many documents were checked (shown in the text summary)
    pub fn with_documents(mut self, documents: usize) -> Self {
        self.documents = documents;
        self
    }

    /// Sort findings for stable output
    pub fn sort(&mut self) {
        self.findings.sort_by(Finding::report_order);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn summary(&self) -> Summary {
        Summary {
            error_count: self.errors().count(),
            warning_count: self.warnings().count(),
        }
    }

    /// True when at least one finding is an error; warnings never count
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

impl FromIterator<Finding> for Report {
    fn from_iter<T: IntoIterator<Item = Finding>>(iter: T) -> Self {
        Self {
            findings: iter.into_iter().collect(),
            documents: 0,
        }
    }
}

impl IntoIterator for Report {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.into_iter()
    }
}
