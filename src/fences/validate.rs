//! Code fence validation
//!
//! Checks each fenced block for an unknown language tag, empty content and
//! unbalanced brackets/quotes. Fence content is never executed or handed to
//! an external tool.

use crate::core::model::{Category, Finding};
use crate::fences::balance::{self, Dialect};
use crate::markdown::block::CodeFence;

/// Tags accepted without a warning (an absent tag is always accepted)
pub const KNOWN_TAGS: &[&str] = &[
    "php",
    "sql",
    "js",
    "javascript",
    "json",
    "bash",
    "ts",
    "typescript",
    "python",
    "text",
];

/// Knobs for fence validation, set from the command line
#[derive(Debug, Clone, Default)]
pub struct FenceRules {
    /// Suppress UNKNOWN_LANGUAGE_TAG warnings
    pub ignore_unknown_tags: bool,

    /// Extra tags to accept, lower-cased
    pub extra_tags: Vec<String>,
}

impl FenceRules {
    pub fn new(ignore_unknown_tags: bool, extra_tags: &[String]) -> Self {
        Self {
            ignore_unknown_tags,
            extra_tags: extra_tags
                .iter()
                .map(|tag| tag.trim().to_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect(),
        }
    }

    fn is_known(&self, tag: &str) -> bool {
        KNOWN_TAGS.contains(&tag) || self.extra_tags.iter().any(|extra| extra == tag)
    }
}

/// Validate one fence of the document at `path`
pub fn validate_fence(fence: &CodeFence, path: &str, rules: &FenceRules) -> Vec<Finding> {
    let mut findings = Vec::new();
    let tag = fence.language.as_deref().map(str::to_lowercase);

    if let Some(tag) = &tag {
        if !rules.ignore_unknown_tags && !rules.is_known(tag) {
            findings.push(Finding::warning(
                Category::UnknownLanguageTag,
                path,
                fence.start_line,
                format!("unknown code fence language tag '{tag}'"),
            ));
        }
    }

    if fence.content.trim().is_empty() {
        findings.push(Finding::warning(
            Category::EmptyCodeBlock,
            path,
            fence.start_line,
            "code fence has no content",
        ));
        return findings;
    }

    let dialect = tag
        .as_deref()
        .and_then(Dialect::for_tag)
        .unwrap_or(balance::PLAIN);
    if let Some(imbalance) = balance::check(&fence.content, &dialect) {
        findings.push(Finding::error(
            Category::UnbalancedFence,
            path,
            fence.start_line + 1 + imbalance.line,
            imbalance.message,
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Severity;

    fn fence(language: Option<&str>, content: &str) -> CodeFence {
        CodeFence {
            language: language.map(str::to_string),
            content: content.to_string(),
            start_line: 10,
            end_line: 10 + content.lines().count() as u32 + 1,
        }
    }

    #[test]
    fn test_well_formed_fence() {
        let f = fence(Some("php"), "<?php\nfunction add($a, $b) {\n    return $a + $b;\n}");
        assert!(validate_fence(&f, "a.md", &FenceRules::default()).is_empty());
    }

    #[test]
    fn test_unknown_tag_warns() {
        let f = fence(Some("ruby"), "puts 'hi'");
        let findings = validate_fence(&f, "a.md", &FenceRules::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::UnknownLanguageTag);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].line, 10);
    }

    #[test]
    fn test_tag_case_insensitive() {
        let f = fence(Some("PHP"), "echo 1;");
        assert!(validate_fence(&f, "a.md", &FenceRules::default()).is_empty());
    }

    #[test]
    fn test_ignore_unknown_tags() {
        let f = fence(Some("ruby"), "puts 'hi'");
        let rules = FenceRules::new(true, &[]);
        assert!(validate_fence(&f, "a.md", &rules).is_empty());
    }

    #[test]
    fn test_extra_tags() {
        let f = fence(Some("html"), "<p>hi</p>");
        let rules = FenceRules::new(false, &["HTML".to_string(), " ".to_string()]);
        assert_eq!(rules.extra_tags, vec!["html"]);
        assert!(validate_fence(&f, "a.md", &rules).is_empty());
    }

    #[test]
    fn test_empty_fence_warns_once() {
        let f = fence(Some("php"), "\n");
        let findings = validate_fence(&f, "a.md", &FenceRules::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::EmptyCodeBlock);
    }

    #[test]
    fn test_untagged_fence_is_balance_checked() {
        let f = fence(None, "function f() {\n  return 1;\n");
        let findings = validate_fence(&f, "a.md", &FenceRules::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::UnbalancedFence);
        assert_eq!(findings[0].line, 11);
    }

    #[test]
    fn test_text_fence_is_balance_checked() {
        let f = fence(Some("text"), "if (x {\n}");
        let findings = validate_fence(&f, "a.md", &FenceRules::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::UnbalancedFence);
    }

    #[test]
    fn test_unknown_tag_warns_and_is_balance_checked() {
        let f = fence(Some("ruby"), "def f(\n");
        let findings = validate_fence(&f, "a.md", &FenceRules::default());
        let categories: Vec<_> = findings.iter().map(|f| f.category).collect();
        assert_eq!(
            categories,
            vec![Category::UnknownLanguageTag, Category::UnbalancedFence]
        );
    }

    #[test]
    fn test_balanced_bash_fence() {
        let f = fence(Some("bash"), "for f in $(ls); do\n  echo \"${f}\"\ndone");
        assert!(validate_fence(&f, "a.md", &FenceRules::default()).is_empty());
    }

    #[test]
    fn test_unbalanced_reports_document_line() {
        let f = fence(Some("js"), "const a = 1;\nif (a {\n}");
        let findings = validate_fence(&f, "a.md", &FenceRules::default());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::UnbalancedFence);
        assert_eq!(findings[0].severity, Severity::Error);
        // fence opens on line 10; the unclosed '(' is on content line 1
        assert_eq!(findings[0].line, 12);
    }
}
