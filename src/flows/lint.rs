//! Lint flow
//!
//! Two passes over a loaded workspace:
//! 1. per document: extraction findings, fence validation, table shape
//!    (when enabled)
//! 2. after the anchor index is complete: cross-reference resolution
//!
//! The two passes never interleave, so pass 2 always sees every heading.

use anyhow::Result;
use std::path::Path;
use std::process::ExitCode;

use crate::anchors::index::AnchorIndex;
use crate::anchors::resolve::Resolver;
use crate::backends::scan::ScanOptions;
use crate::backends::workspace::{load_workspace, Workspace};
use crate::core::model::{Finding, Report};
use crate::core::render::{RenderConfig, Renderer};
use crate::fences::validate::{validate_fence, FenceRules};
use crate::markdown::document::Document;
use crate::markdown::table::check_table;

/// Severity threshold that makes a run fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailOn {
    #[default]
    Error,
    Warning,
    Never,
}

impl std::str::FromStr for FailOn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" | "errors" => Ok(FailOn::Error),
            "warning" | "warnings" => Ok(FailOn::Warning),
            "never" | "none" => Ok(FailOn::Never),
            _ => Err(format!("Unknown threshold: {}", s)),
        }
    }
}

impl FailOn {
    /// Whether `report` has a finding at or above the threshold
    pub fn fails(&self, report: &Report) -> bool {
        match self {
            FailOn::Error => report.has_errors(),
            FailOn::Warning => !report.is_empty(),
            FailOn::Never => false,
        }
    }

    pub fn exit_code(&self, report: &Report) -> ExitCode {
        if self.fails(report) {
            ExitCode::from(1)
        } else {
            ExitCode::SUCCESS
        }
    }
}

/// Options for a lint run
#[derive(Debug, Clone, Default)]
pub struct LintOptions {
    pub scan: ScanOptions,
    pub fences: FenceRules,
    pub fail_on: FailOn,

    /// Emit INCONSISTENT_TABLE warnings
    pub check_tables: bool,
}

/// Findings that need only the document itself
pub fn document_findings(document: &Document, options: &LintOptions) -> Vec<Finding> {
    let mut findings = document.findings().to_vec();
    for fence in document.code_fences() {
        findings.extend(validate_fence(fence, document.path(), &options.fences));
    }
    if options.check_tables {
        for table in document.tables() {
            findings.extend(check_table(table, document.path()));
        }
    }
    findings
}

#[cfg(feature = "parallel")]
fn per_document(documents: &[Document], options: &LintOptions) -> Vec<Finding> {
    use rayon::prelude::*;
    documents
        .par_iter()
        .map(|document| document_findings(document, options))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn per_document(documents: &[Document], options: &LintOptions) -> Vec<Finding> {
    documents
        .iter()
        .flat_map(|document| document_findings(document, options))
        .collect()
}

/// Lint an already loaded workspace
pub fn lint_workspace(workspace: &Workspace, options: &LintOptions) -> Report {
    let mut findings = per_document(&workspace.documents, options);

    let index = AnchorIndex::build(&workspace.documents);
    log::debug!(
        "anchor index: {} anchors in {} documents",
        index.len(),
        index.document_count()
    );

    let resolver = Resolver::new(&index, &workspace.inventory);
    for document in &workspace.documents {
        findings.extend(resolver.resolve_document(document));
    }

    Report::from_findings(findings).with_documents(workspace.documents.len())
}

/// Scan, read and lint everything under `root`
pub fn lint_root(root: &Path, options: &LintOptions) -> Result<Report> {
    let workspace = load_workspace(root, options.scan)?;
    log::info!(
        "linting {} documents under {}",
        workspace.documents.len(),
        root.display()
    );
    Ok(lint_workspace(&workspace, options))
}

/// Run lint command
pub fn run_lint(root: &Path, options: &LintOptions, config: RenderConfig) -> Result<ExitCode> {
    let report = lint_root(root, options)?;

    let summary = report.summary();
    log::info!(
        "{} findings ({} errors, {} warnings)",
        report.len(),
        summary.error_count,
        summary.warning_count
    );

    let renderer = Renderer::with_config(config);
    println!("{}", renderer.render(&report));

    Ok(options.fail_on.exit_code(&report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LintError;
    use crate::core::model::{Category, Severity};
    use crate::core::render::OutputFormat;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }

    fn lint(root: &Path) -> Report {
        lint_root(root, &LintOptions::default()).unwrap()
    }

    #[test]
    fn test_fail_on_parse() {
        assert_eq!("error".parse::<FailOn>().unwrap(), FailOn::Error);
        assert_eq!("Warning".parse::<FailOn>().unwrap(), FailOn::Warning);
        assert_eq!("never".parse::<FailOn>().unwrap(), FailOn::Never);
        assert!("sometimes".parse::<FailOn>().is_err());
    }

    #[test]
    fn test_fail_on_thresholds() {
        let warnings_only = Report::from_findings(vec![Finding::warning(
            Category::EmptyCodeBlock,
            "a.md",
            1,
            "empty",
        )]);
        assert!(!FailOn::Error.fails(&warnings_only));
        assert!(FailOn::Warning.fails(&warnings_only));
        assert!(!FailOn::Never.fails(&warnings_only));

        let with_error = Report::from_findings(vec![Finding::error(
            Category::UnresolvedLink,
            "a.md",
            1,
            "broken",
        )]);
        assert!(FailOn::Error.fails(&with_error));
        assert!(FailOn::Warning.fails(&with_error));
        assert!(!FailOn::Never.fails(&with_error));
    }

    #[test]
    fn test_prose_only_document() {
        let temp = tempdir().unwrap();
        write(temp.path(), "notes.md", "Just some prose.\n\nAnother paragraph.\n");

        let report = lint(temp.path());
        assert!(report.is_empty());
        assert_eq!(report.documents(), 1);
        assert!(!FailOn::default().fails(&report));
    }

    #[test]
    fn test_single_empty_fence_is_a_warning() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.md", "# A\n");
        write(temp.path(), "b.md", "# B\n\n```php\n\n```\n");
        write(temp.path(), "c.md", "# C\n");

        let report = lint(temp.path());
        assert_eq!(report.len(), 1);
        let finding = &report.findings()[0];
        assert_eq!(finding.category, Category::EmptyCodeBlock);
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.path, "b.md");
        assert!(!FailOn::default().fails(&report));
    }

    #[test]
    fn test_cross_document_links() {
        let temp = tempdir().unwrap();
        write(
            temp.path(),
            "a.md",
            "[good](b.md#section-one)\n[bad](b.md#missing)\n",
        );
        write(temp.path(), "b.md", "# B\n\n## Section One\n");

        let report = lint(temp.path());
        assert_eq!(report.len(), 1);
        let finding = &report.findings()[0];
        assert_eq!(finding.category, Category::UnresolvedLink);
        assert_eq!(finding.line, 2);
        assert!(finding.message.contains("b.md#missing"));
    }

    #[test]
    fn test_link_to_heading_in_later_document() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.md", "[fwd](z/last.md#end)\n");
        write(temp.path(), "z/last.md", "## End\n");

        assert!(lint(temp.path()).is_empty());
    }

    #[test]
    fn test_unterminated_fence() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.md", "# A\n\n```sql\nSELECT 1;\n");

        let report = lint(temp.path());
        let fences: Vec<_> = report
            .findings()
            .iter()
            .filter(|f| f.category == Category::UnbalancedFence)
            .collect();
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].line, 3);
        assert!(report.has_errors());
    }

    #[test]
    fn test_all_categories_in_one_run() {
        let temp = tempdir().unwrap();
        write(
            temp.path(),
            "guide.md",
            "# Guide\n\n```cobol\nDISPLAY 'HI'.\n```\n\n```js\n\n```\n\n```php\nfoo(1;\n```\n\n| a | b |\n|---|---|\n| 1 |\n\n[x](#nowhere)\n",
        );

        let options = LintOptions {
            check_tables: true,
            ..Default::default()
        };
        let report = lint_root(temp.path(), &options).unwrap();
        let categories: Vec<_> = report.findings().iter().map(|f| f.category).collect();
        assert!(categories.contains(&Category::UnknownLanguageTag));
        assert!(categories.contains(&Category::EmptyCodeBlock));
        assert!(categories.contains(&Category::UnbalancedFence));
        assert!(categories.contains(&Category::InconsistentTable));
        assert!(categories.contains(&Category::UnresolvedLink));
        assert_eq!(report.summary().error_count, 2);
        assert_eq!(report.summary().warning_count, 3);
    }

    #[test]
    fn test_tables_checked_only_on_request() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.md", "| a | b |\n|---|---|\n| 1 |\n");

        assert!(lint(temp.path()).is_empty());

        let options = LintOptions {
            check_tables: true,
            ..Default::default()
        };
        let report = lint_root(temp.path(), &options).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.findings()[0].category, Category::InconsistentTable);
        assert_eq!(report.findings()[0].line, 3);
    }

    #[test]
    fn test_untagged_fence_is_balance_checked() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.md", "# A\n\n```\nfunction f() {\n  return 1;\n```\n");

        let report = lint(temp.path());
        assert_eq!(report.len(), 1);
        assert_eq!(report.findings()[0].category, Category::UnbalancedFence);
        assert_eq!(report.findings()[0].line, 4);
    }

    #[test]
    fn test_link_to_hidden_document_resolves() {
        let temp = tempdir().unwrap();
        write(temp.path(), "README.md", "[contributing](.github/CONTRIBUTING.md)\n");
        write(temp.path(), ".github/CONTRIBUTING.md", "# Contributing\n");

        assert!(lint(temp.path()).is_empty());

        let options = LintOptions {
            scan: ScanOptions {
                skip_hidden: true,
                respect_ignore: true,
            },
            ..Default::default()
        };
        let report = lint_root(temp.path(), &options).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.documents(), 1);
    }

    #[test]
    fn test_ignore_unknown_tags() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.md", "```cobol\nDISPLAY 'HI'.\n```\n");

        let options = LintOptions {
            fences: FenceRules::new(true, &[]),
            ..Default::default()
        };
        assert!(lint_root(temp.path(), &options).unwrap().is_empty());

        let options = LintOptions {
            fences: FenceRules::new(false, &["COBOL".to_string()]),
            ..Default::default()
        };
        assert!(lint_root(temp.path(), &options).unwrap().is_empty());
    }

    #[test]
    fn test_json_report_is_idempotent() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a.md", "[x](b.md#nope)\n```php\n```\n");
        write(temp.path(), "b.md", "# B\n[y](a.md#gone)\n");

        let renderer = Renderer::with_config(RenderConfig::new(OutputFormat::Json));
        let first = renderer.render(&lint(temp.path()));
        let second = renderer.render(&lint(temp.path()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_documents_is_fatal() {
        let temp = tempdir().unwrap();
        write(temp.path(), "README.txt", "not markdown");

        let err = lint_root(temp.path(), &LintOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LintError>(),
            Some(LintError::NoDocuments(_))
        ));
    }
}
