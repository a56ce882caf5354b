//! Renderer module
//!
//! Renders a Report (and the anchor/block listings) as text or JSON

use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::anchors::index::AnchorIndex;
use crate::core::model::{Finding, Report, Severity, Summary};
use crate::markdown::block::Block;
use crate::markdown::document::Document;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
    pub color: bool,
}

impl RenderConfig {
    /// Plain config: no indentation, no colour
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: false,
            color: false,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// JSON shape of a report
#[derive(Serialize)]
struct JsonReport<'a> {
    errors: Vec<&'a Finding>,
    warnings: Vec<&'a Finding>,
    summary: Summary,
}

/// JSON shape of a block dump
#[derive(Serialize)]
struct JsonBlocks<'a> {
    path: &'a str,
    blocks: &'a [Block],
    findings: &'a [Finding],
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Renderer for reports and listings
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a report to a string
    pub fn render(&self, report: &Report) -> String {
        match self.config.format {
            OutputFormat::Text => self.render_text(report),
            OutputFormat::Json => self.render_json(report),
        }
    }

    /// Render the anchor index
    pub fn render_anchors(&self, index: &AnchorIndex) -> String {
        match self.config.format {
            OutputFormat::Json => {
                let entries: Vec<_> = index.entries().collect();
                self.to_json(&entries, "[]")
            }
            OutputFormat::Text => {
                let mut output = String::new();
                let mut current: Option<&str> = None;
                for entry in index.entries() {
                    if current != Some(entry.path.as_str()) {
                        if current.is_some() {
                            output.push('\n');
                        }
                        output.push_str(&self.path_heading(&entry.path));
                        output.push('\n');
                        current = Some(entry.path.as_str());
                    }
                    output.push_str(&format!(
                        "  {:>5}  {:<6}  #{}  {}\n",
                        entry.line,
                        "#".repeat(entry.level as usize),
                        entry.slug,
                        entry.text
                    ));
                }
                output.push_str(&format!(
                    "\n{} in {}",
                    plural(index.len(), "anchor"),
                    plural(index.document_count(), "document")
                ));
                output
            }
        }
    }

    /// Render the blocks and extraction findings of one document
    pub fn render_blocks(&self, document: &Document) -> String {
        match self.config.format {
            OutputFormat::Json => self.to_json(
                &JsonBlocks {
                    path: document.path(),
                    blocks: document.blocks(),
                    findings: document.findings(),
                },
                "{}",
            ),
            OutputFormat::Text => {
                let mut output = self.path_heading(document.path());
                output.push('\n');
                for block in document.blocks() {
                    output.push_str(&format!("  {:>5}  {}\n", block.line(), describe_block(block)));
                }
                for finding in document.findings() {
                    output.push_str(&self.finding_line(finding));
                }
                output.push_str(&format!(
                    "\n{} in {}",
                    plural(document.blocks().len(), "block"),
                    plural(document.text().lines().count(), "line")
                ));
                output
            }
        }
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T, fallback: &str) -> String {
        let rendered = if self.config.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.unwrap_or_else(|_| fallback.to_string())
    }

    /// Render as a single JSON object
    fn render_json(&self, report: &Report) -> String {
        let json = JsonReport {
            errors: report.errors().collect(),
            warnings: report.warnings().collect(),
            summary: report.summary(),
        };
        self.to_json(&json, "{}")
    }

    /// Render grouped by document: errors first, then warnings, by line
    fn render_text(&self, report: &Report) -> String {
        let mut by_path: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
        for finding in report.findings() {
            by_path.entry(finding.path.as_str()).or_default().push(finding);
        }

        let mut output = String::new();
        for (path, findings) in by_path {
            output.push_str(&self.path_heading(path));
            output.push('\n');
            // Report order is already severity-then-line within a path
            for finding in findings {
                output.push_str(&self.finding_line(finding));
            }
            output.push('\n');
        }

        let summary = report.summary();
        if report.is_empty() {
            output.push_str(&format!(
                "No issues found in {}",
                plural(report.documents(), "document")
            ));
        } else {
            output.push_str(&format!(
                "{}, {} in {}",
                plural(summary.error_count, "error"),
                plural(summary.warning_count, "warning"),
                plural(report.documents(), "document")
            ));
        }
        output
    }

    fn finding_line(&self, finding: &Finding) -> String {
        format!(
            "  {}  {:>5}  {:<20}  {}\n",
            self.severity_label(finding.severity),
            finding.line,
            finding.category.as_str(),
            finding.message
        )
    }

    fn severity_label(&self, severity: Severity) -> String {
        let label = format!("{:<7}", severity.as_str());
        if !self.config.color {
            return label;
        }
        match severity {
            Severity::Error => label.red().bold().to_string(),
            Severity::Warning => label.yellow().to_string(),
        }
    }

    fn path_heading(&self, path: &str) -> String {
        if self.config.color {
            path.bold().underline().to_string()
        } else {
            path.to_string()
        }
    }
}

fn describe_block(block: &Block) -> String {
    match block {
        Block::Heading(h) => format!("heading  h{} #{}  {}", h.level, h.slug, h.text),
        Block::CodeFence(f) => format!(
            "fence    {} (lines {}-{})",
            f.language.as_deref().unwrap_or("-"),
            f.start_line,
            f.end_line
        ),
        Block::Link(l) => match &l.label {
            Some(label) => format!("refdef   [{label}]: {}", l.target),
            None => format!("link     [{}] -> {}", l.text, l.target),
        },
        Block::Reference(r) => format!("ref      [{}][{}]", r.text, r.label),
        Block::Table(t) => format!(
            "table    {} rows x {} columns",
            t.rows.len(),
            t.rows.first().map(Vec::len).unwrap_or(0)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Category;
    use serde_json::Value;

    fn sample_report() -> Report {
        Report::from_findings(vec![
            Finding::warning(Category::EmptyCodeBlock, "b.md", 3, "code fence has no content"),
            Finding::error(Category::UnresolvedLink, "b.md", 9, "link broken"),
            Finding::error(Category::UnbalancedFence, "a.md", 1, "fence never closed"),
        ])
        .with_documents(3)
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        let err = "yaml".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
    }

    #[test]
    fn test_render_config_builders() {
        let config = RenderConfig::new(OutputFormat::Json)
            .with_pretty(true)
            .with_color(true);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.pretty);
        assert!(config.color);
        assert_eq!(RenderConfig::default().format, OutputFormat::Text);
    }

    fn text_renderer() -> Renderer {
        Renderer::with_config(RenderConfig::new(OutputFormat::Text))
    }

    fn json_renderer() -> Renderer {
        Renderer::with_config(RenderConfig::new(OutputFormat::Json))
    }

    #[test]
    fn test_render_json_shape() {
        let output = json_renderer().render(&sample_report());
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["summary"]["error_count"], 2);
        assert_eq!(value["summary"]["warning_count"], 1);
        assert_eq!(value["errors"].as_array().unwrap().len(), 2);
        assert_eq!(value["errors"][0]["path"], "a.md");
        assert_eq!(value["errors"][1]["category"], "UNRESOLVED_LINK");
        assert_eq!(value["warnings"][0]["line"], 3);
    }

    #[test]
    fn test_render_json_pretty() {
        let renderer =
            Renderer::with_config(RenderConfig::new(OutputFormat::Json).with_pretty(true));
        let output = renderer.render(&sample_report());
        assert!(output.contains("\n  \"errors\""));
    }

    #[test]
    fn test_render_text_groups_errors_first() {
        let output = text_renderer().render(&sample_report());
        let a = output.find("a.md").unwrap();
        let b = output.find("b.md").unwrap();
        assert!(a < b);

        let b_section = &output[b..];
        let error = b_section.find("UNRESOLVED_LINK").unwrap();
        let warning = b_section.find("EMPTY_CODE_BLOCK").unwrap();
        assert!(error < warning);

        assert!(output.ends_with("2 errors, 1 warning in 3 documents"));
        assert!(!output.contains('\u{1b}'));
    }

    #[test]
    fn test_render_text_empty() {
        let output = text_renderer().render(&Report::default().with_documents(1));
        assert_eq!(output, "No issues found in 1 document");
    }

    #[test]
    fn test_render_anchors() {
        let docs = vec![Document::parse("a.md", "# Title\n## Usage\n")];
        let index = AnchorIndex::build(&docs);

        let text = text_renderer().render_anchors(&index);
        assert!(text.contains("#usage"));
        assert!(text.ends_with("2 anchors in 1 document"));

        let json = json_renderer().render_anchors(&index);
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[1]["slug"], "usage");
        assert_eq!(value[1]["level"], 2);
    }

    #[test]
    fn test_render_blocks() {
        let doc = Document::parse("a.md", "# T\n```php\necho 1;\n```\n[x](y.md)\n```js\n");

        let text = text_renderer().render_blocks(&doc);
        assert!(text.contains("heading  h1 #t"));
        assert!(text.contains("fence    php (lines 2-4)"));
        assert!(text.contains("UNBALANCED_FENCE"));
        assert!(text.ends_with("3 blocks in 6 lines"));

        let refs = Document::parse("b.md", "[a][Docs]\n[docs]: https://x.y\n");
        let text = text_renderer().render_blocks(&refs);
        assert!(text.contains("ref      [a][docs]"));
        assert!(text.contains("refdef   [docs]: https://x.y"));

        let json = json_renderer().render_blocks(&doc);
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["blocks"][0]["kind"], "heading");
        assert_eq!(value["findings"][0]["line"], 6);
    }
}
