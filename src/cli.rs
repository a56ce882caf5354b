//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::backends::scan::ScanOptions;
use crate::core::render::{OutputFormat, RenderConfig};
use crate::fences::validate::FenceRules;
use crate::flows::lint::{FailOn, LintOptions};

/// doclint - check a tree of Markdown documentation for broken structure.
#[derive(Parser, Debug)]
#[command(name = "doclint")]
#[command(
    author,
    version,
    about,
    long_about = r#"doclint checks Markdown documentation for structural problems.

It reports:
- unterminated code fences and unbalanced brackets/quotes inside fences
- unknown code fence language tags and empty code fences
- links to documents, files or heading anchors that do not exist
- table rows whose cell count differs from the header (with --check-tables)

Nothing is executed and no network access happens: external URLs are skipped.

Output formats:
- text: grouped by document, errors first (default)
- json: a single object with errors, warnings and a summary

Exit codes:
- 0: nothing at or above the --fail-on threshold
- 1: findings at or above the threshold
- 2: fatal input error (missing root, unreadable file, no Markdown files)

Examples:
    doclint lint docs
    doclint lint docs --format json --fail-on warning
    doclint anchors docs
    doclint blocks docs/guides/php.md --lines 1:40
"#
)]
pub struct Cli {
    /// Output format (text/json).
    #[arg(
        long,
        global = true,
        default_value = "text",
        value_name = "FORMAT",
        value_parser = ["text", "json"],
        long_help = "Select the output format.\n\n\
Supported values:\n\
- text (default)\n\
- json\n\n\
Tip: json output is byte-stable across runs on unchanged input."
    )]
    pub format: String,

    /// Pretty-print JSON output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON output with indentation for human readability.\n\n\
Has no effect on text output."
    )]
    pub pretty: bool,

    /// Disable colored output.
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output. Color is only used when stdout is a terminal;\n\
this flag turns it off there too. NO_COLOR is honoured as well."
    )]
    pub no_color: bool,

    /// Quiet mode (errors only on stderr).
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        long_help = "Only log errors to stderr. The report itself is still printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable debug logging on stderr. RUST_LOG, when set, takes precedence."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lint every Markdown file under ROOT.
    #[command(
        long_about = "Recursively lint every *.md file under ROOT (extension compared\n\
case-insensitively). All files are read and parsed before links are resolved,\n\
so a link may point at a heading in any document of the run.\n\n\
Examples:\n\
  doclint lint docs\n\
  doclint lint . --fail-on warning\n\
  doclint lint docs --allow-tag yaml,toml --respect-ignore\n\
  doclint lint docs --check-tables\n"
    )]
    Lint {
        /// Documentation root directory.
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// Lowest severity that makes the run fail (exit code 1).
        #[arg(
            long,
            default_value = "error",
            value_name = "SEVERITY",
            value_parser = ["error", "warning", "never"],
            long_help = "Lowest severity that makes the run fail with exit code 1.\n\n\
Supported values:\n\
- error (default): fail only on errors\n\
- warning: fail on any finding\n\
- never: always exit 0 unless a fatal error occurs"
        )]
        fail_on: String,

        /// Do not warn about unknown code fence language tags.
        #[arg(long)]
        ignore_unknown_tags: bool,

        /// Accept additional code fence language tags.
        #[arg(
            long,
            value_name = "TAG",
            value_delimiter = ',',
            long_help = "Accept additional code fence language tags without a warning.\n\n\
May be repeated or given as a comma-separated list. Tags are compared\n\
case-insensitively."
        )]
        allow_tag: Vec<String>,

        /// Also warn about table rows whose cell count differs from the header.
        #[arg(long)]
        check_tables: bool,

        #[command(flatten)]
        walk: WalkArgs,
    },

    /// List the heading anchors of every document under ROOT.
    #[command(
        long_about = "List every heading anchor (path, slug, level, line, text) that links\n\
can target. Slugs are shown after duplicate disambiguation.\n\n\
Examples:\n\
  doclint anchors docs\n\
  doclint anchors docs --document guides/php.md --format json\n"
    )]
    Anchors {
        /// Documentation root directory.
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// Only list anchors of this document (path relative to ROOT).
        #[arg(long, value_name = "PATH")]
        document: Option<String>,

        #[command(flatten)]
        walk: WalkArgs,
    },

    /// Dump the blocks extracted from one Markdown file.
    #[command(
        long_about = "Print the headings, code fences, links and tables extracted from a\n\
single file, along with extraction findings such as unterminated fences.\n\
Useful to see how doclint reads a document.\n\n\
Examples:\n\
  doclint blocks README.md\n\
  doclint blocks docs/guide.md --lines 10:60 --format json\n"
    )]
    Blocks {
        /// Markdown file to read.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Only show blocks starting in this line range.
        #[arg(
            long,
            value_name = "START:END",
            long_help = "Only show blocks and findings that start in this 1-based, inclusive\n\
line range (format: start:end)."
        )]
        lines: Option<String>,
    },
}

/// Directory traversal flags shared by lint and anchors
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct WalkArgs {
    /// Skip hidden files/directories (dotfiles).
    #[arg(
        long,
        long_help = "Do not lint hidden files or files inside hidden directories.\n\n\
By default every *.md file under ROOT is linted, dotfiles included;\n\
only .git is always skipped. Links to skipped files still resolve."
    )]
    pub skip_hidden: bool,

    /// Respect ignore rules (.gitignore/.ignore).
    #[arg(
        long,
        long_help = "Do not lint files excluded by ignore rules (.gitignore/.ignore,\n\
global excludes).\n\n\
Links to ignored files still resolve."
    )]
    pub respect_ignore: bool,
}

impl From<WalkArgs> for ScanOptions {
    fn from(args: WalkArgs) -> Self {
        ScanOptions {
            skip_hidden: args.skip_hidden,
            respect_ignore: args.respect_ignore,
        }
    }
}

impl Cli {
    fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Error
        } else if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        }
    }

    fn render_config(&self) -> RenderConfig {
        let format: OutputFormat = self.format.parse().unwrap_or_default();
        let color = !self.no_color
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal();
        RenderConfig::new(format)
            .with_pretty(self.pretty)
            .with_color(color)
    }
}

/// Initialise stderr logging; RUST_LOG overrides the flag-derived level
pub fn init_logging(cli: &Cli) {
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<ExitCode> {
    let render_config = cli.render_config();

    match cli.command {
        Commands::Lint {
            root,
            fail_on,
            ignore_unknown_tags,
            allow_tag,
            check_tables,
            walk,
        } => {
            let root = root.canonicalize().unwrap_or(root);
            let options = LintOptions {
                scan: walk.into(),
                fences: FenceRules::new(ignore_unknown_tags, &allow_tag),
                fail_on: fail_on.parse::<FailOn>().unwrap_or_default(),
                check_tables,
            };
            crate::flows::lint::run_lint(&root, &options, render_config)
        }

        Commands::Anchors {
            root,
            document,
            walk,
        } => {
            let root = root.canonicalize().unwrap_or(root);
            crate::anchors::api::run_list(&root, walk.into(), document.as_deref(), render_config)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Blocks { file, lines } => {
            crate::backends::extract::run_blocks(&file, lines.as_deref(), render_config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
