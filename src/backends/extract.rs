//! Extract backend - Block dump for one Markdown file

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::core::file_reader::read_text;
use crate::core::paths::normalize_path;
use crate::core::render::{RenderConfig, Renderer};
use crate::markdown::document::Document;

/// Parse line range string (format: "start:end")
pub fn parse_line_range(s: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        bail!(
            "Invalid line range format. Expected 'start:end', got '{}'",
            s
        );
    }

    let start: u32 = parts[0]
        .parse()
        .with_context(|| format!("Invalid start line: {}", parts[0]))?;
    let end: u32 = parts[1]
        .parse()
        .with_context(|| format!("Invalid end line: {}", parts[1]))?;

    if start > end {
        bail!("Start line ({}) must be <= end line ({})", start, end);
    }

    if start == 0 {
        bail!("Line numbers are 1-indexed, start cannot be 0");
    }

    Ok((start, end))
}

/// Read and parse a single file; the path is kept as given
pub fn load_document(path: &Path) -> Result<Document> {
    let read = read_text(path)?;
    let display = normalize_path(path);
    if read.lossy_conversion {
        log::warn!("{display} is not valid UTF-8; invalid bytes were replaced");
    }
    Ok(Document::parse(display, read.content))
}

/// Run blocks command
pub fn run_blocks(path: &Path, lines: Option<&str>, config: RenderConfig) -> Result<()> {
    let document = load_document(path)?;
    log::debug!(
        "{}: {} bytes, {} blocks",
        document.path(),
        document.text().len(),
        document.blocks().len()
    );
    let document = match lines {
        Some(range) => {
            let (start, end) = parse_line_range(range)?;
            document.restricted(start, end)
        }
        None => document,
    };

    let renderer = Renderer::with_config(config);
    println!("{}", renderer.render_blocks(&document));
    Ok(())
}
