//! Anchor API - list operation

use anyhow::{bail, Result};
use std::path::Path;

use crate::anchors::index::AnchorIndex;
use crate::backends::scan::ScanOptions;
use crate::backends::workspace::load_workspace;
use crate::core::render::{RenderConfig, Renderer};

/// Build the anchor index of every document under `root`
///
/// With `document`, only that document's headings are listed; a path that
/// is not one of the scanned documents is an error.
pub fn list_anchors(
    root: &Path,
    options: ScanOptions,
    document: Option<&str>,
) -> Result<AnchorIndex> {
    let workspace = load_workspace(root, options)?;
    let index = match document {
        Some(path) => match workspace.document(path) {
            Some(document) => AnchorIndex::build(std::iter::once(document)),
            None => bail!("'{}' is not a Markdown document under {}", path, root.display()),
        },
        None => AnchorIndex::build(&workspace.documents),
    };
    Ok(index)
}

/// Run anchors command
pub fn run_list(
    root: &Path,
    options: ScanOptions,
    document: Option<&str>,
    config: RenderConfig,
) -> Result<()> {
    let index = list_anchors(root, options, document)?;
    if index.is_empty() {
        log::warn!("no headings found under {}", root.display());
    }
    let renderer = Renderer::with_config(config);
    println!("{}", renderer.render_anchors(&index));
    Ok(())
}
