//! Workspace loading
//!
//! Scans the root, then reads and parses every document before any check
//! runs. A file that cannot be read aborts the whole run.

use std::path::Path;

use crate::backends::scan::{scan_tree, Inventory, ScanOptions};
use crate::core::error::LintError;
use crate::core::file_reader::read_text;
use crate::markdown::document::Document;

/// The parsed documents of one run plus the path inventory
#[derive(Debug)]
pub struct Workspace {
    pub inventory: Inventory,
    pub documents: Vec<Document>,
}

impl Workspace {
    pub fn document(&self, path: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.path() == path)
    }
}

/// Scan `root`, read every Markdown file and extract its blocks
pub fn load_workspace(root: &Path, options: ScanOptions) -> Result<Workspace, LintError> {
    let inventory = scan_tree(root, options)?;
    if inventory.documents.is_empty() {
        return Err(LintError::NoDocuments(root.to_path_buf()));
    }

    let mut sources = Vec::with_capacity(inventory.documents.len());
    for relative in &inventory.documents {
        let read = read_text(&root.join(relative))?;
        if read.lossy_conversion {
            log::warn!("{relative} is not valid UTF-8; invalid bytes were replaced");
        }
        sources.push((relative.clone(), read.content));
    }

    let documents = parse_all(sources);
    log::debug!("parsed {} documents under {}", documents.len(), root.display());

    Ok(Workspace {
        inventory,
        documents,
    })
}

#[cfg(feature = "parallel")]
fn parse_all(sources: Vec<(String, String)>) -> Vec<Document> {
    use rayon::prelude::*;
    sources
        .into_par_iter()
        .map(|(path, text)| Document::parse(path, text))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn parse_all(sources: Vec<(String, String)>) -> Vec<Document> {
    sources
        .into_iter()
        .map(|(path, text)| Document::parse(path, text))
        .collect()
}
