//! File scanning backend
//!
//! Uses the ignore crate for gitignore-aware traversal. Produces the list of
//! Markdown documents to lint and an inventory of every path under the root,
//! which link resolution consults for non-Markdown targets.

use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::Path;

use crate::core::error::LintError;
use crate::core::paths::make_relative;

/// Traversal options
///
/// The default walks everything under the root except `.git`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Skip hidden files and directories
    pub skip_hidden: bool,

    /// Honour .gitignore/.ignore rules
    pub respect_ignore: bool,
}

impl ScanOptions {
    fn walker(self, root: &Path) -> WalkBuilder {
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(self.skip_hidden)
            .parents(self.respect_ignore)
            .ignore(self.respect_ignore)
            .git_ignore(self.respect_ignore)
            .git_global(self.respect_ignore)
            .git_exclude(self.respect_ignore)
            .filter_entry(|entry| entry.file_name() != ".git")
            .sort_by_file_name(|a, b| a.cmp(b));
        builder
    }
}

/// Everything found under the root, as '/'-separated relative paths
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Markdown files, sorted
    pub documents: Vec<String>,

    /// Every file and directory; the root itself is ""
    pub entries: BTreeSet<String>,
}

impl Inventory {
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains(path)
    }
}

/// Whether a path names a Markdown document (`.md`, any case)
pub fn is_markdown(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

/// Check that `root` is a readable directory
pub fn check_root(root: &Path) -> Result<(), LintError> {
    if !root.exists() {
        return Err(LintError::RootMissing(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(LintError::RootNotDirectory(root.to_path_buf()));
    }
    std::fs::read_dir(root)
        .map(|_| ())
        .map_err(|source| LintError::Unreadable {
            path: root.to_path_buf(),
            source,
        })
}

/// Root-relative paths of every entry `builder` yields, with whether each is a file
fn walk(builder: WalkBuilder, root: &Path) -> Result<Vec<(String, bool)>, LintError> {
    let mut found = Vec::new();
    for entry in builder.build() {
        let entry = entry.map_err(|err| LintError::Walk {
            path: root.to_path_buf(),
            message: err.to_string(),
        })?;

        let path = entry.path();
        if path == root {
            continue;
        }

        let Some(relative) = make_relative(path, root) else {
            continue;
        };

        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        found.push((relative, is_file));
    }
    Ok(found)
}

/// Walk `root` and collect the inventory
///
/// `options` narrows the documents to lint. The inventory of existing paths
/// always comes from an unfiltered walk, so a link to a skipped file still
/// resolves.
pub fn scan_tree(root: &Path, options: ScanOptions) -> Result<Inventory, LintError> {
    check_root(root)?;

    let mut inventory = Inventory::default();
    inventory.entries.insert(String::new());

    for (relative, is_file) in walk(options.walker(root), root)? {
        if is_file && is_markdown(&relative) {
            log::debug!("found document {relative}");
            inventory.documents.push(relative);
        }
    }

    let everything = ScanOptions::default();
    inventory
        .entries
        .extend(walk(everything.walker(root), root)?.into_iter().map(|(relative, _)| relative));

    inventory.documents.sort();
    Ok(inventory)
}
