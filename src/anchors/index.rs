//! Anchor index
//!
//! Maps `(document path, slug)` to the heading that produced it. Built once
//! after every document has been extracted; read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::markdown::document::Document;

/// A heading as seen from a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorEntry {
    pub path: String,
    pub slug: String,
    pub level: u8,
    pub line: u32,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct AnchorIndex {
    documents: BTreeMap<String, BTreeMap<String, AnchorEntry>>,
}

impl AnchorIndex {
    /// Index the headings of every document
    pub fn build<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Self {
        let mut index = AnchorIndex::default();
        for document in documents {
            let slugs = index
                .documents
                .entry(document.path().to_string())
                .or_default();
            for heading in document.headings() {
                slugs
                    .entry(heading.slug.clone())
                    .or_insert_with(|| AnchorEntry {
                        path: document.path().to_string(),
                        slug: heading.slug.clone(),
                        level: heading.level,
                        line: heading.line,
                        text: heading.text.clone(),
                    });
            }
        }
        index
    }

    /// Whether `path` is a document of this run
    pub fn has_document(&self, path: &str) -> bool {
        self.documents.contains_key(path)
    }

    pub fn lookup(&self, path: &str, slug: &str) -> Option<&AnchorEntry> {
        self.documents.get(path)?.get(slug)
    }

    /// All entries, ordered by path then slug
    pub fn entries(&self) -> impl Iterator<Item = &AnchorEntry> {
        self.documents.values().flat_map(|slugs| slugs.values())
    }

    /// Number of indexed documents
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn len(&self) -> usize {
        self.documents.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<Document> {
        vec![
            Document::parse("b.md", "# Guide\n## Section One\n## Section One\n"),
            Document::parse("a.md", "No headings here.\n"),
        ]
    }

    #[test]
    fn test_build_and_lookup() {
        let docs = docs();
        let index = AnchorIndex::build(&docs);

        assert!(index.has_document("a.md"));
        assert!(index.has_document("b.md"));
        assert!(!index.has_document("c.md"));
        assert_eq!(index.document_count(), 2);

        let entry = index.lookup("b.md", "section-one").unwrap();
        assert_eq!(entry.line, 2);
        assert_eq!(entry.level, 2);
        assert_eq!(index.lookup("b.md", "section-one-1").unwrap().line, 3);
        assert!(index.lookup("b.md", "missing").is_none());
        assert!(index.lookup("a.md", "guide").is_none());
    }

    #[test]
    fn test_entries_are_ordered() {
        let docs = docs();
        let index = AnchorIndex::build(&docs);
        let slugs: Vec<_> = index.entries().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["guide", "section-one", "section-one-1"]);
        assert_eq!(index.len(), 3);
    }
}
