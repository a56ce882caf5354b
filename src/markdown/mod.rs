//! Markdown module - Structural parsing of documents
//!
//! Splits a document into headings, fenced code blocks, links and tables.
//! Parsing never fails: malformed structure is reported as findings.

pub mod block;
pub mod document;
pub mod extract;
pub mod slug;
pub mod table;
