//! Anchors module - Heading anchors and link resolution
//!
//! Every heading yields a slug; `[text](other.md#slug)` links are checked
//! against the run-wide index of those slugs.

pub mod api;
pub mod index;
pub mod resolve;
