//! Cross-reference resolution
//!
//! Checks every link of a document against the anchor index and the path
//! inventory, and every reference usage against the document's definitions.
//! Absolute URLs are never checked: no network access happens.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

use crate::anchors::index::AnchorIndex;
use crate::backends::scan::{is_markdown, Inventory};
use crate::core::model::{Category, Finding};
use crate::core::paths::resolve_relative;
use crate::markdown::block::{Link, Reference};
use crate::markdown::document::Document;

/// URI scheme prefix (`https:`, `mailto:`, ...)
static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("Invalid SCHEME_RE regex"));

/// What a link target refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget<'a> {
    /// Has a scheme or is protocol-relative; assumed valid
    External,
    /// `#slug` in the same document
    Anchor(&'a str),
    /// A path relative to the linking document, maybe with `#slug`
    File {
        path: &'a str,
        fragment: Option<&'a str>,
    },
}

pub fn classify(target: &str) -> LinkTarget<'_> {
    if let Some(fragment) = target.strip_prefix('#') {
        return LinkTarget::Anchor(fragment);
    }
    if target.starts_with("//") || SCHEME_RE.is_match(target) {
        return LinkTarget::External;
    }

    let (path, fragment) = match target.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (target, None),
    };
    let path = path.split_once('?').map_or(path, |(path, _)| path);
    LinkTarget::File { path, fragment }
}

/// Decode `%XX` escapes; malformed escapes are kept as-is and invalid
/// UTF-8 is replaced lossily
pub fn percent_decode(s: &str) -> Cow<'_, str> {
    match urlencoding::decode_binary(s.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(s),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Resolves links against a finished index; holds no mutable state
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a AnchorIndex,
    inventory: &'a Inventory,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a AnchorIndex, inventory: &'a Inventory) -> Self {
        Self { index, inventory }
    }

    /// One UNRESOLVED_LINK error per broken link or undefined reference, in
    /// document order
    pub fn resolve_document(&self, document: &Document) -> Vec<Finding> {
        let links = document
            .links()
            .filter_map(|link| self.resolve_link(document.path(), link));
        let references = document
            .references()
            .filter_map(|reference| resolve_reference(document, reference));

        let mut findings: Vec<Finding> = links.chain(references).collect();
        findings.sort_by_key(|finding| finding.line);
        findings
    }

    pub fn resolve_link(&self, from: &str, link: &Link) -> Option<Finding> {
        let outcome = match classify(&link.target) {
            LinkTarget::External => return None,
            LinkTarget::Anchor(fragment) => self.check_anchor(from, fragment),
            LinkTarget::File { path, fragment } => self.check_file(from, path, fragment),
        };

        let reason = outcome.err()?;
        Some(Finding::error(
            Category::UnresolvedLink,
            from,
            link.line,
            format!(
                "link [{}] to '{}' does not resolve: {reason}",
                link.text, link.target
            ),
        ))
    }

    fn check_anchor(&self, document: &str, fragment: &str) -> Result<(), String> {
        let slug = percent_decode(fragment).to_lowercase();
        if slug.is_empty() || self.index.lookup(document, &slug).is_some() {
            Ok(())
        } else {
            Err(format!("no heading with anchor '#{slug}' in {document}"))
        }
    }

    fn check_file(&self, from: &str, path: &str, fragment: Option<&str>) -> Result<(), String> {
        let decoded = percent_decode(path);
        if decoded.is_empty() {
            return fragment.map_or(Ok(()), |f| self.check_anchor(from, f));
        }

        let Some(resolved) = resolve_relative(from, &decoded) else {
            return Err(format!("'{decoded}' points outside the root"));
        };

        if is_markdown(&resolved) && self.index.has_document(&resolved) {
            return fragment.map_or(Ok(()), |f| self.check_anchor(&resolved, f));
        }

        if !self.inventory.contains(&resolved) {
            return Err(format!("'{resolved}' does not exist"));
        }
        if is_markdown(&resolved) && fragment.is_some_and(|f| !f.is_empty()) {
            log::debug!("{from}: '{resolved}' is not linted, its anchors are not checked");
        }
        Ok(())
    }
}

/// UNRESOLVED_LINK for a `[text][label]` usage with no definition in `document`
fn resolve_reference(document: &Document, reference: &Reference) -> Option<Finding> {
    if document.defines(&reference.label) {
        return None;
    }
    Some(Finding::error(
        Category::UnresolvedLink,
        document.path(),
        reference.line,
        format!(
            "reference [{}][{}] has no matching definition",
            reference.text, reference.label
        ),
    ))
}
