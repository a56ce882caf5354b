//! Heading slugs
//!
//! `slugify` turns heading text into an anchor; `SlugRegistry` applies the
//! per-document `-1`, `-2`, ... suffixes for repeated headings.

use std::collections::{HashMap, HashSet};

/// Lower-case, drop punctuation, join whitespace runs with '-'.
///
/// Punctuation between two whitespace runs does not split them:
/// `"One & Two"` becomes `"one-two"`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.trim().chars() {
        if ch.is_whitespace() {
            pending_dash = true;
            continue;
        }
        if !(ch.is_alphanumeric() || ch == '-' || ch == '_') {
            continue;
        }
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.extend(ch.to_lowercase());
    }

    slug
}

/// Hands out unique slugs within one document
#[derive(Debug, Clone, Default)]
pub struct SlugRegistry {
    counters: HashMap<String, usize>,
    used: HashSet<String>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `base`, or the first free `base-N` if `base` was already handed out
    pub fn assign(&mut self, base: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }

        let counter = self.counters.entry(base.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{base}-{counter}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Section One"), "section-one");
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("What is `PDO`?"), "what-is-pdo");
        assert_eq!(slugify("Q1. What's new in PHP 8.1?"), "q1-whats-new-in-php-81");
        assert_eq!(slugify("One & Two"), "one-two");
        assert_eq!(slugify("snake_case and kebab-case"), "snake_case-and-kebab-case");
    }

    #[test]
    fn test_slugify_unicode() {
        assert_eq!(slugify("Café Über"), "café-über");
    }

    #[test]
    fn test_slugify_only_punctuation() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_registry_suffixes_in_order() {
        let mut registry = SlugRegistry::new();
        assert_eq!(registry.assign("example"), "example");
        assert_eq!(registry.assign("example"), "example-1");
        assert_eq!(registry.assign("example"), "example-2");
        assert_eq!(registry.assign("other"), "other");
    }

    #[test]
    fn test_registry_skips_taken_suffix() {
        let mut registry = SlugRegistry::new();
        assert_eq!(registry.assign("foo-1"), "foo-1");
        assert_eq!(registry.assign("foo"), "foo");
        assert_eq!(registry.assign("foo"), "foo-2");
    }
}
