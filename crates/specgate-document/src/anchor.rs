//! Heading anchor slugs
//!
//! Follows the GitHub convention: markup stripped, lower-cased, anything
//! that is not a word character, space or hyphen dropped, and whitespace
//! runs collapsed to a single hyphen. Repeated slugs get `-1`, `-2`, ...

use crate::patterns::{ANCHOR_DISALLOWED, LINK, WHITESPACE_RUN};
use std::collections::HashMap;

/// Slug for a heading title
#[must_use]
pub fn slugify(title: &str) -> String {
    let unlinked = LINK.replace_all(title, "$1");
    let unmarked: String = unlinked.chars().filter(|c| !matches!(c, '*' | '`')).collect();
    let unmarked = unmarked.replace("__", "");
    let lowered = unmarked.trim().to_lowercase();
    let kept = ANCHOR_DISALLOWED.replace_all(&lowered, "");
    WHITESPACE_RUN.replace_all(kept.trim(), "-").into_owned()
}

/// Hands out unique slugs in document order
#[derive(Debug, Default)]
pub(crate) struct SlugRegistry {
    seen: HashMap<String, usize>,
}

impl SlugRegistry {
    /// Slug for `title`, suffixed when already handed out
    pub(crate) fn claim(&mut self, title: &str) -> String {
        let base = slugify(title);
        match self.seen.get_mut(&base) {
            Some(count) => {
                *count += 1;
                format!("{base}-{count}")
            }
            None => {
                self.seen.insert(base.clone(), 0);
                base
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_basic() {
        assert_eq!(slugify("System Architecture"), "system-architecture");
        assert_eq!(slugify("1.2 Goals & Non-Goals"), "12-goals-non-goals");
        assert_eq!(slugify("**Bold** `code` title"), "bold-code-title");
        assert_eq!(slugify("See [docs](x.md)"), "see-docs");
        assert_eq!(slugify("snake_case name"), "snake_case-name");
    }

    #[test]
    fn duplicates_get_suffix() {
        let mut reg = SlugRegistry::default();
        assert_eq!(reg.claim("Overview"), "overview");
        assert_eq!(reg.claim("Overview"), "overview-1");
        assert_eq!(reg.claim("overview"), "overview-2");
    }
}
