//! Loaded specification document

use crate::error::DocumentError;
use crate::extract::extract;
use crate::features::{FeatureSet, Heading};
use std::path::{Path, PathBuf};

/// A markdown document and its extracted features
///
/// Immutable once built; a changed text needs a new `Document`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: Option<PathBuf>,
    text: String,
    lines: Vec<String>,
    features: FeatureSet,
}

impl Document {
    /// Build a document from in-memory text
    #[must_use]
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = text.lines().map(str::to_string).collect();
        let features = extract(&text);
        Self {
            path: None,
            text,
            lines,
            features,
        }
    }

    /// Read and parse a document from disk
    ///
    /// # Errors
    ///
    /// [`DocumentError::NotFound`] when the file does not exist,
    /// [`DocumentError::Io`] for any other read failure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DocumentError::io_error(path, e))?;
        let mut document = Self::parse(text);
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    /// Source path, if loaded from disk
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Directory containing the document
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }

    /// Name used in reports: the path, or `<memory>`
    #[must_use]
    pub fn identifier(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
    }

    /// Raw text
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lines in order
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Line by 1-based number
    #[must_use]
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
    }

    /// Extracted features
    #[inline]
    #[must_use]
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Section opened by the first heading at level ≤ `max_level` whose title
    /// starts with `prefix`, running until the next heading at level ≤ `max_level`
    #[must_use]
    pub fn section(&self, prefix: &str, max_level: u8) -> Option<Section<'_>> {
        let headings = &self.features.headings;
        let position = headings
            .iter()
            .position(|h| h.level <= max_level && h.title_starts_with(prefix))?;
        let heading = &headings[position];

        let end = headings[position + 1..]
            .iter()
            .find(|h| h.level <= max_level)
            .map_or(self.lines.len(), |h| h.line - 1);

        Some(Section {
            heading,
            first_line: heading.line + 1,
            lines: &self.lines[heading.line.min(end)..end],
        })
    }
}

/// Body of a section, heading line excluded
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    /// Opening heading
    pub heading: &'a Heading,
    /// 1-based number of the first body line
    pub first_line: usize,
    lines: &'a [String],
}

impl<'a> Section<'a> {
    /// Body lines with their 1-based numbers
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(move |(i, line)| (self.first_line + i, line.as_str()))
    }

    /// Body text joined with newlines
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Whether the body mentions `token` as a whole word
    #[must_use]
    pub fn contains_token(&self, token: &str) -> bool {
        self.lines.iter().any(|line| contains_token(line, token))
    }

    /// Whether the body has no non-blank line
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}

/// Whole-word occurrence of `token` in `haystack`
///
/// Neighbouring alphanumerics, `-` and `_` break the match, so `FR-1` is not
/// found inside `FR-10` or `NFR-1`.
#[must_use]
pub fn contains_token(haystack: &str, token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    haystack.match_indices(token).any(|(at, _)| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + token.len()..].chars().next();
        !before.is_some_and(is_token_char) && !after.is_some_and(is_token_char)
    })
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
