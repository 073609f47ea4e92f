//! Fenced code block detection
//!
//! Uses pulldown-cmark only to locate fenced code blocks and read their
//! info strings; everything else in the extractor is line oriented.

use crate::patterns::DIAGRAM_LANGUAGES;
use pulldown_cmark::{CodeBlockKind, Event, Parser as MdParser, Tag};

/// Code block layout of a document
#[derive(Debug, Clone, Default)]
pub(crate) struct FenceScan {
    /// `true` for every line (0-based) inside a fenced block, fences included
    pub(crate) code_lines: Vec<bool>,
    /// Fenced blocks tagged as diagrams
    pub(crate) diagram_blocks: usize,
}

impl FenceScan {
    /// Whether the 0-based line sits inside a fenced block
    #[inline]
    pub(crate) fn is_code(&self, index: usize) -> bool {
        self.code_lines.get(index).copied().unwrap_or(false)
    }
}

/// Byte offset of the start of every line, matching `str::lines()`
pub(crate) fn line_starts(text: &str) -> Vec<usize> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut starts = vec![0];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' && i + 1 < text.len() {
            starts.push(i + 1);
        }
    }
    starts
}

/// 0-based line index containing `offset`
pub(crate) fn line_index(starts: &[usize], offset: usize) -> usize {
    starts.partition_point(|&s| s <= offset).saturating_sub(1)
}

/// Scan fenced code blocks
pub(crate) fn scan(text: &str, starts: &[usize]) -> FenceScan {
    let mut code_lines = vec![false; starts.len()];
    let mut diagram_blocks = 0;

    for (event, range) in MdParser::new(text).into_offset_iter() {
        let Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) = event else {
            continue;
        };

        let language = info
            .split_whitespace()
            .next()
            .map(str::to_lowercase)
            .unwrap_or_default();
        if DIAGRAM_LANGUAGES.contains(&language.as_str()) {
            diagram_blocks += 1;
        }

        let first = line_index(starts, range.start);
        let last = line_index(starts, range.end.saturating_sub(1).max(range.start));
        for flag in code_lines.iter_mut().take(last + 1).skip(first) {
            *flag = true;
        }
    }

    FenceScan {
        code_lines,
        diagram_blocks,
    }
}
