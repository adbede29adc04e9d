use eyre::{bail, Result};
use tw_core::span::Span;

/// Replacement of one byte range of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub replacement: String,
}

impl TextEdit {
    pub fn new(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }
}

/// Apply non-overlapping edits to `source`.
pub fn splice(source: &str, edits: &[TextEdit]) -> Result<String> {
    let mut edits: Vec<&TextEdit> = edits.iter().collect();
    edits.sort_by_key(|edit| edit.span.lo);

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for edit in edits {
        let lo = edit.span.lo as usize;
        let hi = edit.span.hi as usize;
        if lo < cursor || hi < lo || hi > source.len() {
            bail!("invalid edit span {} for source of {} bytes", edit.span, source.len());
        }
        if !source.is_char_boundary(lo) || !source.is_char_boundary(hi) {
            bail!("edit span {} splits a character", edit.span);
        }
        out.push_str(&source[cursor..lo]);
        out.push_str(&edit.replacement);
        cursor = hi;
    }
    out.push_str(&source[cursor..]);
    Ok(out)
}
