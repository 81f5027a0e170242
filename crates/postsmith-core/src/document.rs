//! Front-matter block splitter and document assembly.
//!
//! A post is an optional metadata block followed by free-form body text:
//!
//! ```text
//! ---
//! title: Hello
//! ---
//! body text
//! ```
//!
//! A delimiter is a line that is exactly `---` at the start of the line,
//! optionally followed by whitespace. [`split`] borrows both halves from the
//! input; nothing is copied until a caller decides to keep the result.

use serde::{Deserialize, Serialize};

/// The delimiter line that opens and closes a metadata block.
pub const DELIMITER: &str = "---";

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// A document split into its metadata block and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    /// Text between the two delimiter lines, or `""` when there is no block.
    pub header: &'a str,
    /// Everything after the closing delimiter, leading newlines stripped.
    /// When there is no block this is the whole input, unchanged.
    pub body: &'a str,
}

impl Split<'_> {
    /// Returns `true` when a metadata block was found.
    #[must_use]
    pub const fn has_metadata(&self) -> bool {
        !self.header.is_empty()
    }
}

/// Returns `true` if `line` (with or without its trailing newline) is a
/// block delimiter.
fn is_delimiter(line: &str) -> bool {
    line.strip_prefix(DELIMITER)
        .is_some_and(|rest| rest.chars().all(char::is_whitespace))
}

/// Split raw text into header and body in a single pass.
///
/// Only the first two delimiter lines are considered. A block is recognised
/// when the opening delimiter is preceded by blank lines only and the
/// interior is not blank. Every other input is treated as body-only; this
/// function never fails.
#[must_use]
pub fn split(text: &str) -> Split<'_> {
    let whole = Split {
        header: "",
        body: text,
    };

    let mut offset = 0;
    let mut opened_at: Option<usize> = None;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        if !is_delimiter(line) {
            if opened_at.is_none() && !line.trim().is_empty() {
                return whole;
            }
            continue;
        }

        match opened_at {
            None => opened_at = Some(offset),
            Some(open) => {
                let header = &text[open..line_start];
                if header.trim().is_empty() {
                    return whole;
                }
                let body = text[offset..].trim_start_matches(['\n', '\r']);
                return Split { header, body };
            }
        }
    }

    whole
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// How a freshly encoded header is joined to a non-empty body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodySeparator {
    /// `header + "\n" + body`: one blank line after the closing delimiter.
    #[default]
    BlankLine,
    /// `header + body`: body starts on the line after the closing delimiter.
    None,
}

/// Join an encoded header (ending in `---\n`) with a body.
///
/// An empty body yields the header alone regardless of `separator`.
#[must_use]
pub fn assemble(header: &str, body: &str, separator: BodySeparator) -> String {
    if body.is_empty() {
        return header.to_string();
    }
    let mut out = String::with_capacity(header.len() + body.len() + 1);
    out.push_str(header);
    if separator == BodySeparator::BlankLine {
        out.push('\n');
    }
    out.push_str(body);
    out
}
