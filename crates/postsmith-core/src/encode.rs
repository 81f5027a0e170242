//! Canonical front-matter encoder.
//!
//! Output is always in the current convention, whatever convention the post
//! was read from:
//!
//! ```text
//! ---
//! title: Hello
//!
//! date: 2024-3-5 09:05:03 +0800
//!
//! categories: [Tech,Rust]
//!
//! tags: [rust,systems]
//!
//! author: alice
//!
//! description: |-
//!   Line one
//!   Line two
//!
//! ---
//! ```
//!
//! Fields appear in that fixed order, each followed by a blank line. Empty
//! fields are omitted except `date`, which is always written. Values are
//! written plain whenever YAML reads them back unchanged and double-quoted
//! otherwise.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::document::DELIMITER;
use crate::record::FieldRecord;

// ---------------------------------------------------------------------------
// UTC offset
// ---------------------------------------------------------------------------

/// The `+HHMM` / `-HHMM` offset stamped on every encoded date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UtcOffset(String);

/// Offset used when none is configured.
pub const DEFAULT_UTC_OFFSET: &str = "+0800";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid UTC offset `{0}`: expected +HHMM or -HHMM")]
pub struct InvalidOffset(pub String);

impl UtcOffset {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UtcOffset {
    fn default() -> Self {
        Self(DEFAULT_UTC_OFFSET.to_string())
    }
}

impl FromStr for UtcOffset {
    type Err = InvalidOffset;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidOffset(raw.to_string());
        let digits = raw
            .strip_prefix('+')
            .or_else(|| raw.strip_prefix('-'))
            .ok_or_else(invalid)?;
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let hours: u32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: u32 = digits[2..].parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }
        Ok(Self(raw.to_string()))
    }
}

impl TryFrom<String> for UtcOffset {
    type Error = InvalidOffset;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<UtcOffset> for String {
    fn from(offset: UtcOffset) -> Self {
        offset.0
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Serializes a [`FieldRecord`] into a delimited header block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoder {
    offset: UtcOffset,
}

impl Encoder {
    #[must_use]
    pub const fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    /// Encode `record` as a header block, delimiters included. The result
    /// ends with `---\n`.
    #[must_use]
    pub fn encode(&self, record: &FieldRecord) -> String {
        let mut out = String::with_capacity(256);
        out.push_str(DELIMITER);
        out.push('\n');

        let title = record.title.trim();
        if !title.is_empty() {
            push_field(&mut out, "title", &block_scalar(title));
        }

        let stamp = &record.timestamp;
        let date = format!("{} {} {}", stamp.date_text(), stamp.time_text(), self.offset);
        push_field(&mut out, "date", &date);

        if !record.categories.is_empty() {
            push_field(&mut out, "categories", &flow_list(record.categories.as_slice()));
        }
        if !record.tags.is_empty() {
            push_field(&mut out, "tags", &flow_list(record.tags.as_slice()));
        }

        let author = record.author.trim();
        if !author.is_empty() {
            push_field(&mut out, "author", &block_scalar(author));
        }

        let description = record.description.trim();
        if description.contains(['\n', '\r']) {
            push_multiline(&mut out, "description", description);
        } else if !description.is_empty() {
            push_field(&mut out, "description", &block_scalar(description));
        }

        out.push_str(DELIMITER);
        out.push('\n');
        out
    }
}

fn push_field(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    out.push_str(value);
    out.push_str("\n\n");
}

/// A `|-` literal block when YAML reads it back verbatim, otherwise a
/// double-quoted scalar with escaped line breaks.
fn push_multiline(out: &mut String, key: &str, text: &str) {
    let block = literal_block(text);
    let faithful = serde_yaml::from_str::<Mapping>(&format!("{key}: {block}"))
        .is_ok_and(|mapping| mapping.len() == 1 && reads_back(mapping.get(key), text));
    if faithful {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(&block);
        out.push('\n');
    } else {
        push_field(out, key, &double_quoted(text));
    }
}

/// `|-` followed by each line indented two spaces. `|-` drops the final
/// line break on read.
fn literal_block(text: &str) -> String {
    let mut block = String::with_capacity(text.len() + 16);
    block.push_str("|-\n");
    for line in text.lines() {
        if !line.is_empty() {
            block.push_str("  ");
            block.push_str(line);
        }
        block.push('\n');
    }
    block
}

/// `[a,b,c]`.
fn flow_list(items: &[String]) -> String {
    let rendered: Vec<String> = items.iter().map(|item| flow_item(item)).collect();
    format!("[{}]", rendered.join(","))
}

/// A mapping value, plain if YAML reads `key: <value>` back verbatim.
fn block_scalar(value: &str) -> String {
    let faithful = serde_yaml::from_str::<Mapping>(&format!("k: {value}"))
        .is_ok_and(|mapping| mapping.len() == 1 && reads_back(mapping.get("k"), value));
    if faithful {
        value.to_string()
    } else {
        double_quoted(value)
    }
}

/// A flow-sequence entry, plain if YAML reads `[<value>]` back verbatim.
fn flow_item(value: &str) -> String {
    let faithful = serde_yaml::from_str::<Vec<Value>>(&format!("[{value}]"))
        .is_ok_and(|items| items.len() == 1 && reads_back(items.first(), value));
    if faithful {
        value.to_string()
    } else {
        double_quoted(value)
    }
}

fn reads_back(parsed: Option<&Value>, value: &str) -> bool {
    parsed.and_then(Value::as_str) == Some(value)
}

fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
