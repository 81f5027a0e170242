//! Front-matter decoder.
//!
//! Turns header text into a [`FieldRecord`]. Posts written over the years use
//! different conventions for the same field: dates as plain text or as YAML
//! timestamps, categories as native lists or as `"[A,B]"` strings. Each value
//! is classified once into a [`RawField`] and every field is decoded on its
//! own, so one bad field never costs the others.
//!
//! Decoding never fails. Anything that had to be defaulted is reported as a
//! [`DecodeWarning`] alongside the record.

use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_yaml::{Mapping, Value};
use tracing::warn;

use crate::record::{Categories, FieldRecord, Tags, Timestamp, parse_date, parse_time};

/// Scalars a typed YAML loader would have turned into a date or datetime.
static YAML_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)^(?:
            (?P<date>[0-9]{4}-[0-9]{2}-[0-9]{2})
          | (?P<dt_date>[0-9]{4}-[0-9]{1,2}-[0-9]{1,2})
            (?:[Tt]|[\ \t]+)
            (?P<dt_time>[0-9]{1,2}:[0-9]{2}:[0-9]{2})(?:\.[0-9]*)?
            (?:[\ \t]*(?:Z|[-+][0-9]{1,2}(?::[0-9]{2})?))?
        )$",
    )
    .expect("timestamp pattern is valid")
});

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// A field that could not be decoded and was defaulted instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeWarning {
    /// The header is not well-formed YAML. The whole record is empty.
    #[error("front matter is not valid YAML: {0}")]
    Malformed(String),
    /// The header parsed, but not to a key/value mapping.
    #[error("front matter is a {0}, expected key/value pairs")]
    NotAMapping(&'static str),
    #[error("field `{field}` should be text but is a {found}; left empty")]
    NotText {
        field: &'static str,
        found: &'static str,
    },
    #[error("field `{field}` should be a list but is {found}; left empty")]
    NotAList {
        field: &'static str,
        found: &'static str,
    },
    #[error("field `date` is missing; using the default date and time")]
    MissingDate,
    #[error("field `date` should be a date but is a {0}; using the default")]
    NotADate(&'static str),
    #[error("unparseable date `{0}`; keeping the default date")]
    BadDate(String),
    #[error("date has no time part; keeping the default time")]
    MissingTime,
    #[error("unparseable time `{0}`; keeping the default time")]
    BadTime(String),
}

impl DecodeWarning {
    /// Returns `true` if the whole header was rejected.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Malformed(_) | Self::NotAMapping(_))
    }
}

/// A decoded record plus whatever had to be defaulted along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub record: FieldRecord,
    pub warnings: Vec<DecodeWarning>,
}

impl Decoded {
    fn empty(defaults: Timestamp) -> Self {
        Self {
            record: FieldRecord::new(defaults),
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, warning: DecodeWarning) {
        warn!(%warning, "front matter field defaulted");
        self.warnings.push(warning);
    }

    /// Returns `true` if the header could not be read as a mapping at all.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.warnings.iter().any(DecodeWarning::is_structural)
    }

    /// Human-readable warning lines.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

// ---------------------------------------------------------------------------
// Raw field classification
// ---------------------------------------------------------------------------

/// One header value, classified by shape before any field-specific decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawField {
    Missing,
    Scalar(String),
    /// A date or datetime already typed by the markup.
    Structured {
        date: NaiveDate,
        time: Option<NaiveTime>,
    },
    Sequence(Vec<String>),
    Unsupported(&'static str),
}

impl RawField {
    /// Classify a YAML value. Numbers and booleans count as text.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(value) = value else {
            return Self::Missing;
        };
        match value {
            Value::Null => Self::Missing,
            Value::Sequence(items) => Self::from_sequence(items),
            Value::Mapping(_) => Self::Unsupported("mapping"),
            Value::Tagged(tagged) => Self::from_value(Some(&tagged.value)),
            scalar => scalar_text(scalar).map_or(Self::Missing, Self::Scalar),
        }
    }

    fn from_sequence(items: &[Value]) -> Self {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Null => {}
                Value::Sequence(_) | Value::Mapping(_) => {
                    return Self::Unsupported("list of non-text values");
                }
                other => out.extend(scalar_text(other)),
            }
        }
        Self::Sequence(out)
    }

    /// Promote a scalar matching the YAML timestamp grammar to
    /// [`RawField::Structured`]. Other shapes pass through.
    #[must_use]
    pub fn typed_timestamp(self) -> Self {
        let structured = match &self {
            Self::Scalar(text) => parse_yaml_timestamp(text),
            _ => None,
        };
        structured.unwrap_or(self)
    }

    /// Short name of the shape, for warnings.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Missing => "nothing",
            Self::Scalar(_) => "text",
            Self::Structured { .. } => "date",
            Self::Sequence(_) => "list",
            Self::Unsupported(kind) => *kind,
        }
    }
}

fn parse_yaml_timestamp(text: &str) -> Option<RawField> {
    let caps = YAML_TIMESTAMP.captures(text.trim())?;
    if let Some(date) = caps.name("date") {
        let date = parse_date(date.as_str())?;
        return Some(RawField::Structured { date, time: None });
    }
    let date = parse_date(caps.name("dt_date")?.as_str())?;
    let time = parse_time(caps.name("dt_time")?.as_str())?;
    Some(RawField::Structured {
        date,
        time: Some(time),
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Decodes header text, filling anything unreadable from `defaults`.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    defaults: Timestamp,
}

impl Decoder {
    /// `defaults` supplies the date and time for any portion of the `date`
    /// field that is missing or unparseable.
    #[must_use]
    pub const fn new(defaults: Timestamp) -> Self {
        Self { defaults }
    }

    /// Decode the text between the two `---` lines.
    #[must_use]
    pub fn decode(&self, header: &str) -> Decoded {
        let mut decoded = Decoded::empty(self.defaults);
        if header.trim().is_empty() {
            return decoded;
        }

        let value = match parse_header(header) {
            Ok(value) => value,
            Err(err) => {
                decoded.warn(DecodeWarning::Malformed(err.to_string()));
                return decoded;
            }
        };

        let mapping = match value {
            Value::Mapping(mapping) => mapping,
            Value::Null => return decoded,
            other => {
                decoded.warn(DecodeWarning::NotAMapping(value_kind(&other)));
                return decoded;
            }
        };

        self.decode_mapping(&mapping, &mut decoded);
        decoded
    }

    fn decode_mapping(&self, mapping: &Mapping, decoded: &mut Decoded) {
        let field = |key: &str| RawField::from_value(mapping.get(key));

        decoded.record.title = decode_text("title", field("title"), decoded);
        decoded.record.timestamp =
            decode_timestamp(field("date").typed_timestamp(), self.defaults, decoded);
        decoded.record.categories = decode_categories(field("categories"), decoded);
        decoded.record.tags = decode_tags(field("tags"), decoded);
        decoded.record.author = decode_text("author", field("author"), decoded);
        decoded.record.description = decode_text("description", field("description"), decoded);
    }
}

/// Parse header YAML. A mapping that repeats a top-level key keeps the last
/// value, where a plain [`Value`] parse rejects the whole document.
fn parse_header(header: &str) -> Result<Value, serde_yaml::Error> {
    serde_yaml::from_str::<Value>(header).or_else(|err| {
        serde_yaml::from_str::<LastWins>(header)
            .map(|LastWins(mapping)| Value::Mapping(mapping))
            .map_err(|_| err)
    })
}

struct LastWins(Mapping);

impl<'de> Deserialize<'de> for LastWins {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LastWinsVisitor)
    }
}

struct LastWinsVisitor;

impl<'de> Visitor<'de> for LastWinsVisitor {
    type Value = LastWins;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of front-matter fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut mapping = Mapping::new();
        while let Some((key, value)) = access.next_entry::<Value, Value>()? {
            mapping.insert(key, value);
        }
        Ok(LastWins(mapping))
    }
}

/// Decode with `defaults` in one call.
#[must_use]
pub fn decode(header: &str, defaults: Timestamp) -> Decoded {
    Decoder::new(defaults).decode(header)
}

fn decode_text(field: &'static str, raw: RawField, decoded: &mut Decoded) -> String {
    match raw {
        RawField::Missing => String::new(),
        RawField::Scalar(text) => text,
        other => {
            decoded.warn(DecodeWarning::NotText {
                field,
                found: other.shape(),
            });
            String::new()
        }
    }
}

fn decode_timestamp(raw: RawField, defaults: Timestamp, decoded: &mut Decoded) -> Timestamp {
    match raw {
        RawField::Missing => {
            decoded.warn(DecodeWarning::MissingDate);
            defaults
        }
        RawField::Structured { date, time } => {
            let stamp = defaults.with_date(date);
            time.map_or(stamp, |time| stamp.with_time(time))
        }
        RawField::Scalar(text) => decode_timestamp_text(&text, defaults, decoded),
        other => {
            decoded.warn(DecodeWarning::NotADate(other.shape()));
            defaults
        }
    }
}

/// `yyyy-M-d HH:MM:SS +offset`; the offset is discarded.
fn decode_timestamp_text(text: &str, defaults: Timestamp, decoded: &mut Decoded) -> Timestamp {
    let text = text.trim();
    let (date_part, rest) = match text.split_once(' ') {
        Some((date, rest)) => (date, Some(rest)),
        None => (text, None),
    };

    let mut stamp = defaults;
    match parse_date(date_part) {
        Some(date) => stamp = stamp.with_date(date),
        None => decoded.warn(DecodeWarning::BadDate(date_part.to_string())),
    }

    let Some(rest) = rest else {
        decoded.warn(DecodeWarning::MissingTime);
        return stamp;
    };
    let token = rest.split_whitespace().next().unwrap_or_default();
    let time_part = token.split(['+', '-']).next().unwrap_or_default();
    match parse_time(time_part) {
        Some(time) => stamp = stamp.with_time(time),
        None => decoded.warn(DecodeWarning::BadTime(time_part.to_string())),
    }
    stamp
}

/// Native lists are taken as-is. A bracketed `"[A,B]"` or bare `"A,B"` string
/// is the legacy form: split on commas, no quoting support, so a category
/// name containing a comma cannot be recovered from it.
fn decode_categories(raw: RawField, decoded: &mut Decoded) -> Categories {
    match raw {
        RawField::Missing => Categories::default(),
        RawField::Sequence(items) => Categories::from_labels(items),
        RawField::Scalar(text) => {
            let trimmed = text.trim();
            let inner = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .unwrap_or(trimmed);
            Categories::from_labels(inner.split(','))
        }
        other => {
            decoded.warn(DecodeWarning::NotAList {
                field: "categories",
                found: other.shape(),
            });
            Categories::default()
        }
    }
}

fn decode_tags(raw: RawField, decoded: &mut Decoded) -> Tags {
    match raw {
        RawField::Missing => Tags::default(),
        RawField::Sequence(items) => Tags::from_labels(items),
        other => {
            decoded.warn(DecodeWarning::NotAList {
                field: "tags",
                found: other.shape(),
            });
            Tags::default()
        }
    }
}
