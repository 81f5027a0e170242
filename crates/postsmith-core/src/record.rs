//! The typed field record behind a post's front matter.

use std::fmt;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

/// Most categories a post can carry: a primary and an optional secondary.
pub const MAX_CATEGORIES: usize = 2;

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Wall-clock date and time of a post, at whole-second precision.
///
/// The UTC offset is not stored; the encoder stamps a configured offset on
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Timestamp {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Timestamp {
    /// Build a timestamp, dropping any sub-second part of `time`.
    #[must_use]
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date,
            time: whole_seconds(time),
        }
    }

    #[must_use]
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self::new(datetime.date(), datetime.time())
    }

    /// The local wall-clock time, used as the default for new posts.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    /// `yyyy-M-d`: month and day without zero padding.
    #[must_use]
    pub fn date_text(&self) -> String {
        format!(
            "{:04}-{}-{}",
            self.date.year(),
            self.date.month(),
            self.date.day()
        )
    }

    /// `HH:MM:SS`.
    #[must_use]
    pub fn time_text(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }

    #[must_use]
    pub const fn with_date(self, date: NaiveDate) -> Self {
        Self { date, ..self }
    }

    #[must_use]
    pub fn with_time(self, time: NaiveTime) -> Self {
        Self::new(self.date, time)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date_text(), self.time_text())
    }
}

fn whole_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}

/// Parse `year-month-day` where month and day may be one or two digits.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().splitn(3, '-');
    let year: i32 = parse_digits(parts.next()?)?;
    let month: u32 = parse_digits(parts.next()?)?;
    let day: u32 = parse_digits(parts.next()?)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse `HH:MM:SS`.
#[must_use]
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let mut parts = text.trim().splitn(3, ':');
    let hour: u32 = parse_digits(parts.next()?)?;
    let minute: u32 = parse_digits(parts.next()?)?;
    let second: u32 = parse_digits(parts.next()?)?;
    NaiveTime::from_hms_opt(hour, minute, second)
}

fn parse_digits<T: std::str::FromStr>(raw: &str) -> Option<T> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Up to [`MAX_CATEGORIES`] category labels, primary first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Categories(Vec<String>);

impl Categories {
    /// Build from the primary/secondary pair of an editing form.
    #[must_use]
    pub fn new(primary: &str, secondary: &str) -> Self {
        Self::from_labels([primary, secondary])
    }

    /// Trim each label, drop empty ones, and keep the first two.
    #[must_use]
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            labels
                .into_iter()
                .map(|label| label.as_ref().trim().to_string())
                .filter(|label| !label.is_empty())
                .take(MAX_CATEGORIES)
                .collect(),
        )
    }

    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    #[must_use]
    pub fn secondary(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// An order-preserving set of tag labels.
///
/// On the editing side tags are one line of text separated by spaces.
/// Commas are accepted as separators too, so comma-delimited keyword lists
/// can be pasted in as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Parse editable tag text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::from_labels(text.split(|c: char| c.is_whitespace() || c == ','))
    }

    /// Trim each label, drop empty ones and duplicates, keep first-seen order.
    #[must_use]
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for label in labels {
            let label = label.as_ref().trim();
            if !label.is_empty() && !out.iter().any(|seen| seen == label) {
                out.push(label.to_string());
            }
        }
        Self(out)
    }

    /// The editable representation: labels joined by single spaces.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.0.join(" ")
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Field record
// ---------------------------------------------------------------------------

/// Decoded front matter of one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRecord {
    pub title: String,
    pub timestamp: Timestamp,
    pub categories: Categories,
    pub tags: Tags,
    pub author: String,
    /// May span several lines.
    pub description: String,
}

impl FieldRecord {
    /// An empty record dated `timestamp`.
    #[must_use]
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            title: String::new(),
            timestamp,
            categories: Categories::default(),
            tags: Tags::default(),
            author: String::new(),
            description: String::new(),
        }
    }

    /// Returns `true` when every text field is empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.title.is_empty()
            && self.categories.is_empty()
            && self.tags.is_empty()
            && self.author.is_empty()
            && self.description.is_empty()
    }
}
