//! Title slugs and derived post filenames.

use serde::{Deserialize, Serialize};

use crate::record::Timestamp;

/// An inclusive range of characters kept verbatim in slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharRange {
    pub start: char,
    pub end: char,
}

impl CharRange {
    /// CJK Unified Ideographs, U+4E00..=U+9FA5.
    pub const CJK: Self = Self {
        start: '\u{4e00}',
        end: '\u{9fa5}',
    };

    #[must_use]
    pub const fn contains(self, c: char) -> bool {
        self.start <= c && c <= self.end
    }
}

/// Rules for turning a title into a filesystem-safe slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugRules {
    keep: Vec<CharRange>,
}

impl Default for SlugRules {
    fn default() -> Self {
        Self::new(vec![CharRange::CJK])
    }
}

impl SlugRules {
    #[must_use]
    pub const fn new(keep: Vec<CharRange>) -> Self {
        Self { keep }
    }

    fn keeps(&self, c: char) -> bool {
        c.is_alphanumeric()
            || c == '_'
            || c == '-'
            || c.is_whitespace()
            || self.keep.iter().any(|range| range.contains(c))
    }

    /// Strip everything but word characters, hyphens, whitespace, and the
    /// extra ranges; then collapse each whitespace run into one hyphen.
    #[must_use]
    pub fn slugify(&self, title: &str) -> String {
        let kept: String = title.chars().filter(|&c| self.keeps(c)).collect();
        kept.split_whitespace().collect::<Vec<_>>().join("-")
    }

    /// `{yyyy-M-d}-{slug}.md`.
    #[must_use]
    pub fn file_name(&self, timestamp: &Timestamp, title: &str) -> String {
        post_file_name(timestamp, &self.slugify(title))
    }
}

/// `{yyyy-M-d}-{slug}.md`.
#[must_use]
pub fn post_file_name(timestamp: &Timestamp, slug: &str) -> String {
    format!("{}-{slug}.md", timestamp.date_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn march_fifth() -> Timestamp {
        Timestamp::new(
            NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date"),
            NaiveTime::MIN,
        )
    }

    #[test]
    fn punctuation_is_stripped_and_whitespace_collapsed() {
        let rules = SlugRules::default();
        assert_eq!(rules.slugify("Hello, World!  Test"), "Hello-World-Test");
    }

    #[test]
    fn derives_dated_file_name() {
        let rules = SlugRules::default();
        assert_eq!(
            rules.file_name(&march_fifth(), "Hello, World!  Test"),
            "2024-3-5-Hello-World-Test.md"
        );
    }

    #[test]
    fn cjk_titles_are_kept() {
        let rules = SlugRules::default();
        assert_eq!(rules.slugify("你好 世界！"), "你好-世界");
    }

    #[test]
    fn existing_hyphens_and_underscores_survive() {
        let rules = SlugRules::default();
        assert_eq!(rules.slugify("  snake_case vs kebab-case  "), "snake_case-vs-kebab-case");
    }

    #[test]
    fn extra_ranges_keep_symbols() {
        let rules = SlugRules::new(vec![CharRange {
            start: '+',
            end: '+',
        }]);
        assert_eq!(rules.slugify("C++ tips"), "C++-tips");
        assert_eq!(SlugRules::default().slugify("C++ tips"), "C-tips");
    }
}
