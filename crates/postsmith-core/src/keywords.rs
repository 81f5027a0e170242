//! Seam for tag suggestions from a keyword-extraction service.
//!
//! The service itself lives outside this crate. It receives a fixed
//! instruction plus the start of the post body and answers with a
//! comma-delimited keyword string, which replaces the post's tags.

use crate::error::ErrorCode;

/// How much of the body is sent, in characters.
pub const EXCERPT_CHARS: usize = 2000;

/// Instruction sent along with every excerpt.
pub const KEYWORD_INSTRUCTION: &str = "Extract 3 to 6 short keywords that describe the following blog post. \
     Reply with the keywords only, separated by commas.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeywordError {
    #[error("keyword source failed: {0}")]
    Source(String),
    #[error("nothing to extract keywords from: the post body is empty")]
    EmptyBody,
}

impl KeywordError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::KeywordSourceFailed
    }
}

/// Something that turns body text into a comma-delimited keyword list.
pub trait KeywordSource {
    /// # Errors
    ///
    /// Returns [`KeywordError::Source`] when the service cannot answer.
    fn extract(&self, instruction: &str, excerpt: &str) -> Result<String, KeywordError>;
}

/// The first [`EXCERPT_CHARS`] characters of `body`.
#[must_use]
pub fn excerpt(body: &str) -> &str {
    body.char_indices()
        .nth(EXCERPT_CHARS)
        .map_or(body, |(end, _)| &body[..end])
}
