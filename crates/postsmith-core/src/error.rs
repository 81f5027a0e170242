use std::fmt;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MissingProjectPath,
    ConfigParseError,
    ConfigWriteFailed,
    MissingTitle,
    InvalidFieldValue,
    RosterParseError,
    DocumentReadFailed,
    DocumentWriteFailed,
    KeywordSourceFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingProjectPath => "E1001",
            Self::ConfigParseError => "E1002",
            Self::ConfigWriteFailed => "E1003",
            Self::MissingTitle => "E2001",
            Self::InvalidFieldValue => "E2002",
            Self::RosterParseError => "E3001",
            Self::DocumentReadFailed => "E5001",
            Self::DocumentWriteFailed => "E5002",
            Self::KeywordSourceFailed => "E6001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingProjectPath => "Blog project path not set",
            Self::ConfigParseError => "Config file parse error",
            Self::ConfigWriteFailed => "Config file write failed",
            Self::MissingTitle => "Post title is empty",
            Self::InvalidFieldValue => "Invalid field value",
            Self::RosterParseError => "Author roster parse error",
            Self::DocumentReadFailed => "Post file read failed",
            Self::DocumentWriteFailed => "Post file write failed",
            Self::KeywordSourceFailed => "Keyword extraction failed",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::MissingProjectPath => Some(
                "Pass --project, set POSTSMITH_PROJECT, or run `postsmith config set-project <path>`.",
            ),
            Self::ConfigParseError => Some("Fix syntax in postsmith/config.toml and retry."),
            Self::ConfigWriteFailed => Some("Check write permissions on the config directory."),
            Self::MissingTitle => Some("Provide a non-empty --title."),
            Self::InvalidFieldValue => Some("Dates use yyyy-M-d, times HH:MM:SS, offsets +HHMM."),
            Self::RosterParseError => Some("_data/authors.yml must be a YAML mapping keyed by author name."),
            Self::DocumentReadFailed => Some("Check that the file exists and is UTF-8 text."),
            Self::DocumentWriteFailed => Some("Check disk space and write permissions."),
            Self::KeywordSourceFailed => Some("Retry later or edit tags by hand."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
