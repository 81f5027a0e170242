//! Editing sessions: create a new post or update an opened one.
//!
//! A [`Session`] is a plain value owned by the caller. It is either
//! [`Session::Empty`] (a new post is being written) or [`Session::Editing`]
//! (bound to one post on disk). Every operation either completes its state
//! transition or leaves the session exactly as it was.
//!
//! ```text
//!            load                       generate
//!  Empty ───────────▶ Editing ◀──────────────────┐
//!    │ ▲                 │  │                    │
//!    │ └──── reset ──────┘  └──── generate ──────┘
//!    └──── generate (create) ───▶ Editing
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::decode::{DecodeWarning, Decoder};
use crate::document::{BodySeparator, assemble, split};
use crate::encode::Encoder;
use crate::error::ErrorCode;
use crate::keywords::{KEYWORD_INSTRUCTION, KeywordError, KeywordSource, excerpt};
use crate::record::{FieldRecord, Tags, Timestamp};
use crate::slug::SlugRules;
use crate::store::{DocumentStore, StoreError};

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Everything about output that comes from configuration rather than from
/// the post itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostLayout {
    pub encoder: Encoder,
    pub separator: BodySeparator,
    pub slug: SlugRules,
    /// Directory for new posts, relative to the project root.
    pub posts_dir: PathBuf,
}

impl Default for PostLayout {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl PostLayout {
    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            encoder: Encoder::new(config.front_matter.utc_offset.clone()),
            separator: config.front_matter.body_separator,
            slug: config.slug.rules(),
            posts_dir: config.layout.posts_dir.clone(),
        }
    }

    /// Where a new post with `record`'s date and title is created.
    #[must_use]
    pub fn new_post_path(&self, project_root: &Path, record: &FieldRecord) -> PathBuf {
        let name = self.slug.file_name(&record.timestamp, record.title.trim());
        project_root.join(&self.posts_dir).join(name)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("blog project path is not set")]
    MissingProjectPath,
    #[error("post title is empty")]
    MissingTitle,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingProjectPath => ErrorCode::MissingProjectPath,
            Self::MissingTitle => ErrorCode::MissingTitle,
            Self::Store(err) => err.code(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Whether the next [`Session::generate`] creates or updates a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Create,
    Update,
}

impl Mode {
    /// Label for the commit action.
    #[must_use]
    pub const fn action_label(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

/// A post as it was when the session bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    path: PathBuf,
    original: String,
    body: String,
}

impl LoadedDocument {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw text exactly as read or written.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The body reused by updates that supply no replacement.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Result of a successful [`Session::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generated {
    pub path: PathBuf,
    pub mode: Mode,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// No post bound; `record` holds the new post's fields.
    Empty { record: FieldRecord },
    /// Bound to `document`; `record` started as its decoded front matter.
    Editing {
        document: LoadedDocument,
        record: FieldRecord,
    },
}

impl Session {
    /// An empty session whose record is dated `now`.
    #[must_use]
    pub fn new(now: Timestamp) -> Self {
        Self::Empty {
            record: FieldRecord::new(now),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        match self {
            Self::Empty { .. } => Mode::Create,
            Self::Editing { .. } => Mode::Update,
        }
    }

    #[must_use]
    pub const fn record(&self) -> &FieldRecord {
        match self {
            Self::Empty { record } | Self::Editing { record, .. } => record,
        }
    }

    pub const fn record_mut(&mut self) -> &mut FieldRecord {
        match self {
            Self::Empty { record } | Self::Editing { record, .. } => record,
        }
    }

    #[must_use]
    pub const fn document(&self) -> Option<&LoadedDocument> {
        match self {
            Self::Empty { .. } => None,
            Self::Editing { document, .. } => Some(document),
        }
    }

    /// The post this session reads from and writes to, if any.
    #[must_use]
    pub fn target_path(&self) -> Option<&Path> {
        self.document().map(LoadedDocument::path)
    }

    /// Open the post at `path`, replacing whatever the session held.
    ///
    /// Portions of the date that cannot be decoded take their value from
    /// `now`. If the header is not well-formed at all the record is empty
    /// and the whole raw text is kept as the body, so nothing is lost on
    /// the next update.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the file cannot be read; the
    /// session is unchanged.
    pub fn load<S: DocumentStore + ?Sized>(
        &mut self,
        store: &S,
        path: &Path,
        now: Timestamp,
    ) -> Result<Vec<DecodeWarning>, SessionError> {
        let original = store.read(path)?;

        let parts = split(&original);
        let decoded = Decoder::new(now).decode(parts.header);
        let body = if decoded.is_malformed() {
            original.clone()
        } else {
            parts.body.to_string()
        };

        debug!(
            path = %path.display(),
            has_metadata = parts.has_metadata(),
            warnings = decoded.warnings.len(),
            "post loaded"
        );

        *self = Self::Editing {
            document: LoadedDocument {
                path: path.to_path_buf(),
                original,
                body,
            },
            record: decoded.record,
        };
        Ok(decoded.warnings)
    }

    /// Check that the session can be written: a non-empty project root,
    /// then a non-blank title. Returns the project root on success.
    ///
    /// # Errors
    ///
    /// [`SessionError::MissingProjectPath`] or [`SessionError::MissingTitle`].
    pub fn validate<'a>(&self, project_root: Option<&'a Path>) -> Result<&'a Path, SessionError> {
        let project_root = project_root
            .filter(|root| !root.as_os_str().is_empty())
            .ok_or(SessionError::MissingProjectPath)?;
        if self.record().title.trim().is_empty() {
            return Err(SessionError::MissingTitle);
        }
        Ok(project_root)
    }

    /// Encode the record and write the post.
    ///
    /// In [`Mode::Create`] the file goes to `<project>/<posts_dir>/` under a
    /// name derived from the date and title, with `replacement_body` (or
    /// nothing) as the body. In [`Mode::Update`] the bound file is rewritten
    /// with `replacement_body`, or with the body the post had when it was
    /// loaded. Either way the session ends bound to the written post.
    ///
    /// # Errors
    ///
    /// Runs [`Session::validate`] before anything is encoded;
    /// [`SessionError::Store`] reports a failed write. On error the session
    /// is unchanged.
    pub fn generate<S: DocumentStore + ?Sized>(
        &mut self,
        layout: &PostLayout,
        store: &S,
        project_root: Option<&Path>,
        replacement_body: Option<&str>,
    ) -> Result<Generated, SessionError> {
        let project_root = self.validate(project_root)?;

        let (mode, path, body) = match &*self {
            Self::Empty { record } => (
                Mode::Create,
                layout.new_post_path(project_root, record),
                replacement_body.unwrap_or_default().to_string(),
            ),
            Self::Editing { document, .. } => (
                Mode::Update,
                document.path.clone(),
                replacement_body.unwrap_or(&document.body).to_string(),
            ),
        };

        let header = layout.encoder.encode(self.record());
        let text = assemble(&header, &body, layout.separator);
        store.write(&path, &text)?;

        info!(
            action = mode.action_label(),
            path = %path.display(),
            "post written"
        );

        let record = self.record().clone();
        *self = Self::Editing {
            document: LoadedDocument {
                path: path.clone(),
                original: text.clone(),
                body,
            },
            record,
        };
        Ok(Generated { path, mode, text })
    }

    /// Drop the record and any bound post. Files on disk are not touched.
    pub fn reset(&mut self, now: Timestamp) {
        debug!(from = self.mode().action_label(), "session reset");
        *self = Self::new(now);
    }

    /// Replace the record's tags with keywords suggested for the body.
    ///
    /// `body` overrides the bound post's body. The record is untouched
    /// unless the source answers.
    ///
    /// # Errors
    ///
    /// [`KeywordError::EmptyBody`] if there is no text to send, or whatever
    /// the source reports.
    pub fn enrich_tags<K: KeywordSource + ?Sized>(
        &mut self,
        source: &K,
        body: Option<&str>,
    ) -> Result<(), KeywordError> {
        let body = body
            .or_else(|| self.document().map(LoadedDocument::body))
            .unwrap_or_default();
        if body.trim().is_empty() {
            return Err(KeywordError::EmptyBody);
        }
        let keywords = source.extract(KEYWORD_INSTRUCTION, excerpt(body))?;
        self.record_mut().tags = Tags::parse(&keywords);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Categories;
    use chrono::{NaiveDate, NaiveTime};
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;
    use std::io;

    #[derive(Default)]
    struct MemoryStore {
        files: RefCell<BTreeMap<PathBuf, String>>,
        fail_writes: Cell<bool>,
    }

    impl MemoryStore {
        fn with_file(path: &str, text: &str) -> Self {
            let store = Self::default();
            store
                .files
                .borrow_mut()
                .insert(PathBuf::from(path), text.to_string());
            store
        }

        fn get(&self, path: &Path) -> Option<String> {
            self.files.borrow().get(path).cloned()
        }

        fn count(&self) -> usize {
            self.files.borrow().len()
        }
    }

    impl DocumentStore for MemoryStore {
        fn read(&self, path: &Path) -> Result<String, StoreError> {
            self.get(path).ok_or_else(|| StoreError::Read {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            })
        }

        fn write(&self, path: &Path, text: &str) -> Result<(), StoreError> {
            if self.fail_writes.get() {
                return Err(StoreError::Write {
                    path: path.to_path_buf(),
                    source: io::Error::from(io::ErrorKind::PermissionDenied),
                });
            }
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), text.to_string());
            Ok(())
        }
    }

    struct FixedKeywords(Result<String, KeywordError>);

    impl KeywordSource for FixedKeywords {
        fn extract(&self, instruction: &str, excerpt: &str) -> Result<String, KeywordError> {
            assert_eq!(instruction, KEYWORD_INSTRUCTION);
            assert!(!excerpt.is_empty());
            self.0.clone()
        }
    }

    const POST: &str = "/blog/_posts/2024-3-5-hello.md";
    const HELLO: &str = "---\ntitle: Hello\n\ndate: 2024-3-5 09:05:03 +0800\n\n---\n\nHello world";

    fn now() -> Timestamp {
        Timestamp::new(
            NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date"),
            NaiveTime::from_hms_opt(9, 5, 3).expect("valid time"),
        )
    }

    fn root() -> Option<&'static Path> {
        Some(Path::new("/blog"))
    }

    fn titled(title: &str) -> Session {
        let mut session = Session::new(now());
        session.record_mut().title = title.to_string();
        session
    }

    #[test]
    fn new_session_creates() {
        let session = Session::new(now());
        assert_eq!(session.mode(), Mode::Create);
        assert_eq!(session.mode().action_label(), "create");
        assert!(session.target_path().is_none());
    }

    #[test]
    fn create_writes_derived_file_and_binds() {
        let store = MemoryStore::default();
        let mut session = titled("Hello, World!  Test");

        let out = session
            .generate(&PostLayout::default(), &store, root(), None)
            .expect("generate");

        let expected = Path::new("/blog/_posts/2024-3-5-Hello-World-Test.md");
        assert_eq!(out.path, expected);
        assert_eq!(out.mode, Mode::Create);
        assert_eq!(
            store.get(expected).as_deref(),
            Some("---\ntitle: Hello, World!  Test\n\ndate: 2024-3-5 09:05:03 +0800\n\n---\n")
        );
        assert_eq!(session.mode(), Mode::Update);
        assert_eq!(session.target_path(), Some(expected));
    }

    #[test]
    fn second_generate_updates_instead_of_duplicating() {
        let store = MemoryStore::default();
        let mut session = titled("Hello");
        let layout = PostLayout::default();

        let first = session.generate(&layout, &store, root(), None).expect("create");
        session.record_mut().title = "Hello again".into();
        let second = session.generate(&layout, &store, root(), None).expect("update");

        assert_eq!(second.mode, Mode::Update);
        assert_eq!(first.path, second.path);
        assert_eq!(store.count(), 1);
        assert!(second.text.contains("title: Hello again\n"));
    }

    #[test]
    fn create_with_replacement_body() {
        let store = MemoryStore::default();
        let mut session = titled("Hello");
        let out = session
            .generate(&PostLayout::default(), &store, root(), Some("Body text\n"))
            .expect("generate");
        assert!(out.text.ends_with("---\n\nBody text\n"));
        assert_eq!(split(&out.text).body, "Body text\n");
    }

    #[test]
    fn update_preserves_body() {
        let store = MemoryStore::with_file(POST, HELLO);
        let mut session = Session::new(now());
        let warnings = session.load(&store, Path::new(POST), now()).expect("load");
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(session.record().title, "Hello");

        session.record_mut().title = "Renamed".into();
        let out = session
            .generate(&PostLayout::default(), &store, root(), None)
            .expect("update");

        assert_eq!(out.mode, Mode::Update);
        assert_eq!(out.path, Path::new(POST));
        let written = store.get(Path::new(POST)).expect("written");
        assert_eq!(split(&written).body, "Hello world");
        assert!(written.contains("title: Renamed\n"));
    }

    #[test]
    fn original_body_survives_repeated_updates() {
        let store = MemoryStore::with_file(POST, HELLO);
        let layout = PostLayout::default();
        let mut session = Session::new(now());
        session.load(&store, Path::new(POST), now()).expect("load");

        for title in ["One", "Two", "Three"] {
            session.record_mut().title = title.into();
            session.generate(&layout, &store, root(), None).expect("update");
        }

        let written = store.get(Path::new(POST)).expect("written");
        assert_eq!(
            written,
            "---\ntitle: Three\n\ndate: 2024-3-5 09:05:03 +0800\n\n---\n\nHello world"
        );
    }

    #[test]
    fn replacement_body_wins_and_becomes_the_new_body() {
        let store = MemoryStore::with_file(POST, HELLO);
        let layout = PostLayout::default();
        let mut session = Session::new(now());
        session.load(&store, Path::new(POST), now()).expect("load");

        session
            .generate(&layout, &store, root(), Some("Rewritten"))
            .expect("update");
        assert_eq!(session.document().map(LoadedDocument::body), Some("Rewritten"));

        let out = session.generate(&layout, &store, root(), None).expect("update");
        assert_eq!(split(&out.text).body, "Rewritten");
    }

    #[test]
    fn separator_policy_is_configurable() {
        let store = MemoryStore::with_file(POST, HELLO);
        let layout = PostLayout {
            separator: BodySeparator::None,
            ..PostLayout::default()
        };
        let mut session = Session::new(now());
        session.load(&store, Path::new(POST), now()).expect("load");
        let out = session.generate(&layout, &store, root(), None).expect("update");
        assert!(out.text.ends_with("---\nHello world"));
    }

    #[test]
    fn missing_project_path_is_rejected_first() {
        let store = MemoryStore::default();
        let mut session = Session::new(now());
        let before = session.clone();

        let err = session
            .generate(&PostLayout::default(), &store, None, None)
            .unwrap_err();
        assert!(matches!(err, SessionError::MissingProjectPath));
        assert_eq!(err.code(), ErrorCode::MissingProjectPath);

        let err = session
            .generate(&PostLayout::default(), &store, Some(Path::new("")), None)
            .unwrap_err();
        assert!(matches!(err, SessionError::MissingProjectPath));
        assert_eq!(session, before);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn validate_checks_project_before_title() {
        let untitled = Session::new(now());
        assert!(matches!(
            untitled.validate(None),
            Err(SessionError::MissingProjectPath)
        ));
        assert!(matches!(
            untitled.validate(root()),
            Err(SessionError::MissingTitle)
        ));
        assert_eq!(titled("Hello").validate(root()).ok(), root());
    }

    #[test]
    fn blank_title_is_rejected() {
        let store = MemoryStore::default();
        let mut session = titled("   ");
        let err = session
            .generate(&PostLayout::default(), &store, root(), None)
            .unwrap_err();
        assert!(matches!(err, SessionError::MissingTitle));
        assert_eq!(session.mode(), Mode::Create);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn failed_write_leaves_session_unchanged() {
        let store = MemoryStore::default();
        store.fail_writes.set(true);
        let mut session = titled("Hello");
        let before = session.clone();

        let err = session
            .generate(&PostLayout::default(), &store, root(), None)
            .unwrap_err();
        assert!(matches!(err, SessionError::Store(StoreError::Write { .. })));
        assert_eq!(err.code(), ErrorCode::DocumentWriteFailed);
        assert_eq!(session, before);
    }

    #[test]
    fn failed_update_keeps_editing_state() {
        let store = MemoryStore::with_file(POST, HELLO);
        let mut session = Session::new(now());
        session.load(&store, Path::new(POST), now()).expect("load");
        session.record_mut().title = "Changed".into();
        let before = session.clone();

        store.fail_writes.set(true);
        assert!(
            session
                .generate(&PostLayout::default(), &store, root(), None)
                .is_err()
        );
        assert_eq!(session, before);
        assert_eq!(store.get(Path::new(POST)).as_deref(), Some(HELLO));
    }

    #[test]
    fn failed_load_leaves_session_unchanged() {
        let store = MemoryStore::default();
        let mut session = titled("Draft");
        let before = session.clone();

        let err = session
            .load(&store, Path::new("/blog/_posts/missing.md"), now())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DocumentReadFailed);
        assert_eq!(session, before);
    }

    #[test]
    fn loading_replaces_previous_document_wholesale() {
        let store = MemoryStore::with_file(POST, HELLO);
        store.files.borrow_mut().insert(
            PathBuf::from("/blog/_posts/other.md"),
            "---\ntitle: Other\ncategories: [A]\ndate: 2020-1-1 00:00:00\n---\nOther body".into(),
        );
        let mut session = Session::new(now());
        session.load(&store, Path::new(POST), now()).expect("load");
        session.record_mut().author = "someone".into();

        session
            .load(&store, Path::new("/blog/_posts/other.md"), now())
            .expect("load other");
        let record = session.record();
        assert_eq!(record.title, "Other");
        assert_eq!(record.author, "");
        assert_eq!(record.categories, Categories::new("A", ""));
        assert_eq!(session.document().map(LoadedDocument::body), Some("Other body"));
    }

    #[test]
    fn reset_returns_to_empty_without_touching_files() {
        let store = MemoryStore::with_file(POST, HELLO);
        let mut session = Session::new(now());
        session.load(&store, Path::new(POST), now()).expect("load");

        session.reset(now());
        assert_eq!(session, Session::new(now()));
        assert_eq!(session.mode().action_label(), "create");
        assert_eq!(store.get(Path::new(POST)).as_deref(), Some(HELLO));
    }

    #[test]
    fn malformed_header_keeps_raw_text() {
        let raw = "---\ntitle: [broken\n---\nBody";
        let store = MemoryStore::with_file(POST, raw);
        let mut session = Session::new(now());

        let warnings = session.load(&store, Path::new(POST), now()).expect("load");
        assert!(warnings.iter().any(DecodeWarning::is_structural));
        assert!(session.record().is_blank());
        let document = session.document().expect("bound");
        assert_eq!(document.original(), raw);
        assert_eq!(document.body(), raw);
    }

    #[test]
    fn document_without_header_loads_as_body() {
        let store = MemoryStore::with_file(POST, "Just text\n");
        let mut session = Session::new(now());
        let warnings = session.load(&store, Path::new(POST), now()).expect("load");
        assert!(warnings.is_empty());
        assert_eq!(session.document().map(LoadedDocument::body), Some("Just text\n"));
        assert_eq!(session.mode(), Mode::Update);
    }

    #[test]
    fn enrich_tags_replaces_tag_text() {
        let store = MemoryStore::with_file(POST, HELLO);
        let mut session = Session::new(now());
        session.load(&store, Path::new(POST), now()).expect("load");

        session
            .enrich_tags(&FixedKeywords(Ok("rust, parsing,yaml".into())), None)
            .expect("enrich");
        assert_eq!(session.record().tags.to_text(), "rust parsing yaml");
    }

    #[test]
    fn failed_enrichment_keeps_tags() {
        let mut session = Session::new(now());
        session.record_mut().tags = Tags::parse("keep me");
        let source = FixedKeywords(Err(KeywordError::Source("timeout".into())));

        let err = session.enrich_tags(&source, Some("Body")).unwrap_err();
        assert_eq!(err, KeywordError::Source("timeout".into()));
        assert_eq!(session.record().tags.to_text(), "keep me");

        let err = session.enrich_tags(&source, None).unwrap_err();
        assert_eq!(err, KeywordError::EmptyBody);
    }
}
