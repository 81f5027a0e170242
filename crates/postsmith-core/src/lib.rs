//! Front-matter engine for static-site blog posts.
//!
//! A post is a text file whose optional header, fenced by `---` lines, holds
//! YAML metadata (title, date, categories, tags, author, description) and
//! whose remainder is the body. This crate splits posts, decodes headers
//! tolerant of the conventions older posts use, re-encodes them in one
//! canonical layout, and drives create/update editing sessions over them.
//!
//! The pieces, bottom up:
//!
//! - [`document`]: split a post into header and body, and join them back.
//! - [`record`]: the typed [`record::FieldRecord`].
//! - [`decode`] / [`encode`]: header text to record and back.
//! - [`slug`]: filenames for new posts.
//! - [`store`]: reading and writing posts.
//! - [`session`]: the create/update state machine.
//! - [`config`], [`roster`], [`keywords`]: settings, known authors, and tag
//!   suggestions.

pub mod config;
pub mod decode;
pub mod document;
pub mod encode;
pub mod error;
pub mod keywords;
pub mod record;
pub mod roster;
pub mod session;
pub mod slug;
pub mod store;
