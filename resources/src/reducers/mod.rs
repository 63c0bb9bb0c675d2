//! Feature reducers.
//!
//! One reducer per user-facing surface: the reaction panel, the bookmark
//! toggle, the catalog pages, and the comment thread. Each owns its state
//! and action types and takes its providers through a small per-feature
//! environment, so the surfaces stay independently testable.

pub mod bookmark;
pub mod catalog;
pub mod comments;
pub mod reaction;
