//! `ap-domain`: shared types for the archplan workspace.
//!
//! Everything that crosses a crate boundary lives here: the structured
//! [`project::ProjectState`] being refined, retrieval [`retrieval::Source`]s
//! and [`retrieval::RetrievalResult`]s, conversation turns, the shared
//! [`error::Error`] taxonomy, structured trace events, and the full
//! configuration tree.

pub mod config;
pub mod conversation;
pub mod error;
pub mod project;
pub mod retrieval;
pub mod text;
pub mod trace;
