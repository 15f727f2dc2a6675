//! `ap-kb`: knowledge-base client crate for archplan.
//!
//! Provides the [`KnowledgeSource`] trait that abstracts over the
//! knowledge-base query service, a production REST implementation
//! ([`RestKbClient`]), and the wire DTOs for `POST /query/{profile}`.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use ap_domain::config::KbConfig;
//! use ap_kb::{KbQueryRequest, KnowledgeSource, RestKbClient};
//!
//! # async fn example() -> ap_domain::error::Result<()> {
//! let client = RestKbClient::new(&KbConfig::default())?;
//!
//! let resp = client
//!     .query(KbQueryRequest::new("zone-redundant storage options", "chat"))
//!     .await?;
//!
//! println!("{} sources", resp.sources.len());
//! # Ok(())
//! # }
//! ```

pub mod provider;
pub mod rest;
pub mod types;

pub use provider::KnowledgeSource;
pub use rest::RestKbClient;
pub use types::{KbQueryRequest, KbQueryResponse};
