//! PRSentry GitHub infrastructure adapter.
//!
//! Two responsibilities:
//!
//! - [`payload`] — decoding delivered `pull_request` webhook payloads (from
//!   raw JSON or an event file) into the domain [`pipeline::TriggerEvent`].
//! - [`client`] — a REST client implementing [`pipeline::PullRequestHost`]
//!   over the platform's v3 API.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. All API
//! details (endpoint layout, authentication, pagination) are handled here;
//! the [`pipeline`] crate never sees them.

pub mod client;
pub mod payload;

pub use client::{GithubClient, DEFAULT_API_URL};
pub use payload::PullRequestEventPayload;
