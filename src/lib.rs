//! Client-side sync engine for a remote PDF collection.
//!
//! [`docs::Desk`] holds the optimistic local view; field edits flow through
//! [`sync::debounce`], every other remote call through a
//! [`sync::lifecycle::Lifecycle`]. [`client::HttpApi`] talks to the REST
//! service.

pub mod client;
pub mod commands;
pub mod docs;
pub mod error;
pub mod state;
pub mod sync;

pub use client::HttpApi;
pub use docs::{Desk, DeskEvent, RequestKind};
pub use error::ApiError;
pub use state::{DeskConfig, SyncConfig};
