//! HTTP client module for the mayl mail gateway.
//!
//! This module provides the `ApiClient` for talking to the backend that
//! proxies the Gmail API, and the `ApiError` classification it reports.
//!
//! Protected endpoints use bearer token authentication; the token is
//! obtained through the backend's OAuth redirect flow and managed by
//! `crate::auth::SessionManager`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
