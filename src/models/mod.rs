//! Data models for the mail client.
//!
//! This module contains the message types:
//!
//! - `GmailMessage` and friends: the raw proxied Gmail API shapes
//! - `MailItem`: the derived message-list row
//! - `MessageDetail`: the flattened single-message response

pub mod message;

pub use message::{GmailMessage, MailItem, MessageDetail, MessagesResponse};
