//! Screen-specific rendering: the sign-in view and the mail shell.

pub mod login;
pub mod mail;
