//! Request extractors and error handling shared by all handlers.

pub mod auth;
pub mod error;
