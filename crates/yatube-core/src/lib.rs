//! # Yatube Core
//!
//! The domain layer of Yatube: posts, groups and the authors referencing them.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;

pub use error::DomainError;
