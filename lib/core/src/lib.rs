//! Core domain types and utilities for the line-bridge service.
//!
//! This crate provides the foundational ID types and the shared error
//! handling alias used by the rest of the workspace.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, UserId};
