//! line-bridge web server.
//!
//! Routes the LINE Login OAuth flow and the Messaging API webhook to the
//! Postgres-backed user store.

pub mod auth;
pub mod config;
pub mod pages;
pub mod webhook;
