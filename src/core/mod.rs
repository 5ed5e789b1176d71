//! Core modules for the chatwarden moderation backend.
//!
//! The decision engine and the shared primitives it builds on (store handle,
//! brokered SQLite access, schema, typed config, time helpers) live here.

pub mod broker;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod schemas;
pub mod store;
pub mod time;
