//! Itadaki Core - Shared types library.
//!
//! This crate provides common types used across all Itadaki components:
//! - `web` - Public job listings and internal admin panel
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email addresses, status enums, permissions, and
//!   the Domino sync settings contract

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
