//! Pantry Core - Shared types library.
//!
//! This crate provides common types used across all Pantry components:
//! - `admin` - Replenishment and submission-approval services
//! - `cli` - Command-line front end for back-office operators
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, quantities, item references and statuses
//! - [`text`] - Accent-insensitive matching and ordering of names

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod text;
pub mod types;

pub use types::*;
