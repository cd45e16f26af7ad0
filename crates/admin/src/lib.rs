//! Pantry back-office library.
//!
//! Reorder decisions for master lists and the approval workflow for
//! submitted lists, on top of the back-office REST API.
//!
//! # Layout
//!
//! - [`api`] - API seam traits, HTTP client and in-memory back-office
//! - [`models`] - Wire and domain models, lifecycle rules
//! - [`services`] - [`ReplenishmentEngine`](services::ReplenishmentEngine) and
//!   [`SubmissionWorkflow`](services::SubmissionWorkflow)
//! - [`config`] - Environment configuration
//! - [`error`] - Service error type

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
