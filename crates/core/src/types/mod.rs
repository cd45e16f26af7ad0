//! Core types for Pantry.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod item_ref;
pub mod quantity;
pub mod status;

pub use id::*;
pub use item_ref::{ItemRef, ItemRefError};
pub use quantity::{Quantity, QuantityError};
pub use status::*;
