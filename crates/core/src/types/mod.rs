//! Core types for QuickMeds.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod checkout;
pub mod id;
pub mod price;
pub mod status;

pub use checkout::{LineItem, NewOrder};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::*;
