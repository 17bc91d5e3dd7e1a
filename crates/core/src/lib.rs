//! QuickMeds Core - Shared types library.
//!
//! This crate provides common types used across all QuickMeds components:
//! - `server` - REST backend for the medicine catalog and orders
//! - `cart` - Client-side cart, forms, and search library
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and statuses,
//!   plus the order-creation wire types shared between cart and server

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
