//! QuickMeds server library.
//!
//! The binary in `main.rs` wires these modules together; they are exposed as
//! a library so in-process API tests can build the router against the
//! in-memory store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod validation;
