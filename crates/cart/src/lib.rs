//! QuickMeds Cart - client-side storefront library.
//!
//! The pieces a storefront front end needs besides the REST API:
//!
//! - [`cart`] - a shopping cart persisted through a pluggable
//!   [`storage::CartStorage`] backend (the local-storage analog)
//! - [`forms`] - field-level validation for checkout/contact forms
//! - [`search`] - case-insensitive catalog filtering
//!
//! Checkout does not perform any I/O itself: [`cart::Cart::checkout`]
//! produces a [`quickmeds_core::NewOrder`] ready to be posted to the
//! server's `POST /orders` endpoint by whatever HTTP client the caller
//! prefers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod forms;
pub mod search;
pub mod storage;

pub use cart::{Cart, CartError, CartItem, CartView};
pub use storage::{CartStorage, MemoryStorage};
