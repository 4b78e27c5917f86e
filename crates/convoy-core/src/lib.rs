//! Core types and trait definitions for the convoy field log.
//!
//! This crate is deliberately free of database, HTTP, and terminal
//! dependencies. The storage backend and the command-line front end both
//! depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod error;
pub mod obstacle;
pub mod provider;
pub mod sample;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
