//! Core types shared across the paper-lantern crates.
//!
//! Holds the rootcause-backed `Result` alias and the identifiers that
//! thread through request handling and logs.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::RequestId;
