//! paper-lantern HTTP server.
//!
//! Accepts prompts over JSON, asks the configured LLM providers in
//! priority order, and returns the answer either as JSON or as a
//! watermarked PDF.

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
