//! # IRC Stage Library
//!
//! This library exposes the IRC stage service modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod config;

// Re-export irc_stage_core for convenience
pub use irc_stage_core;
