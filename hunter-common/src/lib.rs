//! Shared building blocks for the Stock Hunter screener.
//!
//! Keeps the ambient concerns (configuration, logging) out of the
//! service crate so the analysis code stays dependency-light.

#![warn(clippy::all)]

pub mod config;
pub mod logging;

pub use config::Config;
