//! HTTP gateway between a browser UI and signal-cli-rest-api.
//!
//! - [`web`]: the JSON API (validation, forwarding, reshaping, error translation)
//! - [`signal`]: the provider seam, with an HTTP client and an in-memory demo stub
//! - [`cli`]: argument parsing and the invokers that call a running gateway

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod signal;
pub mod web;

pub use config::Config;
pub use error::{Error, Result};
