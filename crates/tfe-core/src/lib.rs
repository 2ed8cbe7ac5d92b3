//! # tfe-core
//!
//! Core types and utilities for working with the Terraform Enterprise API.
//!
//! This crate provides the shared error type, configuration, JSON:API encoding
//! and the HTTP transport used by the resource client crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status code mapping
//! - [`id`] - Resource identifier validation and typed wrappers
//! - [`jsonapi`] - JSON:API documents and the schema-driven encoder/decoder
//! - [`query`] - Query parameter and pagination encoding
//! - [`config`] - Configuration structures for TFE clients
//! - [`client`] - HTTP client settings
//! - [`transport`] - The `Transport` trait and its reqwest implementation

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod id;
pub mod jsonapi;
pub mod query;
pub mod transport;

// Re-export commonly used types
pub use error::{Error, Result};
pub use transport::{ApiRequest, HttpTransport, Transport};
