//! Variables client and data models for Terraform Enterprise.
//!
//! Provides typed structures and an asynchronous client for managing
//! workspace variables through the `vars` endpoints of the TFE API.

#![deny(missing_docs)]

pub mod client;
pub mod models;

pub use client::VariablesClient;
pub use models::{
    CategoryType, Variable, VariableCreateOptions, VariableList, VariableListOptions,
    VariableUpdateOptions, Workspace,
};

/// Convenient result alias that reuses the shared TFE error type.
pub type Result<T> = tfe_core::Result<T>;
