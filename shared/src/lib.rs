//! Shared types and models for the Sommelier analytics platform
//!
//! This crate contains the wire types, form inputs and validation rules
//! shared by the API client and the browser bindings (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
