//! Shared types and computations for the bakery inventory platform
//!
//! This crate contains the records, derived-inventory arithmetic and reorder
//! planning shared between the backend and the browser front end (via WASM).

pub mod cash;
pub mod derived;
pub mod models;
pub mod reorder;
pub mod session;
pub mod summary;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
