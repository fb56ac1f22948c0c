//! Common types shared by the rpcd crates.
//!
//! This crate provides:
//! - The bus status taxonomy returned to callers
//! - The unified error type and its OS-error mapping

pub mod error;

pub use error::{Error, Result, Status};
