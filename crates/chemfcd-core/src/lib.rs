//! ChemFCD Core - error types shared across the ChemFCD crates
//!
//! This crate provides the foundational error and result types used across
//! all ChemFCD crates.

pub mod error;

pub use error::{Error, Result};
