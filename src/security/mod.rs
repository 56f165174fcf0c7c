//! Security utilities.
//!
//! This module provides the redaction policy applied to container metadata
//! before it reaches the archive.

pub mod redactor;

pub use redactor::{mask_variable, Redactor};
