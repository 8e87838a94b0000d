//! # Voxkit Common Library
//!
//! Shared code for the voxkit sample-processing workspace:
//! - Error type and result alias
//! - Configuration loading and data-root resolution
//! - Tunable processing parameter defaults

pub mod config;
pub mod error;
pub mod params;

pub use error::{Error, Result};
