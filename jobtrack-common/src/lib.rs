//! # Job Tracker Common Library
//!
//! Shared code for the job tracker workspace including:
//! - Error taxonomy for fetch cycles and configuration
//! - Bootstrap configuration loading (TOML) and resolution
//! - Date normalization and due-date arithmetic

pub mod config;
pub mod dates;
pub mod error;

pub use dates::{normalize_date, DueStatus, NormalizedDate};
pub use error::{Error, Result};

/// Sentinel used for every missing, null or empty display value
pub const NOT_AVAILABLE: &str = "N/A";
