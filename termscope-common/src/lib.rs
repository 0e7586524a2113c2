//! # termscope Common Library
//!
//! Shared code for the termscope service crates:
//! - Error and result types
//! - Configuration loading (TOML file + environment)
//! - Domain types for analysis findings and conversation turns

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{AnalysisResult, Category, ExtractionTier, Finding, Flag, Role, Turn};
