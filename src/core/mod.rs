//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Unified finding model (Finding, Report)
//! - Rendering functions for the text and JSON outputs
//! - Fatal error type
//! - Path normalization utilities
//! - File reading

pub mod error;
pub mod file_reader;
pub mod model;
pub mod paths;
pub mod render;
