//! Backends module - File system access
//!
//! Provides:
//! - scan: Markdown discovery and path inventory with the ignore crate
//! - workspace: Reading and parsing every discovered document
//! - extract: Block dump for a single file

pub mod extract;
pub mod scan;
pub mod workspace;
