//! Flows module - Commands that combine several passes
//!
//! Provides:
//! - lint: Scan, extract, validate fences and resolve links into one Report

pub mod lint;
