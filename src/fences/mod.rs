//! Fences module - Sanity checks for fenced code blocks
//!
//! Provides:
//! - balance: string/comment aware bracket matching per language
//! - validate: language tag, emptiness and balance findings for one fence

pub mod balance;
pub mod validate;
