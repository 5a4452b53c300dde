//! Line protocol
//!
//! This module turns newline-delimited request bodies into store mutations
//! and renders store content as a response body.

pub mod command;
pub mod line;

pub use command::{Mutation, apply_body, render};
