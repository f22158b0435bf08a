// core/mod.rs

//! # Core Module
//!
//! Configuration handling, environment overrides and the text helpers used
//! across the application.

pub mod config;
pub mod env;
pub mod utils;
