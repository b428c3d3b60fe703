//! Infrastructure concerns: configuration loading and validation.

pub mod config;
