//! Adapters implementing the domain ports against concrete backends.

pub mod insights;
pub mod notify;
pub mod sqlite;
