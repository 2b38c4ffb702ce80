//! Core domain types: configuration and the error taxonomy.

pub mod config;
pub mod error;

pub use config::WatchdogConfig;
pub use error::{Result, WatchdogError};
