// src/lib.rs

#[macro_use]
pub mod macros;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod specs;
pub mod value;

pub mod csv;
pub mod logging;
pub mod progress;
pub mod publish;
pub mod scrape;
pub mod store;
