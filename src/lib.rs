pub mod alerts;
pub mod api;
pub mod audit;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod scheduler;
pub mod telegram;
pub mod web;

pub use error::{Error, Result};

// Declare tests module only when testing
#[cfg(test)]
pub mod tests;
