//! Library components for the herdmap CLI.

pub mod config;
pub mod logging;
pub mod pipeline;
