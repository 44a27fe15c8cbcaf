#![deny(unsafe_code)]

//! Reference data for herd column mapping.
//!
//! - the bundled canonical registry ([`load_default_registry`])
//! - the bundled alias reference table ([`load_default_aliases`])
//! - loaders for custom registries and user legend banks

mod aliases;
mod csv_utils;
pub mod error;
mod registry;

pub use aliases::{load_default_aliases, load_legend_bank, parse_alias_table};
pub use error::{Result, StandardsError};
pub use registry::{load_default_registry, load_registry, parse_registry};
