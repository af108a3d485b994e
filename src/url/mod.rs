//! URL handling for Caissa-Harvest
//!
//! Provides the pure in-scope filter applied to every discovered link, plus
//! host extraction and suffix matching helpers.

mod domain;
mod filter;

pub use domain::{extract_host, host_matches_suffix};
pub use filter::is_in_scope;
