//! Address-based apartment price lookups against R-TECH, plus the Korean
//! price notation parser the scraper relies on.

pub mod config;
pub mod models;
pub mod money;
pub mod scrapers;
pub mod server;

pub use money::{normalize_amount, parse_amount, parse_bare_manwon_amount, parse_marked_amount};
