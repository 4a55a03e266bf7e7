//! cl-core - Core library for comment-lottery
//!
//! This crate provides the candidate pipeline for a comment lottery: request
//! signing, paginated comment fetching, candidate aggregation and relation
//! enrichment, filtering, and unbiased winner selection.

pub mod error;
pub mod types;
pub mod config;
pub mod clock;
pub mod signing;
pub mod api;
pub mod comment;
pub mod candidate;
pub mod filter;
pub mod draw;

pub use error::{LotteryError, Result};
pub use types::*;

pub use candidate::{enrich_relations, fetch_candidates};
pub use draw::{draw, shuffle_candidates};
pub use filter::{filter_candidates, FilterSplit};
