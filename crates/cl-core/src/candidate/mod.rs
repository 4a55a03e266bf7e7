//! Candidate pipeline
//!
//! Aggregates comment authors into candidates and resolves their relation
//! with the viewing account.

pub mod aggregator;
pub mod enricher;

pub use aggregator::{
    fetch_candidates, fetch_candidates_with_progress, AggregationProgress, CandidateAggregator,
};
pub use enricher::{
    enrich_relations, map_relation, request_relation, EnrichmentReport, RelationEnricher,
};
