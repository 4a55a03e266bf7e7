//! Relationship lookup for candidates

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tracing::{debug, info};

use crate::api::headers::{api_headers, ApiHeaderOptions, WIDE_ACCEPT_LANGUAGE};
use crate::api::{ApiEnvelope, HttpClient, QueryParams, SignedClient};
use crate::error::Result;
use crate::types::{Candidate, Relation};

const ENDPOINT: &str = "relation lookup";
const WEB_LOCATION: &str = "333.1387";

/// Lookups in flight at once unless configured otherwise
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

/// Attribute values: 0 none, 2 following, 6 mutual, 12 blacklisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RelationAttribute {
    #[serde(default)]
    pub attribute: i64,
}

/// `data` of a relation lookup response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RelationData {
    /// Viewer towards the user
    #[serde(default)]
    pub relation: RelationAttribute,
    /// User towards the viewer
    #[serde(default)]
    pub be_relation: RelationAttribute,
}

/// First match wins: mutual, then follow, then fan
pub fn map_relation(data: &RelationData) -> Relation {
    match (data.relation.attribute, data.be_relation.attribute) {
        (6, _) => Relation::Mutual,
        (2, _) => Relation::Follow,
        (_, 2) => Relation::Fan,
        _ => Relation::None,
    }
}

/// Look up the viewer's relation with `uid`
pub async fn request_relation<C: HttpClient>(client: &SignedClient<C>, uid: &str) -> Result<Relation> {
    let params = QueryParams::new()
        .with("mid", uid)
        .with("web_location", WEB_LOCATION);
    let referer = format!("https://space.bilibili.com/{}/dynamic", uid);
    let headers = api_headers(ApiHeaderOptions {
        origin: Some("https://space.bilibili.com"),
        referer: Some(&referer),
        accept_language: Some(WIDE_ACCEPT_LANGUAGE),
    });

    let body = client
        .get_signed(&client.endpoints().relation(), &params, &headers)
        .await?;
    let data = ApiEnvelope::<RelationData>::parse(ENDPOINT, body)?.into_data()?;
    Ok(map_relation(&data))
}

/// Outcome counts of an enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub resolved: usize,
    pub failed: usize,
}

/// Resolves relations for a batch of candidates concurrently
pub struct RelationEnricher<'a, C> {
    client: &'a SignedClient<C>,
    max_concurrent: usize,
}

impl<'a, C: HttpClient> RelationEnricher<'a, C> {
    pub fn new(client: &'a SignedClient<C>) -> Self {
        Self {
            client,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Cap on lookups in flight; 0 removes the cap
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Resolve every candidate's relation.
    ///
    /// A failed lookup leaves that candidate's relation as it was. Output
    /// order matches input order.
    pub async fn enrich(&self, mut candidates: Vec<Candidate>) -> (Vec<Candidate>, EnrichmentReport) {
        let limit = match self.max_concurrent {
            0 => candidates.len().max(1),
            n => n,
        };
        info!(candidates = candidates.len(), limit, "Resolving relations");

        let client = self.client;
        let lookups: Vec<(usize, Result<Relation>)> = stream::iter(
            candidates
                .iter()
                .enumerate()
                .map(|(position, candidate)| (position, candidate.uid.clone())),
        )
        .map(|(position, uid)| async move { (position, request_relation(client, &uid).await) })
        .buffer_unordered(limit)
        .collect()
        .await;

        let mut report = EnrichmentReport::default();
        for (position, outcome) in lookups {
            let candidate = &mut candidates[position];
            match outcome {
                Ok(relation) => {
                    candidate.relation = relation;
                    report.resolved += 1;
                }
                Err(e) => {
                    debug!(uid = %candidate.uid, error = %e, "relation lookup failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            resolved = report.resolved,
            failed = report.failed,
            "Relations resolved"
        );
        (candidates, report)
    }
}

/// Resolve relations with the default concurrency cap
pub async fn enrich_relations<C: HttpClient>(
    client: &SignedClient<C>,
    candidates: Vec<Candidate>,
) -> Vec<Candidate> {
    RelationEnricher::new(client).enrich(candidates).await.0
}
