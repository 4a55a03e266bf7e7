//! Stored draw results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LotteryError, Result};
use crate::types::{Candidate, CommentQuery, DrawId, FilterCriteria, ProtocolVersion};

/// A completed draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub id: DrawId,
    pub created_at: DateTime<Utc>,
    pub query: CommentQuery,
    #[serde(default)]
    pub criteria: FilterCriteria,
    /// Distinct commenters found
    pub candidate_count: usize,
    /// Candidates that passed the filter
    pub matched_count: usize,
    pub requested_winners: usize,
    pub winners: Vec<Candidate>,
}

impl DrawRecord {
    /// Record a draw made now
    pub fn new(
        query: CommentQuery,
        criteria: FilterCriteria,
        candidate_count: usize,
        matched_count: usize,
        requested_winners: usize,
        winners: Vec<Candidate>,
    ) -> Self {
        Self {
            id: DrawId::generate(),
            created_at: Utc::now(),
            query,
            criteria,
            candidate_count,
            matched_count,
            requested_winners,
            winners,
        }
    }

    pub fn info(&self) -> DrawInfo {
        DrawInfo::from(self)
    }
}

/// Summary of a stored draw, for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawInfo {
    pub id: DrawId,
    pub created_at: DateTime<Utc>,
    pub oid: String,
    pub kind: String,
    pub candidate_count: usize,
    pub matched_count: usize,
    pub winner_count: usize,
}

impl From<&DrawRecord> for DrawInfo {
    fn from(record: &DrawRecord) -> Self {
        Self {
            id: record.id.clone(),
            created_at: record.created_at,
            oid: record.query.oid.clone(),
            kind: record.query.kind.clone(),
            candidate_count: record.candidate_count,
            matched_count: record.matched_count,
            winner_count: record.winners.len(),
        }
    }
}

/// On-disk envelope of a draw record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawFile {
    pub schema_version: String,
    pub draw: DrawRecord,
}

impl DrawFile {
    pub const CURRENT_VERSION: ProtocolVersion = ProtocolVersion::V1_0;

    pub fn new(draw: DrawRecord) -> Self {
        Self {
            schema_version: Self::CURRENT_VERSION.to_string(),
            draw,
        }
    }

    /// Unwrap the record, rejecting unknown or incompatible schema versions
    pub fn into_record(self) -> Result<DrawRecord> {
        let version = ProtocolVersion::parse(&self.schema_version).ok_or_else(|| {
            LotteryError::Validation(format!("Invalid schema version: {}", self.schema_version))
        })?;
        if !version.is_compatible(&Self::CURRENT_VERSION) {
            return Err(LotteryError::Validation(format!(
                "Unsupported schema version {} (expected {})",
                version,
                Self::CURRENT_VERSION
            )));
        }
        Ok(self.draw)
    }
}
