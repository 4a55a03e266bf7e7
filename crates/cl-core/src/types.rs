//! Core type definitions for comment-lottery

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Follower relationship between the viewing account and a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// No relationship
    #[default]
    None,
    /// The viewer follows the candidate
    Follow,
    /// The candidate follows the viewer
    Fan,
    /// Both follow each other
    Mutual,
}

impl Relation {
    /// All relations, in prompt order
    pub const ALL: [Relation; 4] = [
        Relation::None,
        Relation::Follow,
        Relation::Fan,
        Relation::Mutual,
    ];

    /// Whether a candidate with relation `self` satisfies a request for `requested`.
    ///
    /// `mutual` counts as both `follow` and `fan`; the reverse does not hold.
    pub fn satisfies(self, requested: Relation) -> bool {
        match requested {
            Relation::None => self == Relation::None,
            Relation::Follow => matches!(self, Relation::Follow | Relation::Mutual),
            Relation::Fan => matches!(self, Relation::Fan | Relation::Mutual),
            Relation::Mutual => self == Relation::Mutual,
        }
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::None => "none",
            Relation::Follow => "follow",
            Relation::Fan => "fan",
            Relation::Mutual => "mutual",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relation {
    type Err = crate::LotteryError;

    /// Accepts names or the numeric prompt aliases `0..=3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "none" => Ok(Relation::None),
            "1" | "follow" => Ok(Relation::Follow),
            "2" | "fan" => Ok(Relation::Fan),
            "3" | "mutual" => Ok(Relation::Mutual),
            other => Err(crate::LotteryError::Validation(format!(
                "Unknown relation '{}', expected none|follow|fan|mutual or 0-3",
                other
            ))),
        }
    }
}

/// A deduplicated comment author eligible for the draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// User id, unique per run
    pub uid: String,
    /// Most recently seen display name
    pub display_name: String,
    /// Most recently seen avatar URL
    pub avatar_url: String,
    /// Relationship with the viewer
    #[serde(default)]
    pub relation: Relation,
    /// The viewer liked at least one of this user's comments
    pub liked_by_self: bool,
    /// The post owner liked at least one of this user's comments
    pub liked_by_up: bool,
}

impl Candidate {
    /// Create a candidate with no relation and no likes
    pub fn new(
        uid: impl Into<String>,
        display_name: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            display_name: display_name.into(),
            avatar_url: avatar_url.into(),
            relation: Relation::None,
            liked_by_self: false,
            liked_by_up: false,
        }
    }

    /// Set the relation
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = relation;
        self
    }
}

/// Operator-chosen criteria for the draw
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Accepted relations; empty means unconstrained
    pub relations: BTreeSet<Relation>,
    /// Only keep candidates the viewer liked
    pub require_liked_by_self: bool,
    /// Only keep candidates the post owner liked
    pub require_liked_by_up: bool,
}

impl FilterCriteria {
    /// Criteria that match everyone
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept an additional relation
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.insert(relation);
        self
    }

    /// Require a like from the viewer
    pub fn liked_by_self(mut self) -> Self {
        self.require_liked_by_self = true;
        self
    }

    /// Require a like from the post owner
    pub fn liked_by_up(mut self) -> Self {
        self.require_liked_by_up = true;
        self
    }

    /// Whether relation data is needed to evaluate these criteria
    pub fn needs_relations(&self) -> bool {
        !self.relations.is_empty()
    }

    /// Short human-readable summary
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.relations.is_empty() {
            parts.push("any relation".to_string());
        } else {
            let names: Vec<_> = self.relations.iter().map(|r| r.as_str()).collect();
            parts.push(format!("relation in [{}]", names.join(", ")));
        }
        if self.require_liked_by_up {
            parts.push("liked by UP".to_string());
        }
        if self.require_liked_by_self {
            parts.push("liked by me".to_string());
        }
        parts.join(", ")
    }
}

/// Comment listing to draw from: (post id, post type, sort mode)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentQuery {
    /// Post id (`oid`)
    pub oid: String,
    /// Post type (`type`)
    pub kind: String,
    /// Sort mode (`mode`): 0/3 hot only, 1 hot + time, 2 time only
    pub mode: String,
}

impl CommentQuery {
    /// Default sort mode (time order)
    pub const DEFAULT_MODE: &'static str = "2";

    /// Create a query with the default sort mode
    pub fn new(oid: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            kind: kind.into(),
            mode: Self::DEFAULT_MODE.to_string(),
        }
    }

    /// Override the sort mode
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }
}

impl fmt::Display for CommentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "oid={} type={} mode={}", self.oid, self.kind, self.mode)
    }
}

/// Unique identifier for a stored draw
/// Format: YYYYMMDDHHMMSS-<short_uuid>
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawId(pub String);

impl DrawId {
    /// Generate a new DrawId
    pub fn generate() -> Self {
        let now = chrono::Utc::now();
        let uuid = Uuid::new_v4();
        let short_uuid = &uuid.to_string()[..8];
        DrawId(format!("{}-{}", now.format("%Y%m%d%H%M%S"), short_uuid))
    }

    /// Create from a string with validation
    pub fn from_string(s: impl Into<String>) -> crate::Result<Self> {
        let s = s.into();
        if Self::validate(&s) {
            Ok(DrawId(s))
        } else {
            Err(crate::LotteryError::Validation(format!(
                "Invalid draw ID format: {}",
                s
            )))
        }
    }

    fn validate(s: &str) -> bool {
        let Some((stamp, suffix)) = s.split_once('-') else {
            return false;
        };
        stamp.len() == 14
            && stamp.chars().all(|c| c.is_ascii_digit())
            && suffix.len() == 8
            && suffix.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DrawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Schema version for stored files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
}

impl ProtocolVersion {
    pub const V1_0: Self = Self { major: 1, minor: 0 };

    /// Parse "major.minor"
    pub fn parse(s: &str) -> Option<Self> {
        let (major, minor) = s.split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }

    /// Check if this version is compatible with another version
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.major == other.major
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
