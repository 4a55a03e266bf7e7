//! Draw history storage trait

use super::record::{DrawInfo, DrawRecord};
use crate::error::Result;
use crate::types::DrawId;

/// Trait for draw history implementations
pub trait DrawStorage: Send + Sync {
    /// Save a draw
    fn save(&self, record: &DrawRecord) -> Result<()>;

    /// Load a draw by ID
    fn load(&self, id: &DrawId) -> Result<DrawRecord>;

    /// List all stored draws, newest first
    fn list(&self) -> Result<Vec<DrawInfo>>;

    /// Delete a draw
    fn delete(&self, id: &DrawId) -> Result<()>;

    /// Check if a draw exists
    fn exists(&self, id: &DrawId) -> bool;

    /// The most recent draw (by created_at)
    fn latest(&self) -> Result<Option<DrawRecord>> {
        let Some(latest) = self.list()?.into_iter().max_by_key(|d| d.created_at) else {
            return Ok(None);
        };
        self.load(&latest.id).map(Some)
    }
}
