//! File system storage for draw history

use cl_core::draw::{DrawFile, DrawInfo, DrawRecord, DrawStorage};
use cl_core::error::{LotteryError, Result};
use cl_core::types::DrawId;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File system based draw storage, one JSON file per draw
pub struct FileSystemStorage {
    base_dir: PathBuf,
    draws_dir: PathBuf,
}

impl FileSystemStorage {
    /// Create storage rooted at `base_dir`; draws live in `base_dir/draws`
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let draws_dir = base_dir.join("draws");

        let storage = Self {
            base_dir,
            draws_dir,
        };

        storage.ensure_dirs()?;
        Ok(storage)
    }

    /// Storage in the platform data directory
    pub fn default_location() -> Result<Self> {
        Self::new(crate::project_dir(|dirs| dirs.data_dir().to_path_buf()))
    }

    fn ensure_dirs(&self) -> Result<()> {
        if !self.draws_dir.exists() {
            fs::create_dir_all(&self.draws_dir).map_err(|e| {
                LotteryError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create draws directory: {}", e),
                ))
            })?;
            debug!("Created draws directory: {:?}", self.draws_dir);
        }
        Ok(())
    }

    fn draw_path(&self, id: &DrawId) -> PathBuf {
        self.draws_dir.join(format!("{}.json", id))
    }

    fn temp_path(&self, id: &DrawId) -> PathBuf {
        self.draws_dir.join(format!(".{}.json.tmp", id))
    }

    fn atomic_write(&self, record: &DrawRecord) -> Result<()> {
        let temp_path = self.temp_path(&record.id);
        let final_path = self.draw_path(&record.id);

        let file = DrawFile::new(record.clone());

        crate::atomic::write_atomic(&final_path, &temp_path, false, |writer| {
            serde_json::to_writer_pretty(writer, &file)?;
            Ok(())
        })?;

        debug!("Saved draw {} to {:?}", record.id, final_path);
        Ok(())
    }

    fn read_draw(&self, path: &Path) -> Result<DrawRecord> {
        let file = fs::File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                let id = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("unknown");
                LotteryError::DrawNotFound(id.to_string())
            } else {
                LotteryError::Io(e)
            }
        })?;

        let draw_file: DrawFile = serde_json::from_reader(BufReader::new(file))?;
        draw_file.into_record()
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn draws_dir(&self) -> &Path {
        &self.draws_dir
    }
}

impl DrawStorage for FileSystemStorage {
    fn save(&self, record: &DrawRecord) -> Result<()> {
        self.atomic_write(record)
    }

    fn load(&self, id: &DrawId) -> Result<DrawRecord> {
        self.read_draw(&self.draw_path(id))
    }

    fn list(&self) -> Result<Vec<DrawInfo>> {
        let mut draws = Vec::new();

        let entries = fs::read_dir(&self.draws_dir).map_err(|e| {
            LotteryError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read draws directory: {}", e),
            ))
        })?;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();

            // Skip non-json files and temp files
            if !path.extension().map(|e| e == "json").unwrap_or(false) {
                continue;
            }
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
            {
                continue;
            }

            match self.read_draw(&path) {
                Ok(record) => draws.push(record.info()),
                Err(e) => {
                    warn!("Failed to read draw file {:?}: {}", path, e);
                }
            }
        }

        draws.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(draws)
    }

    fn delete(&self, id: &DrawId) -> Result<()> {
        let path = self.draw_path(id);

        if !path.exists() {
            return Err(LotteryError::DrawNotFound(id.to_string()));
        }

        fs::remove_file(&path).map_err(|e| {
            LotteryError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to delete draw file: {}", e),
            ))
        })?;

        debug!("Deleted draw {} from {:?}", id, path);
        Ok(())
    }

    fn exists(&self, id: &DrawId) -> bool {
        self.draw_path(id).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use cl_core::types::{Candidate, CommentQuery, FilterCriteria, Relation};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_test_storage() -> (FileSystemStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(temp_dir.path()).unwrap();
        (storage, temp_dir)
    }

    fn create_test_draw(oid: &str) -> DrawRecord {
        DrawRecord::new(
            CommentQuery::new(oid, "11"),
            FilterCriteria::new().with_relation(Relation::Fan).liked_by_up(),
            12,
            5,
            1,
            vec![Candidate::new("42", "alice", "https://i0/a.jpg").with_relation(Relation::Mutual)],
        )
    }

    #[test]
    fn test_storage_creation() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.draws_dir().exists());
    }

    #[test]
    fn test_save_and_load() {
        let (storage, _temp) = create_test_storage();
        let draw = create_test_draw("123");

        storage.save(&draw).unwrap();
        assert!(storage.exists(&draw.id));
        assert_eq!(storage.load(&draw.id).unwrap(), draw);
    }

    #[test]
    fn test_load_nonexistent() {
        let (storage, _temp) = create_test_storage();
        let result = storage.load(&DrawId::generate());
        assert!(matches!(result, Err(LotteryError::DrawNotFound(_))));
    }

    #[test]
    fn test_list_newest_first() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.list().unwrap().is_empty());

        let mut older = create_test_draw("old");
        older.created_at = older.created_at - Duration::minutes(5);
        let newer = create_test_draw("new");
        storage.save(&older).unwrap();
        storage.save(&newer).unwrap();

        let list = storage.list().unwrap();
        let oids: Vec<_> = list.iter().map(|d| d.oid.as_str()).collect();
        assert_eq!(oids, vec!["new", "old"]);
        assert_eq!(list[0].winner_count, 1);
    }

    #[test]
    fn test_latest_draw() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.latest().unwrap().is_none());

        let mut older = create_test_draw("old");
        older.created_at = older.created_at - Duration::minutes(5);
        let newer = create_test_draw("new");
        storage.save(&newer).unwrap();
        storage.save(&older).unwrap();

        assert_eq!(storage.latest().unwrap().unwrap().id, newer.id);
    }

    #[test]
    fn test_delete() {
        let (storage, _temp) = create_test_storage();
        let draw = create_test_draw("1");
        storage.save(&draw).unwrap();

        storage.delete(&draw.id).unwrap();
        assert!(!storage.exists(&draw.id));
        assert!(storage.delete(&draw.id).is_err());
    }

    #[test]
    fn test_atomic_write() {
        let (storage, _temp) = create_test_storage();
        let draw = create_test_draw("1");
        storage.save(&draw).unwrap();

        assert!(!storage.temp_path(&draw.id).exists());
        let content = fs::read_to_string(storage.draw_path(&draw.id)).unwrap();
        assert!(content.contains("\"schema_version\": \"1.0\""));
        assert!(content.contains(draw.id.as_str()));
    }

    #[test]
    fn test_unsupported_schema_version() {
        let (storage, _temp) = create_test_storage();
        let draw = create_test_draw("1");
        storage.save(&draw).unwrap();

        let path = storage.draw_path(&draw.id);
        let content = fs::read_to_string(&path)
            .unwrap()
            .replace("\"schema_version\": \"1.0\"", "\"schema_version\": \"9.0\"");
        fs::write(&path, content).unwrap();

        assert!(matches!(
            storage.load(&draw.id),
            Err(LotteryError::Validation(_))
        ));
        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_ignores_temp_and_non_json_files() {
        let (storage, _temp) = create_test_storage();
        fs::write(storage.draws_dir().join(".temp.json.tmp"), "{}").unwrap();
        fs::write(storage.draws_dir().join(".hidden.json"), "{}").unwrap();
        fs::write(storage.draws_dir().join("readme.txt"), "test").unwrap();
        assert!(storage.list().unwrap().is_empty());
    }
}
