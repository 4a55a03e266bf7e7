//! Temp-file-then-rename writes

use cl_core::error::{LotteryError, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Owner read/write only
#[cfg(unix)]
const PRIVATE_MODE: u32 = 0o600;

fn create(path: &Path, private: bool) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if private {
            options.mode(PRIVATE_MODE);
        }
    }
    #[cfg(not(unix))]
    let _ = private;
    options.open(path)
}

/// Write `target` through `temp`, renaming once `write` succeeds.
///
/// The temp file is removed on every failure path. With `private` the file is
/// created owner-only on Unix.
pub(crate) fn write_atomic<F>(target: &Path, temp: &Path, private: bool, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> Result<()>,
{
    let file = create(temp, private).map_err(|e| {
        LotteryError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create temp file: {}", e),
        ))
    })?;

    let written = (|| {
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        fs::rename(temp, target).map_err(|e| {
            LotteryError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file: {}", e),
            ))
        })
    })();

    if written.is_err() {
        let _ = fs::remove_file(temp);
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_and_renames() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.json");
        let temp = dir.path().join(".out.json.tmp");

        write_atomic(&target, &temp, false, |w| {
            w.write_all(b"{}")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "{}");
        assert!(!temp.exists());
    }

    #[test]
    fn test_failed_write_removes_temp() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.json");
        let temp = dir.path().join(".out.json.tmp");

        let result = write_atomic(&target, &temp, false, |w| {
            w.write_all(b"partial")?;
            Err(LotteryError::Validation("serializer gave up".to_string()))
        });

        assert!(matches!(result, Err(LotteryError::Validation(_))));
        assert!(!temp.exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_failed_rename_removes_temp() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("child"), "x").unwrap();
        let temp = dir.path().join(".occupied.tmp");

        let result = write_atomic(&target, &temp, false, |w| {
            w.write_all(b"{}")?;
            Ok(())
        });

        assert!(matches!(result, Err(LotteryError::Io(_))));
        assert!(!temp.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_private_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("secret.toml");
        let temp = dir.path().join(".secret.toml.tmp");

        write_atomic(&target, &temp, true, |w| {
            w.write_all(b"cookie = \"x\"")?;
            Ok(())
        })
        .unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, PRIVATE_MODE);
    }
}
