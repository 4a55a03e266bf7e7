//! cl-storage - Storage library for comment-lottery
//!
//! This crate provides file-system storage for the configuration file and
//! the draw history.

mod atomic;
mod config_store;
mod draw_store;

pub use config_store::ConfigStore;
pub use draw_store::FileSystemStorage;

use std::path::PathBuf;

/// Per-user directories, falling back to `~/.comment-lottery` when the
/// platform has no standard location
pub(crate) fn project_dir(pick: fn(&directories::ProjectDirs) -> PathBuf) -> PathBuf {
    directories::ProjectDirs::from("com", "comment-lottery", "comment-lottery")
        .map(|dirs| pick(&dirs))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".comment-lottery")
        })
}
