//! Media catalog: answers "what videos exist" against the media directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::ApiError;

/// File extensions served as playable video, matched ASCII-case-insensitively.
const ALLOWED_EXTENSIONS: [&str; 7] = ["avi", "m4v", "mkv", "mov", "mp4", "ogv", "webm"];

/// Abstraction over the media catalog backing `videoList` replies.
///
/// Backed by a directory scan in production and stubbed in tests.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Every playable file under the media root, as sorted root-relative paths.
    async fn list(&self) -> Result<Vec<String>, ApiError>;
}

/// Filesystem-backed catalog rooted at the configured media directory.
pub struct FsCatalog {
    root: PathBuf,
}

impl FsCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl VideoCatalog for FsCatalog {
    async fn list(&self) -> Result<Vec<String>, ApiError> {
        let root = self.root.clone();
        // Blocking fs traversal; keep it off the relay threads.
        let videos = tokio::task::spawn_blocking(move || scan(&root)).await??;
        Ok(videos)
    }
}

fn scan(root: &Path) -> io::Result<Vec<String>> {
    let mut found = Vec::new();
    walk(root, root, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(root: &Path, dir: &Path, found: &mut Vec<String>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            walk(root, &path, found)?;
        } else if is_playable(&path) {
            if let Ok(rel) = path.strip_prefix(root) {
                let rel = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                found.push(rel);
            }
        }
    }
    Ok(())
}

fn is_playable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
