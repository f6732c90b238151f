//! On-disk feed cache.
//!
//! [`FeedCache`] is the fast, possibly stale side of a refresh.  It keeps the
//! last successfully fetched items as a JSON array in a single file.  A
//! missing, unreadable, or unparsable file is simply an error from
//! [`load`](FeedCache::load), which the coordinator treats as a cache miss.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::source::FeedItem;

/// JSON file holding the most recent successful fetch of one feed.
#[derive(Debug, Clone)]
pub struct FeedCache {
    path: PathBuf,
}

impl FeedCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached items.
    pub async fn load(&self) -> Result<Vec<FeedItem>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", self.path.display()))
    }

    /// Replace the cached items.
    ///
    /// Each call writes its own uniquely named temp file next to the cache
    /// file and renames it into place, so overlapping stores never share a
    /// temp file and a concurrent [`load`](Self::load) sees either the old or
    /// a complete new list.
    pub async fn store(&self, items: &[FeedItem]) -> Result<()> {
        let json = serde_json::to_vec(items).context("serializing feed items")?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &json))
            .await
            .context("cache write task failed")?
    }
}

fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(contents)
        .with_context(|| format!("writing {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Default cache file for a feed URL: `<cache dir>/freshfeed/<sanitized url>.json`.
///
/// Returns `None` when the platform has no cache directory.
pub fn default_cache_path(url: &str) -> Option<PathBuf> {
    let name: String = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect();
    dirs::cache_dir().map(|dir| dir.join("freshfeed").join(format!("{name}.json")))
}
