use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs;

use crate::config::CACHE_EXTENSION;
use crate::core::error::CacheError;
use crate::{log_debug, log_warn};

// Distinguishes temp files of concurrent writers within one process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One file per key under a cache directory: `<dir>/<key>.dat`.
///
/// Entries are never expired. Writes go to a temp file that is renamed over
/// the entry, so readers see either the old or the new content in full.
/// Concurrent writers for the same key leave whichever renamed last.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", key, CACHE_EXTENSION)))
    }

    /// Read an entry. A missing file is `Ok(None)`; a file that exists but
    /// cannot be read is an error.
    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key)?;

        // Anything that cannot be stat'ed counts as a miss
        if fs::metadata(&path).await.is_err() {
            return Ok(None);
        }

        match fs::read_to_string(&path).await {
            Ok(content) => {
                log_debug!("Cache hit: {}", path.display());
                Ok(Some(content))
            }
            // Removed between the existence check and the read
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Write an entry, creating the cache directory when needed.
    pub async fn put(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        let temp_path = self.dir.join(format!(
            "{}.{}.{}-{}.tmp",
            key,
            CACHE_EXTENSION,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let write_error = |source: std::io::Error| CacheError::Write {
            path: path.display().to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).await.map_err(write_error)?;
        fs::write(&temp_path, value).await.map_err(write_error)?;

        if let Err(e) = fs::rename(&temp_path, &path).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                log_warn!("Failed to remove {}: {}", temp_path.display(), cleanup);
            }
            return Err(write_error(e));
        }

        log_debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        assert!(cache.get("AS13335").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_creates_directory_and_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("nested").join("cache"));

        cache.put("AS13335", "1.1.1.0 - 1.1.1.255 , 000 , AS13335\n").await.unwrap();
        let stored = std::fs::read_to_string(cache.dir().join("AS13335.dat")).unwrap();
        assert_eq!(stored, "1.1.1.0 - 1.1.1.255 , 000 , AS13335\n");
        assert_eq!(cache.get("AS13335").await.unwrap().as_deref(), Some(stored.as_str()));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        cache.put("AS1", "old\n").await.unwrap();
        cache.put("AS1", "").await.unwrap();
        assert_eq!(cache.get("AS1").await.unwrap().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_put_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        cache.put("AS13335", "1.1.1.0 - 1.1.1.255 , 000 , AS13335\n").await.unwrap();
        cache.put("AS13335", "1.0.0.0 - 1.0.0.255 , 000 , AS13335\n").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["AS13335.dat"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_readers_never_see_partial_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let old = "1.1.1.0 - 1.1.1.255 , 000 , AS13335\n".repeat(2000);
        let new = "1.0.0.0 - 1.0.0.255 , 000 , AS13335\n".repeat(4000);
        cache.put("AS13335", &old).await.unwrap();

        let writer = {
            let cache = cache.clone();
            let new = new.clone();
            tokio::spawn(async move {
                for _ in 0..20 {
                    cache.put("AS13335", &new).await.unwrap();
                }
            })
        };

        while !writer.is_finished() {
            let seen = cache.get("AS13335").await.unwrap().unwrap();
            assert!(seen == old || seen == new, "partial entry of {} bytes", seen.len());
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();
        assert_eq!(cache.get("AS13335").await.unwrap(), Some(new));
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        // A directory where the file should be exists but cannot be read
        std::fs::create_dir(dir.path().join("AS13335.dat")).unwrap();

        let err = cache.get("AS13335").await.unwrap_err();
        assert!(matches!(err, CacheError::Read { .. }));
    }

    #[tokio::test]
    async fn test_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        for key in ["", "..", "../AS1", "a/b", "a\\b"] {
            assert!(matches!(cache.get(key).await, Err(CacheError::InvalidKey(_))));
            assert!(matches!(cache.put(key, "x").await, Err(CacheError::InvalidKey(_))));
        }
    }
}
