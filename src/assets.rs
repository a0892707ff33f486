//! Asset size lookup for attachments.
//!
//! Attachment rows store only a URL; the byte size lives wherever the
//! uploaded files actually are. That lookup sits behind [`AssetStore`] so
//! the aggregator never touches the filesystem directly, and a failed
//! lookup resolves to "size unknown" rather than an error.

use std::path::PathBuf;

/// Resolves the byte size of an uploaded asset.
pub trait AssetStore: Send + Sync {
    /// Size of the asset at a store-relative path, or `None` when the asset
    /// cannot be found.
    fn size_of(&self, path: &str) -> Option<u64>;
}

/// Filesystem-backed store rooted at the uploads directory.
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetStore for FsAssetStore {
    fn size_of(&self, path: &str) -> Option<u64> {
        let relative = path.trim_start_matches('/');
        std::fs::metadata(self.root.join(relative))
            .ok()
            .map(|meta| meta.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn resolves_existing_file_size() {
        let dir = std::env::temp_dir().join(format!("raccolta-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("report.pdf"), b"12345").unwrap();

        let store = FsAssetStore::new(&dir);
        assert_eq!(store.size_of("/report.pdf"), Some(5));
        assert_eq!(store.size_of("report.pdf"), Some(5));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_resolves_to_none() {
        let store = FsAssetStore::new("/nonexistent-root");
        assert_eq!(store.size_of("/2012/03/missing.zip"), None);
    }
}
