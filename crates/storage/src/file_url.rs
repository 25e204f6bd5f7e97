use crate::error::{StorageError, StorageResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use url::Url;

/// Locator for a stored guide binary.
///
/// A URL that points at a decoded temporary copy owns that copy: revoking or
/// dropping it removes the file. URLs into a granted directory own nothing.
#[derive(Debug)]
pub struct GuideFileUrl {
    url: Url,
    path: PathBuf,
    transient: Option<TempPath>,
}

impl GuideFileUrl {
    /// URL for a file that outlives this handle.
    pub fn for_path(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let url = Url::from_file_path(&path).map_err(|()| StorageError::InvalidUrl(path.clone()))?;
        Ok(Self { url, path, transient: None })
    }

    /// Write `bytes` to a fresh temporary file and point at it.
    pub fn temporary(bytes: &[u8], suffix: &str) -> StorageResult<Self> {
        let mut file = tempfile::Builder::new().prefix("guidelens-").suffix(suffix).tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        let temp_path = file.into_temp_path();
        let path = temp_path.to_path_buf();
        let url = Url::from_file_path(&path).map_err(|()| StorageError::InvalidUrl(path.clone()))?;
        Ok(Self { url, path, transient: Some(temp_path) })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the file is a temporary copy.
    pub fn is_transient(&self) -> bool {
        self.transient.is_some()
    }

    /// Release the URL, deleting the temporary copy if there is one.
    pub fn revoke(mut self) -> StorageResult<()> {
        match self.transient.take() {
            Some(temp_path) => Ok(temp_path.close()?),
            None => Ok(()),
        }
    }
}

impl std::fmt::Display for GuideFileUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.url.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporary_url_is_removed_on_revoke() {
        let url = GuideFileUrl::temporary(b"%PDF", ".pdf").expect("temp url should be created");
        let path = url.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(url.url().scheme(), "file");
        assert!(url.is_transient());

        url.revoke().expect("revoke should succeed");
        assert!(!path.exists());
    }

    #[test]
    fn temporary_url_is_removed_on_drop() {
        let url = GuideFileUrl::temporary(b"bytes", ".bin").expect("temp url should be created");
        let path = url.path().to_path_buf();
        drop(url);
        assert!(!path.exists());
    }

    #[test]
    fn path_url_leaves_file_alone() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let file = temp.path().join("guide.bin");
        std::fs::write(&file, b"x").expect("write should succeed");

        let url = GuideFileUrl::for_path(&file).expect("url should be created");
        assert!(!url.is_transient());
        url.revoke().expect("revoke should succeed");
        assert!(file.exists());
    }
}
