//! Filesystem-backed image storage
//!
//! Uploaded city images are written under a single upload directory. The full
//! path of each file is what gets recorded on the city row, and the same path
//! is used later to read or remove the bytes.

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::core::error::Result;

/// Bytes read back from the store together with their inferred MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub data: Vec<u8>,
    pub content_type: &'static str,
}

/// Local directory image store
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an image uploaded together with a new city.
    ///
    /// The file is named `<unix nanos>_<original filename>`.
    pub async fn store_timestamped(&self, original_filename: &str, data: &[u8]) -> Result<String> {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let file_name = format!("{}_{}", nanos, sanitize_file_name(original_filename));
        self.write(&file_name, data).await
    }

    /// Store an image uploaded for an existing city.
    ///
    /// The file is named `<city id>_<original filename>`, so re-uploading the
    /// same filename for a city overwrites the previous bytes.
    pub async fn store_for_city(
        &self,
        city_id: i32,
        original_filename: &str,
        data: &[u8],
    ) -> Result<String> {
        let file_name = format!("{}_{}", city_id, sanitize_file_name(original_filename));
        self.write(&file_name, data).await
    }

    async fn write(&self, file_name: &str, data: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(file_name);
        tokio::fs::write(&path, data).await?;

        let path = path.to_string_lossy().into_owned();
        info!("Image stored: path={}, size={}", path, data.len());
        Ok(path)
    }

    /// Read a stored image. A missing or unreadable file is an I/O failure.
    pub async fn read(&self, path: &str) -> Result<StoredImage> {
        let data = tokio::fs::read(path).await?;
        debug!("Image read: path={}, size={}", path, data.len());

        Ok(StoredImage {
            data,
            content_type: content_type_for(path),
        })
    }

    /// Best-effort removal. Failures are logged and never propagated.
    pub async fn remove(&self, path: &str) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => info!("Image removed: path={}", path),
            Err(e) => warn!("Failed to remove image '{}': {}", path, e),
        }
    }

    /// Whether `path` points at a file directly inside the upload directory
    pub fn contains(&self, path: &str) -> bool {
        let path = Path::new(path);
        let no_traversal = path
            .components()
            .all(|c| !matches!(c, Component::ParentDir));

        no_traversal && path.parent() == Some(self.root.as_path())
    }
}

/// Infer a MIME type from the file extension
pub fn content_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Keep only the final path component of a client-supplied filename
fn sanitize_file_name(original: &str) -> String {
    // Browsers on Windows may send backslash-separated paths
    let last = original.rsplit(['/', '\\']).next().unwrap_or_default().trim();

    match last {
        "" | "." | ".." => "upload".to_string(),
        name => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("/app/uploads/1_a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("/app/uploads/1_a.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.gif"), "image/gif");
        assert_eq!(content_type_for("a.webp"), "application/octet-stream");
        assert_eq!(content_type_for("no_extension"), "application/octet-stream");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("photo.png"), "photo.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\kremlin.jpg"), "kremlin.jpg");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[tokio::test]
    async fn test_store_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("nested").join("uploads");
        let store = ImageStore::new(&root);

        let path = store.store_for_city(7, "tomsk.png", b"png").await.unwrap();

        assert_eq!(path, root.join("7_tomsk.png").to_string_lossy());
        assert_eq!(std::fs::read(&path).unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_timestamped_name_keeps_original_filename() {
        let tmp = TempDir::new().unwrap();
        let store = ImageStore::new(tmp.path());

        let path = store.store_timestamped("omsk.gif", b"gif").await.unwrap();
        let file_name = Path::new(&path).file_name().unwrap().to_str().unwrap();
        let (prefix, rest) = file_name.split_once('_').unwrap();

        assert!(prefix.parse::<i64>().unwrap() > 0);
        assert_eq!(rest, "omsk.gif");
        assert!(store.contains(&path));
    }

    #[tokio::test]
    async fn test_read_infers_content_type() {
        let tmp = TempDir::new().unwrap();
        let store = ImageStore::new(tmp.path());
        let path = store.store_for_city(1, "kazan.jpg", b"\xff\xd8").await.unwrap();

        let image = store.read(&path).await.unwrap();

        assert_eq!(image.content_type, "image/jpeg");
        assert_eq!(image.data, b"\xff\xd8");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_storage_error() {
        let tmp = TempDir::new().unwrap();
        let store = ImageStore::new(tmp.path());
        let missing = tmp.path().join("gone.png");

        let err = store.read(&missing.to_string_lossy()).await.unwrap_err();

        assert!(matches!(err, crate::core::error::AppError::Storage(_)));
    }

    #[tokio::test]
    async fn test_remove_is_best_effort() {
        let tmp = TempDir::new().unwrap();
        let store = ImageStore::new(tmp.path());
        let path = store.store_for_city(3, "sochi.png", b"x").await.unwrap();

        store.remove(&path).await;
        assert!(!Path::new(&path).exists());

        // Removing again must not panic or error
        store.remove(&path).await;
    }

    #[test]
    fn test_contains_rejects_paths_outside_root() {
        let store = ImageStore::new("/app/uploads");
        assert!(store.contains("/app/uploads/1_a.png"));
        assert!(!store.contains("/etc/passwd"));
        assert!(!store.contains("/app/uploads/../secret.png"));
        assert!(!store.contains("/app/uploads/nested/1_a.png"));
    }
}
