// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use crate::common::error::AppError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::PathBuf;

const HASH_PREFIX_LEN: usize = 16;
const MAX_NAME_LEN: usize = 96;

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub key: String,
    pub public_url: String,
    pub size: usize,
}

/// Filesystem-backed store for product images uploaded by the listing flow.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    public_base: String,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/public/{}", self.public_base, key)
    }

    /// Store `bytes` under a content-addressed key derived from `name`.
    /// Identical uploads map to the same key.
    pub async fn put(
        &self,
        name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredObject, AppError> {
        if bytes.is_empty() {
            return Err(AppError::validation("body", "upload is empty"));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::validation(
                "body",
                format!("upload exceeds {} bytes", self.max_bytes),
            ));
        }

        let clean = sanitize_name(name)?;
        let Some(expected) = image_type_for(&clean) else {
            return Err(AppError::validation(
                "name",
                format!("'{clean}' is not a png, jpeg, gif or webp file"),
            ));
        };
        let declared = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if declared != expected {
            return Err(AppError::validation(
                "contentType",
                format!("'{content_type}' does not match {expected}"),
            ));
        }

        let digest = hex::encode(Sha256::digest(bytes));
        let key = format!("{}-{}", &digest[..HASH_PREFIX_LEN], clean);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Storage(format!("create {}: {}", self.root.display(), e)))?;
        let path = self.root.join(&key);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("write {}: {}", key, e)))?;

        tracing::info!(target: "storage", key = %key, size = bytes.len(), "Stored image");
        Ok(StoredObject {
            public_url: self.public_url(&key),
            key,
            size: bytes.len(),
        })
    }

    /// Object bytes and content type, `None` when the key is unknown.
    pub async fn get(&self, key: &str) -> Result<Option<(Vec<u8>, &'static str)>, AppError> {
        let clean = sanitize_name(key)?;
        if clean != key {
            return Ok(None);
        }
        match tokio::fs::read(self.root.join(key)).await {
            Ok(bytes) => Ok(Some((
                bytes,
                image_type_for(key).unwrap_or("application/octet-stream"),
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("read {}: {}", key, e))),
        }
    }
}

/// Reduce a client-supplied file name to `[A-Za-z0-9._-]`. Anything that could
/// address another directory is rejected outright.
pub fn sanitize_name(raw: &str) -> Result<String, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::validation("name", "file name is required"));
    }
    if raw.contains("..") || raw.contains('/') || raw.contains('\\') || raw.starts_with('.') {
        return Err(AppError::Storage(format!("rejected object name '{raw}'")));
    }
    let clean: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();
    Ok(clean)
}

/// Raster types the store accepts and serves, keyed by extension. Scriptable
/// formats such as SVG are never served as images.
fn image_type_for(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_and_rejects_traversal() {
        assert_eq!(sanitize_name("my photo (1).png").unwrap(), "my-photo--1-.png");
        assert!(sanitize_name("../etc/passwd").is_err());
        assert!(sanitize_name("a/b.png").is_err());
        assert!(sanitize_name(".hidden").is_err());
        assert!(sanitize_name("  ").is_err());
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), "http://localhost:8787/", 1024);

        let stored = store.put("mug.png", "image/png", b"\x89PNG fake").await.unwrap();
        assert!(stored.key.ends_with("-mug.png"));
        assert_eq!(
            stored.public_url,
            format!("http://localhost:8787/storage/v1/object/public/{}", stored.key)
        );

        let again = store.put("mug.png", "image/png", b"\x89PNG fake").await.unwrap();
        assert_eq!(again.key, stored.key);

        let (bytes, ctype) = store.get(&stored.key).await.unwrap().unwrap();
        assert_eq!(bytes, b"\x89PNG fake");
        assert_eq!(ctype, "image/png");
        assert!(store.get("0000-missing.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_non_images_and_oversized_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), "http://x", 4);
        assert!(store.put("a.txt", "text/plain", b"hi").await.is_err());
        assert!(store.put("a.png", "image/png", b"12345").await.is_err());
        assert!(store.put("a.png", "image/png", b"").await.is_err());
    }

    #[tokio::test]
    async fn declared_type_must_match_a_raster_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), "http://x", 1024);
        let svg = b"<svg xmlns='http://www.w3.org/2000/svg'><script>alert(1)</script></svg>";

        assert!(store.put("evil.svg", "image/png", svg).await.is_err());
        assert!(store.put("evil.svg", "image/svg+xml", svg).await.is_err());
        assert!(store.put("photo.png", "image/jpeg", b"jpeg").await.is_err());
        assert!(store.put("photo", "image/png", b"png").await.is_err());

        let stored = store
            .put("Photo.JPG", "image/jpeg; charset=binary", b"jpeg")
            .await
            .unwrap();
        let (_, ctype) = store.get(&stored.key).await.unwrap().unwrap();
        assert_eq!(ctype, "image/jpeg");
    }

    #[tokio::test]
    async fn unknown_extensions_are_served_as_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), "http://x", 1024);
        // Left on disk by some other tool; the store never accepts these itself.
        std::fs::write(dir.path().join("0011-legacy.svg"), b"<svg/>").unwrap();
        let (_, ctype) = store.get("0011-legacy.svg").await.unwrap().unwrap();
        assert_eq!(ctype, "application/octet-stream");
    }
}
