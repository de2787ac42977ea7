//! Blob storage for profile photos and portfolio images
//!
//! Uploads arrive as base64 (optionally a `data:image/...;base64,` URL),
//! are decoded here, and are written through a [`BlobStore`]. The store
//! returns the public URL that gets persisted on the user or profile row.
//!
//! Superseded blobs are never deleted; rows simply stop referencing them.
//!
//! # Stores
//!
//! - [`HttpBlobStore`]: `PUT {endpoint}/{key}` with a bearer key
//! - [`MemoryBlobStore`]: in-process map, for development and tests
//!
//! # Example
//!
//! ```
//! use easel_shared::storage::{decode_image_payload, file_extension, portfolio_key};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = decode_image_payload("data:image/png;base64,iVBORw0KGgo=")?;
//! assert_eq!(&bytes[..4], b"\x89PNG");
//!
//! let key = portfolio_key(Uuid::nil(), 1_700_000_000_000, &file_extension("image/png")?);
//! assert!(key.starts_with("portfolio/"));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{debug, error};
use uuid::Uuid;

const ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Error type for blob storage operations
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// Image data is not valid base64 or is empty
    #[error("Invalid image data: {0}")]
    InvalidPayload(String),

    /// MIME type has no usable subtype
    #[error("Invalid MIME type: {0}")]
    InvalidMimeType(String),

    /// Storage backend rejected the upload
    #[error("Upload failed with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Transport failure talking to the backend
    #[error("Storage request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl BlobError {
    /// Whether the caller sent a bad payload (as opposed to a backend failure)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BlobError::InvalidPayload(_) | BlobError::InvalidMimeType(_)
        )
    }
}

/// A stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Storage key, kept for later cleanup
    pub key: String,

    /// Durable public URL
    pub url: String,
}

/// Blob storage backend
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Stores `data` under `key`, replacing any existing object
    async fn put(&self, key: &str, data: Bytes, content_type: &str)
        -> Result<StoredObject, BlobError>;
}

/// Object storage reached over HTTP
///
/// Uploads with `PUT {endpoint}/{key}`; objects are served from
/// `{public_url}/{key}`.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    public_url: String,
}

impl HttpBlobStore {
    /// Creates a store; `public_url` defaults to `endpoint`
    pub fn new(endpoint: &str, api_key: Option<String>, public_url: Option<&str>) -> Self {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let public_url = public_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| endpoint.clone());

        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            public_url,
        }
    }

    /// Public URL for a key
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, BlobError> {
        let size = data.len();
        let mut request = self
            .client
            .put(format!("{}/{}", self.endpoint, key))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data);

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(key = %key, status = status.as_u16(), "Blob upload rejected");
            return Err(BlobError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(key = %key, size, "Blob uploaded");

        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
        })
    }
}

/// In-memory blob store
///
/// URLs have the form `memory://blobs/{key}` and are only meaningful inside
/// this process.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, (Bytes, String)>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bytes and content type for a key
    pub async fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.read().await.get(key).cloned()
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, BlobError> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), (data, content_type.to_string()));

        Ok(StoredObject {
            key: key.to_string(),
            url: format!("memory://blobs/{}", key),
        })
    }
}

/// Strips an optional `data:image/<subtype>;base64,` prefix
fn strip_data_url_prefix(image_data: &str) -> &str {
    let Some(rest) = image_data.strip_prefix("data:image/") else {
        return image_data;
    };
    let Some((subtype, payload)) = rest.split_once(";base64,") else {
        return image_data;
    };

    let is_word = !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if is_word {
        payload
    } else {
        image_data
    }
}

/// Decodes a base64 image payload
///
/// # Errors
///
/// `BlobError::InvalidPayload` if the data is not base64 or decodes to
/// nothing
pub fn decode_image_payload(image_data: &str) -> Result<Bytes, BlobError> {
    let payload = strip_data_url_prefix(image_data.trim());

    let bytes = ENGINE
        .decode(payload)
        .map_err(|e| BlobError::InvalidPayload(e.to_string()))?;

    if bytes.is_empty() {
        return Err(BlobError::InvalidPayload("image is empty".to_string()));
    }

    Ok(Bytes::from(bytes))
}

/// File extension for a MIME type (its subtype, lowercased)
pub fn file_extension(mime_type: &str) -> Result<String, BlobError> {
    let subtype = mime_type
        .split_once('/')
        .map(|(_, subtype)| subtype.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BlobError::InvalidMimeType(mime_type.to_string()))?;

    let valid = subtype
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return Err(BlobError::InvalidMimeType(mime_type.to_string()));
    }

    Ok(subtype.to_ascii_lowercase())
}

/// Storage key for a profile photo
pub fn profile_photo_key(user_id: Uuid, unix_millis: i64, extension: &str) -> String {
    format!("profile-photos/{}-{}.{}", user_id, unix_millis, extension)
}

/// Storage key for a portfolio image
pub fn portfolio_key(profile_id: Uuid, unix_millis: i64, extension: &str) -> String {
    format!("portfolio/{}-{}.{}", profile_id, unix_millis, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_base64() {
        let bytes = decode_image_payload("aGVsbG8=").unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[test]
    fn test_decode_strips_data_url_prefix() {
        let bytes = decode_image_payload("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[test]
    fn test_non_image_data_url_is_not_stripped() {
        // Only image data URLs are unwrapped; anything else must be raw base64
        assert!(decode_image_payload("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(decode_image_payload("data:image/svg+xml;base64,aGVsbG8=").is_err());
    }

    #[test]
    fn test_decode_rejects_garbage_and_empty() {
        assert!(matches!(
            decode_image_payload("not base64!!"),
            Err(BlobError::InvalidPayload(_))
        ));
        assert!(matches!(
            decode_image_payload(""),
            Err(BlobError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("image/png").unwrap(), "png");
        assert_eq!(file_extension("image/JPEG").unwrap(), "jpeg");
        assert_eq!(file_extension("image/svg+xml").unwrap(), "svg+xml");
        assert!(file_extension("png").is_err());
        assert!(file_extension("image/").is_err());
        assert!(file_extension("image/../etc").is_err());
    }

    #[test]
    fn test_keys() {
        let id = Uuid::nil();
        assert_eq!(
            profile_photo_key(id, 42, "png"),
            "profile-photos/00000000-0000-0000-0000-000000000000-42.png"
        );
        assert_eq!(
            portfolio_key(id, 42, "webp"),
            "portfolio/00000000-0000-0000-0000-000000000000-42.webp"
        );
    }

    #[test]
    fn test_http_store_public_url() {
        let store = HttpBlobStore::new("https://blobs.internal/", None, Some("https://cdn.example.com/"));
        assert_eq!(
            store.public_url("portfolio/a.png"),
            "https://cdn.example.com/portfolio/a.png"
        );

        let store = HttpBlobStore::new("https://blobs.internal", None, None);
        assert_eq!(store.public_url("k"), "https://blobs.internal/k");
    }

    #[tokio::test]
    async fn test_memory_store_put_and_get() {
        let store = MemoryBlobStore::new();
        assert!(store.is_empty().await);

        let stored = store
            .put("portfolio/x.png", Bytes::from_static(b"img"), "image/png")
            .await
            .unwrap();

        assert_eq!(stored.key, "portfolio/x.png");
        assert_eq!(stored.url, "memory://blobs/portfolio/x.png");
        assert_eq!(store.len().await, 1);

        let (data, content_type) = store.get("portfolio/x.png").await.unwrap();
        assert_eq!(&data[..], b"img");
        assert_eq!(content_type, "image/png");
    }
}
