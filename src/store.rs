//! Object-store backend trait and the S3 implementation.
//!
//! The [`ObjectStore`] trait covers the two operations the publish pipeline
//! needs: a metadata-only `head` (integrity tag and size, no content
//! transfer) and a `put` of a local file with an explicit content type.
//! The production implementation is [`S3Store`], a thin wrapper over the
//! blocking `rust-s3` client; tests substitute the scriptable mock in
//! [`tests`], so no pipeline test ever opens a socket.

use crate::config::Config;
use s3::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store request failed: {0}")]
    Request(#[from] S3Error),
    #[error("store returned unexpected status {0}")]
    UnexpectedStatus(u16),
}

/// Metadata of a remote object, as reported by a `head` query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    /// Integrity tag, surrounding quotes stripped. For single-part uploads
    /// this is an MD5 content hash; composite (multipart) tags carry a
    /// `-<parts>` suffix and are not plain hashes.
    pub etag: String,
    /// Object size in bytes, when the store reports one.
    pub size: Option<u64>,
}

/// Trait for object-store backends.
pub trait ObjectStore {
    /// Query object metadata without transferring content.
    ///
    /// Returns `Ok(None)` when no object exists at `key`.
    fn head(&self, key: &str) -> Result<Option<RemoteObject>, StoreError>;

    /// Upload a local file to `key` with the given content type,
    /// overwriting any existing object.
    fn put_file(&self, key: &str, file: &Path, content_type: &str) -> Result<(), StoreError>;
}

/// Production store backed by an S3-compatible bucket.
pub struct S3Store {
    bucket: Box<Bucket>,
}

impl S3Store {
    /// Build a store from a complete publishing configuration.
    ///
    /// Callers check [`Config::publishing_enabled`] first; a missing field
    /// here is a configuration error, not a disabled state.
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let bucket_name = require(&config.s3_bucket, "S3_BUCKET_NAME")?;
        let access_key = require(&config.aws_access_key, "AWS_ACCESS_KEY_ID")?;
        let secret_key = require(&config.aws_secret_key, "AWS_SECRET_ACCESS_KEY")?;

        let region: Region = config
            .aws_region
            .parse()
            .map_err(|e| StoreError::Config(format!("invalid region: {e}")))?;
        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StoreError::Config(e.to_string()))?;
        let bucket = Bucket::new(bucket_name, region, credentials)?;

        Ok(Self { bucket })
    }
}

fn require<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str, StoreError> {
    field
        .as_deref()
        .ok_or_else(|| StoreError::Config(format!("{name} is not set")))
}

impl ObjectStore for S3Store {
    fn head(&self, key: &str) -> Result<Option<RemoteObject>, StoreError> {
        let path = object_path(key);
        match self.bucket.head_object(&path) {
            Ok((head, code)) if (200..300).contains(&code) => {
                let etag = head
                    .e_tag
                    .as_deref()
                    .map(normalize_etag)
                    .unwrap_or_default();
                let size = head.content_length.and_then(|n| u64::try_from(n).ok());
                Ok(Some(RemoteObject { etag, size }))
            }
            Ok((_, 404)) => Ok(None),
            Ok((_, code)) => Err(StoreError::UnexpectedStatus(code)),
            // Some backends surface the missing object as an HTTP failure
            // instead of a 404 status tuple.
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(None),
            Err(e) => Err(StoreError::Request(e)),
        }
    }

    fn put_file(&self, key: &str, file: &Path, content_type: &str) -> Result<(), StoreError> {
        let content = std::fs::read(file)?;
        let response =
            self.bucket
                .put_object_with_content_type(object_path(key), &content, content_type)?;
        match response.status_code() {
            code if (200..300).contains(&code) => Ok(()),
            code => Err(StoreError::UnexpectedStatus(code)),
        }
    }
}

/// Keys are stored without a leading slash; the client wants one.
fn object_path(key: &str) -> String {
    format!("/{}", key.trim_start_matches('/'))
}

/// Strip the surrounding double quotes stores put around ETags.
pub fn normalize_etag(raw: &str) -> String {
    raw.trim_matches('"').to_string()
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scriptable in-memory store.
    ///
    /// Seed `objects` with what `head` should report; uploads are recorded
    /// in `uploads` and inserted into `objects` so a subsequent head sees
    /// them. Error flags force the next query or upload to fail.
    #[derive(Default)]
    pub struct MockStore {
        pub objects: Mutex<HashMap<String, RemoteObject>>,
        pub uploads: Mutex<Vec<(String, String)>>,
        pub fail_head: Mutex<bool>,
        pub fail_put: Mutex<bool>,
    }

    impl MockStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_object(key: &str, etag: &str, size: Option<u64>) -> Self {
            let store = Self::default();
            store.objects.lock().unwrap().insert(
                key.to_string(),
                RemoteObject {
                    etag: etag.to_string(),
                    size,
                },
            );
            store
        }

        pub fn uploaded_keys(&self) -> Vec<String> {
            self.uploads
                .lock()
                .unwrap()
                .iter()
                .map(|(key, _)| key.clone())
                .collect()
        }
    }

    impl ObjectStore for MockStore {
        fn head(&self, key: &str) -> Result<Option<RemoteObject>, StoreError> {
            if *self.fail_head.lock().unwrap() {
                return Err(StoreError::UnexpectedStatus(500));
            }
            Ok(self.objects.lock().unwrap().get(key).cloned())
        }

        fn put_file(&self, key: &str, file: &Path, content_type: &str) -> Result<(), StoreError> {
            if *self.fail_put.lock().unwrap() {
                return Err(StoreError::UnexpectedStatus(503));
            }
            let size = std::fs::metadata(file)?.len();
            self.uploads
                .lock()
                .unwrap()
                .push((key.to_string(), content_type.to_string()));
            self.objects.lock().unwrap().insert(
                key.to_string(),
                RemoteObject {
                    etag: "uploaded".to_string(),
                    size: Some(size),
                },
            );
            Ok(())
        }
    }

    #[test]
    fn normalize_etag_strips_quotes() {
        assert_eq!(normalize_etag("\"abc123\""), "abc123");
        assert_eq!(normalize_etag("abc123"), "abc123");
        assert_eq!(normalize_etag("\"abc-2\""), "abc-2");
    }

    #[test]
    fn object_path_gets_leading_slash() {
        assert_eq!(object_path("my-song/my-song.mp3"), "/my-song/my-song.mp3");
        assert_eq!(object_path("/already/slashed"), "/already/slashed");
    }

    #[test]
    fn s3_store_requires_complete_config() {
        let config = Config::default();
        let result = S3Store::new(&config);
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[test]
    fn mock_head_reports_seeded_object() {
        let store = MockStore::with_object("k", "abc", Some(7));
        let object = store.head("k").unwrap().unwrap();
        assert_eq!(object.etag, "abc");
        assert_eq!(object.size, Some(7));
        assert!(store.head("other").unwrap().is_none());
    }

    #[test]
    fn mock_put_records_and_becomes_visible() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("a.mp3");
        std::fs::write(&file, b"audio").unwrap();

        let store = MockStore::new();
        store.put_file("k", &file, "audio/mpeg").unwrap();

        assert_eq!(store.uploaded_keys(), vec!["k"]);
        assert_eq!(store.head("k").unwrap().unwrap().size, Some(5));
    }
}
