use crate::error::BoxError;
use bytes::Bytes;
use futures::stream::BoxStream;
use http::HeaderMap;
use serde::{Deserialize, Serialize};

/// A reference to a blob stored by the service.
///
/// The URL is the blob's only identity; derived endpoints (`/metadata`,
/// `/remove`, `/convert`) are built by appending to it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
    pub url: String,
}

impl BlobRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Blob metadata as returned by [`stat`](crate::BlobClient::stat).
///
/// An open mapping (size, mimetype, ...) with the blob's `url` injected by
/// the client.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Result of a server-side conversion: the response headers together with
/// the transformed payload, assembled from the chunked response body.
#[derive(Debug, Clone)]
pub struct Converted {
    pub headers: HeaderMap,
    pub payload: Vec<u8>,
}

/// A raw service response, as returned by [`store`](crate::BlobClient::store)
/// and [`remove`](crate::BlobClient::remove).
///
/// JSON if the response declared `application/json`, text otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOrJson {
    Json(serde_json::Value),
    Text(String),
}

/// A chunked HTTP response body.
pub type ByteStream = BoxStream<'static, core::result::Result<Bytes, BoxError>>;
