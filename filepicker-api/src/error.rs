#![doc = "Error types."]
use http::StatusCode;

/// Boxed transport-level error, as produced by [`HttpClient`](crate::HttpClient)
/// implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required argument was missing or empty; detected before any request
    /// is issued.
    #[error("missing required field: {0}")]
    Validation(&'static str),
    /// The service answered with a non-success status.
    #[error("remote service error: status {status}")]
    Remote {
        status: StatusCode,
        /// Response body, when the service sent one.
        body: Option<String>,
    },
    #[error("http request error: {0}")]
    HttpRequest(#[from] http::Error),
    /// Network-level failure reported by the underlying transport.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
    #[error("json error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("query string error: {0}")]
    QueryString(#[from] serde_html_form::ser::Error),
    /// The response body grew past the configured
    /// [`max_payload_size`](crate::BlobClient::max_payload_size).
    #[error("response body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
}

/// Type alias to use this crate's [`Error`](enum@crate::Error) type in a [`Result`](core::result::Result).
pub type Result<T> = core::result::Result<T, Error>;
