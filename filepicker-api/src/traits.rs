use crate::error::{BoxError, Error, Result};
use crate::notify::{settle, OnDone};
use crate::params::{augment_query, resolve_path, Params};
use crate::sink::drain;
use crate::types::{BlobRef, ByteStream, Converted, Metadata, TextOrJson};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::{Method, Request, Response, StatusCode};
use serde::Serialize;
use tracing::debug;

/// API root used when the client does not override
/// [`base_uri`](BlobClient::base_uri).
pub const DEFAULT_API_ROOT: &str = "https://www.filepicker.io/api";

/// An abstract HTTP client.
#[async_trait]
pub trait HttpClient {
    /// Send an HTTP request and return the fully buffered response.
    async fn send_http(
        &self,
        request: Request<Vec<u8>>,
    ) -> core::result::Result<Response<Vec<u8>>, BoxError>;

    /// Send an HTTP request and return the response body as a chunk stream.
    ///
    /// Transports that cannot stream inherit this implementation, which
    /// degrades to a single chunk over [`send_http`](HttpClient::send_http).
    async fn send_http_streaming(
        &self,
        request: Request<Vec<u8>>,
    ) -> core::result::Result<Response<ByteStream>, BoxError> {
        let (parts, body) = self.send_http(request).await?.into_parts();
        let chunks = if body.is_empty() {
            Vec::new()
        } else {
            vec![Ok(Bytes::from(body))]
        };
        Ok(Response::from_parts(parts, futures::stream::iter(chunks).boxed()))
    }
}

/// A client for the Filepicker blob service.
///
/// The five operations have default implementations on top of
/// [`HttpClient`]; implementors supply the API key and, optionally, the API
/// root and a response-size bound.
///
/// Each operation resolves its future with the result and, when a hook is
/// given, invokes it exactly once with a view of the same outcome, also on
/// validation failures that never reach the transport.
#[async_trait]
pub trait BlobClient: HttpClient {
    /// The API key sent as the `key` query parameter on every request.
    fn api_key(&self) -> &str;

    /// The API root prepended to relative request paths.
    fn base_uri(&self) -> String {
        DEFAULT_API_ROOT.to_owned()
    }

    /// Upper bound on assembled response bodies for `read` and `convert`.
    ///
    /// `None` (the default) accepts payloads of any size.
    fn max_payload_size(&self) -> Option<usize> {
        None
    }

    /// Fetch the blob's content, assembled into one contiguous buffer.
    ///
    /// Without caller parameters the request asks the service to
    /// base64-encode the body (`base64encode=true`), matching the service's
    /// other clients.
    async fn read(
        &self,
        blob: &BlobRef,
        params: Option<Params>,
        hook: Option<OnDone<Vec<u8>>>,
    ) -> Result<Vec<u8>> {
        let outcome = async {
            require_url(blob)?;
            let params =
                Some(params.unwrap_or_else(|| Params::from([("base64encode", "true")])));
            let uri = endpoint(&self.base_uri(), self.api_key(), &blob.url, params)?;
            debug!("GET {uri}");
            let (parts, stream) = self
                .send_http_streaming(binary_get(&uri)?)
                .await
                .map_err(Error::Transport)?
                .into_parts();
            let body = drain(stream, self.max_payload_size()).await?;
            if parts.status.is_success() {
                Ok(body)
            } else {
                Err(remote(parts.status, body))
            }
        }
        .await;
        settle(hook, outcome)
    }

    /// Fetch the blob's metadata without fetching its content.
    ///
    /// The returned mapping carries the service's fields plus the blob's
    /// `url`.
    async fn stat(
        &self,
        blob: &BlobRef,
        params: Option<Params>,
        hook: Option<OnDone<Metadata>>,
    ) -> Result<Metadata> {
        let outcome = async {
            require_url(blob)?;
            let path = format!("{}/metadata", blob.url);
            let uri = endpoint(&self.base_uri(), self.api_key(), &path, params)?;
            debug!("GET {uri}");
            let request = Request::builder().method(Method::GET).uri(&uri).body(Vec::new())?;
            let (parts, body) =
                self.send_http(request).await.map_err(Error::Transport)?.into_parts();
            if !parts.status.is_success() {
                return Err(remote(parts.status, body));
            }
            let mut metadata: Metadata = serde_json::from_slice(&body)?;
            metadata.insert("url".to_owned(), serde_json::Value::String(blob.url.clone()));
            Ok(metadata)
        }
        .await;
        settle(hook, outcome)
    }

    /// Store a new blob with the given filename and mimetype.
    ///
    /// The payload is posted to the service's S3 store endpoint; `mimetype`,
    /// `filename` and `base64decode=true` overwrite any same-named caller
    /// parameters.
    async fn store(
        &self,
        payload: Vec<u8>,
        filename: &str,
        mimetype: &str,
        params: Option<Params>,
        hook: Option<OnDone<TextOrJson>>,
    ) -> Result<TextOrJson> {
        let outcome = async {
            if payload.is_empty() {
                return Err(Error::Validation("payload missing"));
            }
            if filename.is_empty() {
                return Err(Error::Validation("filename missing"));
            }
            if mimetype.is_empty() {
                return Err(Error::Validation("mimetype missing"));
            }
            let mut params = params.unwrap_or_default();
            params.insert("mimetype", mimetype);
            params.insert("filename", filename);
            params.insert("base64decode", "true");
            let uri = endpoint(&self.base_uri(), self.api_key(), "/store/S3", Some(params))?;
            debug!("POST {uri}");
            let request = json_post(&uri, payload)?;
            let (parts, body) =
                self.send_http(request).await.map_err(Error::Transport)?.into_parts();
            unpack(parts, body)
        }
        .await;
        settle(hook, outcome)
    }

    /// Remove the blob from the service.
    ///
    /// Each call issues its own request; removing an already-removed blob
    /// reports whatever the service answers.
    async fn remove(
        &self,
        blob: &BlobRef,
        hook: Option<OnDone<TextOrJson>>,
    ) -> Result<TextOrJson> {
        let outcome = async {
            require_url(blob)?;
            let path = format!("{}/remove", blob.url);
            let uri = endpoint(&self.base_uri(), self.api_key(), &path, None)?;
            debug!("POST {uri}");
            let body = serde_json::to_vec(&RemoveBody { key: self.api_key() })?;
            let request = json_post(&uri, body)?;
            let (parts, body) =
                self.send_http(request).await.map_err(Error::Transport)?.into_parts();
            unpack(parts, body)
        }
        .await;
        settle(hook, outcome)
    }

    /// Server-side conversion of the blob, e.g. a resize:
    ///
    /// ```ignore
    /// let thumb = client
    ///     .convert(&blob, Some(Params::from([("w", "300")])), None)
    ///     .await?;
    /// ```
    ///
    /// Returns the response headers together with the transformed payload,
    /// assembled from the chunked response body.
    async fn convert(
        &self,
        blob: &BlobRef,
        params: Option<Params>,
        hook: Option<OnDone<Converted>>,
    ) -> Result<Converted> {
        let outcome = async {
            require_url(blob)?;
            let path = format!("{}/convert", blob.url);
            let uri = endpoint(&self.base_uri(), self.api_key(), &path, params)?;
            debug!("GET {uri}");
            let (parts, stream) = self
                .send_http_streaming(binary_get(&uri)?)
                .await
                .map_err(Error::Transport)?
                .into_parts();
            let payload = drain(stream, self.max_payload_size()).await?;
            if parts.status.is_success() {
                Ok(Converted { headers: parts.headers, payload })
            } else {
                Err(remote(parts.status, payload))
            }
        }
        .await;
        settle(hook, outcome)
    }

    /// Overwriting a blob in place is not implemented by the Filepicker
    /// protocol clients; this stub exists so the gap is a documented part of
    /// the interface rather than a silent omission. Calling it does nothing
    /// and issues no request.
    fn write(&self) {}
}

#[derive(Serialize)]
struct RemoveBody<'a> {
    key: &'a str,
}

fn require_url(blob: &BlobRef) -> Result<()> {
    if blob.url.is_empty() {
        Err(Error::Validation("blob.url missing"))
    } else {
        Ok(())
    }
}

fn endpoint(api_root: &str, api_key: &str, path: &str, params: Option<Params>) -> Result<String> {
    Ok(format!("{}?{}", resolve_path(api_root, path), augment_query(api_key, params)?))
}

/// GET request for binary payloads, with the header set the service expects
/// on streamed transfers.
fn binary_get(uri: &str) -> Result<Request<Vec<u8>>> {
    Ok(Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("X-NO-STREAM", "true")
        .header(http::header::CONNECTION, "keep-alive")
        .header(http::header::ACCEPT_ENCODING, "gzip,deflate,sdch")
        .header(
            http::header::ACCEPT,
            "text/javascript, text/html, application/xml, text/xml, */*",
        )
        .body(Vec::new())?)
}

fn json_post(uri: &str, body: Vec<u8>) -> Result<Request<Vec<u8>>> {
    Ok(Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body)?)
}

fn is_json(headers: &http::HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |content_type| content_type.starts_with("application/json"))
}

fn unpack(parts: http::response::Parts, body: Vec<u8>) -> Result<TextOrJson> {
    if !parts.status.is_success() {
        return Err(remote(parts.status, body));
    }
    if is_json(&parts.headers) {
        Ok(TextOrJson::Json(serde_json::from_slice(&body)?))
    } else {
        Ok(TextOrJson::Text(String::from_utf8_lossy(&body).into_owned()))
    }
}

fn remote(status: StatusCode, body: Vec<u8>) -> Error {
    let body = if body.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&body).into_owned())
    };
    Error::Remote { status, body }
}
