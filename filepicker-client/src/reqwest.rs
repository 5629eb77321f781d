#![doc = "BlobClient implementation for [reqwest]"]
use async_trait::async_trait;
use filepicker_api::{BlobClient, BoxError, ByteStream, Error, HttpClient, DEFAULT_API_ROOT};
use futures::{StreamExt, TryStreamExt};
use http::{Request, Response};
use reqwest::Client;
use std::sync::Arc;

pub struct ReqwestClient {
    api_key: String,
    api_root: String,
    max_payload_size: Option<usize>,
    client: Arc<Client>,
}

impl ReqwestClient {
    /// Create a client with the given API key and the default configuration.
    pub fn new(api_key: impl AsRef<str>) -> Result<ReqwestClient, Error> {
        ReqwestClientBuilder::new(api_key).build()
    }
}

pub struct ReqwestClientBuilder {
    api_key: String,
    api_root: String,
    max_payload_size: Option<usize>,
    client: Option<Client>,
}

impl ReqwestClientBuilder {
    pub fn new(api_key: impl AsRef<str>) -> Self {
        Self {
            api_key: api_key.as_ref().into(),
            api_root: DEFAULT_API_ROOT.into(),
            max_payload_size: None,
            client: None,
        }
    }
    /// Override the API root relative paths are resolved against.
    pub fn api_root(mut self, api_root: impl AsRef<str>) -> Self {
        self.api_root = api_root.as_ref().into();
        self
    }
    /// Bound the size of assembled `read`/`convert` response bodies.
    pub fn max_payload_size(mut self, limit: usize) -> Self {
        self.max_payload_size = Some(limit);
        self
    }
    /// Use a preconfigured `reqwest::Client` (timeouts, proxies, pooling).
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }
    /// Build the client. A blank API key fails here, at construction, rather
    /// than on every call.
    pub fn build(self) -> Result<ReqwestClient, Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Validation("api key missing"));
        }
        Ok(ReqwestClient {
            api_key: self.api_key,
            api_root: self.api_root,
            max_payload_size: self.max_payload_size,
            client: Arc::new(self.client.unwrap_or_default()),
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send_http(
        &self,
        request: Request<Vec<u8>>,
    ) -> core::result::Result<Response<Vec<u8>>, BoxError> {
        let response = self.client.execute(request.try_into()?).await?;
        let mut builder = Response::builder().status(response.status());
        for (k, v) in response.headers() {
            builder = builder.header(k, v);
        }
        builder.body(response.bytes().await?.to_vec()).map_err(Into::into)
    }

    async fn send_http_streaming(
        &self,
        request: Request<Vec<u8>>,
    ) -> core::result::Result<Response<ByteStream>, BoxError> {
        let response = self.client.execute(request.try_into()?).await?;
        let mut builder = Response::builder().status(response.status());
        for (k, v) in response.headers() {
            builder = builder.header(k, v);
        }
        let chunks = response.bytes_stream().map_err(|e| Box::new(e) as BoxError).boxed();
        builder.body(chunks).map_err(Into::into)
    }
}

#[async_trait]
impl BlobClient for ReqwestClient {
    fn api_key(&self) -> &str {
        &self.api_key
    }
    fn base_uri(&self) -> String {
        self.api_root.clone()
    }
    fn max_payload_size(&self) -> Option<usize> {
        self.max_payload_size
    }
}
