#![doc = "Assembly of chunked response bodies into contiguous buffers."]
use crate::error::{Error, Result};
use crate::types::ByteStream;
use futures::StreamExt;

/// Append-only byte accumulator with an optional capacity limit.
///
/// Chunks are kept in arrival order; `finish` yields the assembled buffer.
/// With no limit the sink grows without bound, so callers fetching
/// arbitrarily large blobs should set one.
#[derive(Debug, Default)]
pub struct ByteSink {
    buf: Vec<u8>,
    limit: Option<usize>,
}

impl ByteSink {
    pub fn new(limit: Option<usize>) -> Self {
        Self { buf: Vec::new(), limit }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<()> {
        if let Some(limit) = self.limit {
            if self.buf.len() + chunk.len() > limit {
                return Err(Error::PayloadTooLarge { limit });
            }
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Drives a response body to completion through a [`ByteSink`].
///
/// An empty body yields an empty buffer; a mid-stream transport failure
/// surfaces as [`Error::Transport`].
pub(crate) async fn drain(mut stream: ByteStream, limit: Option<usize>) -> Result<Vec<u8>> {
    let mut sink = ByteSink::new(limit);
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Error::Transport)?;
        sink.push(&chunk)?;
    }
    Ok(sink.finish())
}
