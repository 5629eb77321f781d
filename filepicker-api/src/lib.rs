#![doc = include_str!("../README.md")]
pub mod error;
mod notify;
mod params;
mod sink;
mod traits;
mod types;

pub use crate::error::{BoxError, Error, Result};
pub use crate::notify::OnDone;
pub use crate::params::Params;
pub use crate::sink::ByteSink;
pub use crate::traits::{BlobClient, HttpClient, DEFAULT_API_ROOT};
pub use crate::types::{BlobRef, ByteStream, Converted, Metadata, TextOrJson};
