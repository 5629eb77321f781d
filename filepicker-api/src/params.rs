#![doc = "Query parameters and URL construction."]
use crate::error::Result;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

/// Query parameters for a blob operation.
///
/// An open string-to-string mapping; later inserts under the same key win.
/// The `key` and `_cacheBust` parameters are always overwritten at request
/// time, whatever the caller put in.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    /// Chaining variant of [`insert`](Params::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.insert(key, value);
        }
        params
    }
}

/// URL-encodes `params`, overwriting `key` with the API key and `_cacheBust`
/// with a fresh random value so intermediary caches never coalesce requests.
pub(crate) fn augment_query(api_key: &str, params: Option<Params>) -> Result<String> {
    let mut params = params.unwrap_or_default();
    params.insert("key", api_key);
    params.insert("_cacheBust", rand::thread_rng().gen_range(0..=100_000u32));
    Ok(serde_html_form::to_string(&params)?)
}

/// Prefixes `path` with the API root unless it is already absolute.
///
/// "Already absolute" is a substring match on `http`, kept for compatibility
/// with the service's other client libraries.
pub(crate) fn resolve_path(api_root: &str, path: &str) -> String {
    if path.contains("http") {
        path.to_owned()
    } else {
        format!("{api_root}{path}")
    }
}
