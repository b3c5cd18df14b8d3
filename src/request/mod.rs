//! Request descriptors for the Consul HTTP API.
//!
//! The crate never opens a socket itself. It describes each call as a
//! [`RequestOptions`] and hands it to a caller-provided [`RequestHandler`],
//! which owns the actual transport.


use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;

use crate::ClientConfig;
use crate::Result;
use crate::TokenConfig;
use crate::TokenKind;

pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Fully resolved request, ready for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub host: String,
    pub port: u16,
    pub headers: Headers,
    pub method: Method,
    /// Path including the query string
    pub path: String,
}

/// Connection-level part of a request, shared by every call of a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBase {
    pub host: String,
    pub port: u16,
    pub headers: Headers,
}

impl RequestBase {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            headers: auth_header(config.token.as_ref()),
        }
    }

    /// Resolve a concrete request for `path` and `query`
    pub fn resolve(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> RequestOptions {
        RequestOptions {
            host: self.host.clone(),
            port: self.port,
            headers: self.headers.clone(),
            method,
            path: with_query(path, query),
        }
    }
}

/// Executes a resolved request and returns the decoded JSON body
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    async fn handle(
        &self,
        options: RequestOptions,
        body: Option<Value>,
    ) -> Result<Value>;
}

/// Join API version, service and an optional key into one absolute path.
///
/// Leading, trailing and repeated slashes in the segments are collapsed, so
/// `("/v1", "/kv", "/a/b")` and `("v1", "kv", "a/b")` resolve alike.
pub fn resolve_path(
    version: &str,
    service: &str,
    key: &str,
) -> String {
    let mut path = String::new();
    for segment in [version, service, key]
        .iter()
        .flat_map(|s| s.split('/'))
        .filter(|s| !s.is_empty())
    {
        path.push('/');
        path.push_str(segment);
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

/// Append `query` to `path`. Repeated names are kept, values are percent-encoded.
pub fn with_query(
    path: &str,
    query: &[(&str, String)],
) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let encoded: Vec<String> = query
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect();
    format!("{}?{}", path, encoded.join("&"))
}

/// Authentication header for the configured token, empty without one
pub fn auth_header(token: Option<&TokenConfig>) -> Headers {
    let mut headers = Headers::new();
    match token {
        Some(TokenConfig {
            kind: TokenKind::XConsulToken,
            value,
        }) => {
            headers.insert("X-Consul-Token".to_string(), value.clone());
        }
        Some(TokenConfig {
            kind: TokenKind::Bearer,
            value,
        }) => {
            headers.insert("Authorization".to_string(), format!("Bearer {}", value));
        }
        None => {}
    }
    headers
}

fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if b.is_ascii_alphanumeric() || b"-_.~!*'()".contains(&b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
