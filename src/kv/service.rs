use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use super::KvEntry;
use super::KvQuery;
use super::RawKvEntry;
use crate::constants::CONSUL_VERSION_PATH;
use crate::constants::KV_SERVICE_PATH;
use crate::request::resolve_path;
use crate::request::Method;
use crate::request::RequestBase;
use crate::request::RequestHandler;
use crate::request::RequestOptions;
use crate::ClientConfig;
use crate::DispatchError;
use crate::Result;

/// Single-key reads, writes and deletes through `/v1/kv/<key>`
pub struct KvService<H: RequestHandler> {
    base: RequestBase,
    datacenter: Option<String>,
    handler: Arc<H>,
}

impl<H: RequestHandler> KvService<H> {
    pub fn new(
        config: &ClientConfig,
        handler: Arc<H>,
    ) -> Self {
        Self {
            base: RequestBase::from_config(config),
            datacenter: config.datacenter.clone(),
            handler,
        }
    }

    /// Read `key`. `None` when the agent returns no entry.
    pub async fn get(
        &self,
        key: &str,
        query: &KvQuery,
    ) -> Result<Option<KvEntry>> {
        let options = self.request(Method::Get, key, query, &[("recurse", "false")]);
        let response = self.handler.handle(options, None).await?;

        let entries: Vec<RawKvEntry> = serde_json::from_value(response)?;
        entries.into_iter().next().map(RawKvEntry::decode).transpose()
    }

    /// List every key under `prefix`
    pub async fn get_keys(
        &self,
        prefix: &str,
        query: &KvQuery,
    ) -> Result<Vec<String>> {
        let options = self.request(Method::Get, prefix, query, &[("recurse", "true"), ("keys", "true")]);
        let response = self.handler.handle(options, None).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Store `value` under `key`. Returns whether the write was applied,
    /// which is `false` when a `cas` or lock condition did not hold.
    pub async fn put(
        &self,
        key: &str,
        value: Value,
        query: &KvQuery,
    ) -> Result<bool> {
        let options = self.request(Method::Put, key, query, &[]);
        let response = self.handler.handle(options, Some(value)).await?;
        expect_bool(response)
    }

    /// Delete `key` only
    pub async fn delete(
        &self,
        key: &str,
        query: &KvQuery,
    ) -> Result<bool> {
        let options = self.request(Method::Delete, key, query, &[("recurse", "false")]);
        let response = self.handler.handle(options, None).await?;
        expect_bool(response)
    }

    /// Delete `prefix` and every key below it
    pub async fn delete_tree(
        &self,
        prefix: &str,
        query: &KvQuery,
    ) -> Result<bool> {
        let options = self.request(Method::Delete, prefix, query, &[("recurse", "true")]);
        let response = self.handler.handle(options, None).await?;
        expect_bool(response)
    }

    fn request(
        &self,
        method: Method,
        key: &str,
        query: &KvQuery,
        fixed: &[(&'static str, &str)],
    ) -> RequestOptions {
        let path = resolve_path(CONSUL_VERSION_PATH, KV_SERVICE_PATH, key);
        let mut pairs = query.to_pairs(self.datacenter.as_deref());
        pairs.extend(fixed.iter().map(|(name, value)| (*name, value.to_string())));
        trace!(%method, %path, "kv request");
        self.base.resolve(method, &path, &pairs)
    }
}

fn expect_bool(response: Value) -> Result<bool> {
    match response {
        Value::Bool(applied) => Ok(applied),
        other => Err(DispatchError::InvalidResponse(format!("expected a boolean, got {other}")).into()),
    }
}
