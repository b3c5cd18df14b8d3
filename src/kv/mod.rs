//! Plain key-value calls against `/v1/kv`.
//!
//! These are single-key requests, independent of the watch engine. Values
//! come back base64 encoded from the agent and are decoded into text here.

mod service;

pub use service::*;

#[cfg(test)]
mod kv_test;

use base64::engine::general_purpose;
use base64::Engine as _;
use serde::Deserialize;

use crate::DispatchError;
use crate::Result;

/// Optional query parameters of a KV request.
///
/// Only the fields that are set end up in the query string. Fields that make
/// no sense for a given call (e.g. `cas` on a read) are forwarded anyway and
/// left to the agent to ignore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvQuery {
    /// Target datacenter, the client's configured one when absent
    pub dc: Option<String>,
    pub ns: Option<String>,
    pub separator: Option<String>,
    pub flags: Option<u64>,
    /// Check-and-set against this `ModifyIndex`
    pub cas: Option<u64>,
    /// Session id acquiring the lock on write
    pub acquire: Option<String>,
    /// Session id releasing the lock on write
    pub release: Option<String>,
}

impl KvQuery {
    pub fn datacenter(dc: impl Into<String>) -> Self {
        Self {
            dc: Some(dc.into()),
            ..Default::default()
        }
    }

    pub(crate) fn to_pairs(
        &self,
        default_dc: Option<&str>,
    ) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(dc) = self.dc.as_deref().or(default_dc) {
            pairs.push(("dc", dc.to_string()));
        }
        if let Some(ns) = &self.ns {
            pairs.push(("ns", ns.clone()));
        }
        if let Some(separator) = &self.separator {
            pairs.push(("separator", separator.clone()));
        }
        if let Some(flags) = self.flags {
            pairs.push(("flags", flags.to_string()));
        }
        if let Some(cas) = self.cas {
            pairs.push(("cas", cas.to_string()));
        }
        if let Some(acquire) = &self.acquire {
            pairs.push(("acquire", acquire.clone()));
        }
        if let Some(release) = &self.release {
            pairs.push(("release", release.clone()));
        }
        pairs
    }
}

/// One stored key, with its value decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub key: String,
    /// `None` for keys stored without a value
    pub value: Option<String>,
    pub flags: u64,
    pub create_index: u64,
    pub modify_index: u64,
    pub lock_index: u64,
    /// Session holding the lock, if any
    pub session: Option<String>,
}

/// Entry as the agent sends it, value still base64 encoded
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawKvEntry {
    key: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    flags: u64,
    #[serde(default)]
    create_index: u64,
    #[serde(default)]
    modify_index: u64,
    #[serde(default)]
    lock_index: u64,
    #[serde(default)]
    session: Option<String>,
}

impl RawKvEntry {
    fn decode(self) -> Result<KvEntry> {
        let value = self.value.map(|encoded| decode_value(&self.key, &encoded)).transpose()?;
        Ok(KvEntry {
            key: self.key,
            value,
            flags: self.flags,
            create_index: self.create_index,
            modify_index: self.modify_index,
            lock_index: self.lock_index,
            session: self.session,
        })
    }
}

fn decode_value(
    key: &str,
    encoded: &str,
) -> Result<String> {
    let bytes = general_purpose::STANDARD.decode(encoded).map_err(|e| {
        DispatchError::InvalidResponse(format!("value of {key} is not valid base64: {e}"))
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
