use serde::Deserialize;
use serde::Serialize;

/// One operation of a Consul transaction.
///
/// Serializes to the wire shape Consul expects, e.g.
/// `{"KV": {"Verb": "get", "Key": "app/flag"}}`. Only the KV namespace is
/// modelled; node, service and check operations are not used by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnOp {
    #[serde(rename = "KV")]
    Kv(KvOp),
}

/// KV verbs accepted inside a transaction.
///
/// `value` fields carry the already base64-encoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Verb", rename_all = "kebab-case")]
pub enum KvOp {
    #[serde(rename_all = "PascalCase")]
    Set {
        key: String,
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        flags: Option<u64>,
    },
    #[serde(rename_all = "PascalCase")]
    Cas {
        key: String,
        value: String,
        index: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        flags: Option<u64>,
    },
    #[serde(rename_all = "PascalCase")]
    Lock {
        key: String,
        value: String,
        session: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        flags: Option<u64>,
    },
    #[serde(rename_all = "PascalCase")]
    Unlock {
        key: String,
        value: String,
        session: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        flags: Option<u64>,
    },
    #[serde(rename_all = "PascalCase")]
    Get { key: String },
    #[serde(rename_all = "PascalCase")]
    GetTree { key: String },
    #[serde(rename_all = "PascalCase")]
    CheckIndex { key: String, index: u64 },
    #[serde(rename_all = "PascalCase")]
    CheckSession { key: String, session: String },
    #[serde(rename_all = "PascalCase")]
    CheckNotExists { key: String },
    #[serde(rename_all = "PascalCase")]
    Delete { key: String },
    #[serde(rename_all = "PascalCase")]
    DeleteTree { key: String },
    #[serde(rename_all = "PascalCase")]
    DeleteCas { key: String, index: u64 },
}

impl TxnOp {
    /// Read a single key
    pub fn kv_get(key: impl Into<String>) -> Self {
        TxnOp::Kv(KvOp::Get { key: key.into() })
    }

    /// Key the operation targets
    pub fn key(&self) -> &str {
        match self {
            TxnOp::Kv(op) => op.key(),
        }
    }
}

impl KvOp {
    pub fn key(&self) -> &str {
        match self {
            KvOp::Set { key, .. }
            | KvOp::Cas { key, .. }
            | KvOp::Lock { key, .. }
            | KvOp::Unlock { key, .. }
            | KvOp::Get { key }
            | KvOp::GetTree { key }
            | KvOp::CheckIndex { key, .. }
            | KvOp::CheckSession { key, .. }
            | KvOp::CheckNotExists { key }
            | KvOp::Delete { key }
            | KvOp::DeleteTree { key }
            | KvOp::DeleteCas { key, .. } => key,
        }
    }
}
