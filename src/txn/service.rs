use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use super::TxnDispatcher;
use super::TxnOp;
use super::TxnQuery;
use super::TxnResult;
use crate::constants::CONSUL_VERSION_PATH;
use crate::constants::TXN_SERVICE_PATH;
use crate::request::resolve_path;
use crate::request::Method;
use crate::request::RequestBase;
use crate::request::RequestHandler;
use crate::ClientConfig;
use crate::DispatchError;
use crate::Result;

/// [`TxnDispatcher`] backed by the Consul `/v1/txn` endpoint.
///
/// Every batch becomes one `PUT /v1/txn` request whose body is the JSON array
/// of operations. The response body must be a JSON array.
pub struct TxnService<H: RequestHandler> {
    base: RequestBase,
    path: String,
    handler: Arc<H>,
}

impl<H: RequestHandler> TxnService<H> {
    pub fn new(
        config: &ClientConfig,
        handler: Arc<H>,
    ) -> Self {
        Self {
            base: RequestBase::from_config(config),
            path: resolve_path(CONSUL_VERSION_PATH, TXN_SERVICE_PATH, ""),
            handler,
        }
    }
}

#[async_trait]
impl<H: RequestHandler> TxnDispatcher for TxnService<H> {
    async fn dispatch(
        &self,
        batch: Vec<TxnOp>,
        query: &TxnQuery,
    ) -> Result<Vec<TxnResult>> {
        let options = self.base.resolve(Method::Put, &self.path, &query.to_pairs());
        let body = serde_json::to_value(&batch)?;
        trace!(path = %options.path, ops = batch.len(), "sending transaction");

        let response = self.handler.handle(options, Some(body)).await?;
        into_results(response)
    }
}

/// Accept either a bare result array or Consul's `{"Results": [..], "Errors": ..}` envelope
fn into_results(response: Value) -> Result<Vec<TxnResult>> {
    match response {
        Value::Array(results) => Ok(results),
        Value::Object(mut body) => {
            if let Some(errors) = body.get("Errors").filter(|e| !is_empty_json(e)) {
                return Err(DispatchError::Transport(format!("transaction rejected: {}", errors)).into());
            }
            match body.remove("Results") {
                Some(Value::Array(results)) => Ok(results),
                Some(Value::Null) | None => Ok(Vec::new()),
                Some(other) => Err(DispatchError::InvalidResponse(format!(
                    "expected an array of results, got {}",
                    other
                ))
                .into()),
            }
        }
        other => Err(DispatchError::InvalidResponse(format!(
            "expected an array of results, got {}",
            other
        ))
        .into()),
    }
}

fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
