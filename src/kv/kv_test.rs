use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::request::Method;
use crate::request::MockRequestHandler;
use crate::ClientConfig;
use crate::DispatchError;
use crate::Error;
use crate::TokenConfig;
use crate::TokenKind;

fn config(datacenter: Option<&str>) -> ClientConfig {
    ClientConfig {
        host: "consul-server".to_string(),
        port: 8500,
        token: Some(TokenConfig {
            kind: TokenKind::Bearer,
            value: "someToken".to_string(),
        }),
        datacenter: datacenter.map(str::to_string),
    }
}

fn service(handler: MockRequestHandler) -> KvService<MockRequestHandler> {
    KvService::new(&config(None), Arc::new(handler))
}

#[tokio::test]
async fn test_get_decodes_base64_value() {
    let mut handler = MockRequestHandler::new();
    handler
        .expect_handle()
        .times(1)
        .withf(|options, body| {
            options.method == Method::Get
                && options.path == "/v1/kv/app-1/LOGGER_ENABLED?recurse=false"
                && options.headers.get("Authorization").map(String::as_str) == Some("Bearer someToken")
                && body.is_none()
        })
        .returning(|_, _| {
            Ok(json!([{
                "CreateIndex": 100,
                "ModifyIndex": 200,
                "LockIndex": 0,
                "Key": "app-1/LOGGER_ENABLED",
                "Flags": 0,
                "Value": "dHJ1ZQ==",
                "Session": null
            }]))
        });

    let entry = service(handler)
        .get("app-1/LOGGER_ENABLED", &KvQuery::default())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(entry.key, "app-1/LOGGER_ENABLED");
    assert_eq!(entry.value.as_deref(), Some("true"));
    assert_eq!(entry.create_index, 100);
    assert_eq!(entry.modify_index, 200);
    assert_eq!(entry.session, None);
}

#[tokio::test]
async fn test_get_without_value_and_empty_response() {
    let mut handler = MockRequestHandler::new();
    let mut calls = 0;
    handler.expect_handle().times(2).returning(move |_, _| {
        calls += 1;
        if calls == 1 {
            Ok(json!([{ "Key": "folder/", "Value": null }]))
        } else {
            Ok(json!([]))
        }
    });
    let service = service(handler);

    let entry = service.get("folder/", &KvQuery::default()).await.unwrap().unwrap();
    assert_eq!(entry.value, None);

    assert_eq!(service.get("missing", &KvQuery::default()).await.unwrap(), None);
}

#[tokio::test]
async fn test_get_rejects_invalid_base64() {
    let mut handler = MockRequestHandler::new();
    handler
        .expect_handle()
        .returning(|_, _| Ok(json!([{ "Key": "a", "Value": "not base64!" }])));

    let result = service(handler).get("a", &KvQuery::default()).await;

    assert!(matches!(
        result,
        Err(Error::Dispatch(DispatchError::InvalidResponse(_)))
    ));
}

#[tokio::test]
async fn test_get_keys_lists_recursively() {
    let mut handler = MockRequestHandler::new();
    handler
        .expect_handle()
        .withf(|options, _| {
            options.method == Method::Get && options.path == "/v1/kv/app-1?dc=dc2&recurse=true&keys=true"
        })
        .returning(|_, _| Ok(json!(["app-1/a", "app-1/b"])));

    let keys = service(handler)
        .get_keys("/app-1/", &KvQuery::datacenter("dc2"))
        .await
        .unwrap();

    assert_eq!(keys, vec!["app-1/a".to_string(), "app-1/b".to_string()]);
}

#[tokio::test]
async fn test_put_sends_value_and_query() {
    let mut handler = MockRequestHandler::new();
    handler
        .expect_handle()
        .times(1)
        .withf(|options, body| {
            options.method == Method::Put
                && options.path == "/v1/kv/app-1/flag?flags=7&cas=42"
                && body.as_ref() == Some(&json!({ "enabled": true }))
        })
        .returning(|_, _| Ok(json!(true)));

    let query = KvQuery {
        flags: Some(7),
        cas: Some(42),
        ..Default::default()
    };
    let applied = service(handler)
        .put("app-1/flag", json!({ "enabled": true }), &query)
        .await
        .unwrap();

    assert!(applied);
}

#[tokio::test]
async fn test_put_rejects_non_boolean_response() {
    let mut handler = MockRequestHandler::new();
    handler.expect_handle().returning(|_, _| Ok(json!({ "ok": true })));

    let result = service(handler).put("a", json!("v"), &KvQuery::default()).await;

    assert!(matches!(
        result,
        Err(Error::Dispatch(DispatchError::InvalidResponse(_)))
    ));
}

#[tokio::test]
async fn test_delete_and_delete_tree_set_recurse() {
    let mut handler = MockRequestHandler::new();
    handler
        .expect_handle()
        .times(1)
        .withf(|options, _| options.method == Method::Delete && options.path == "/v1/kv/app-1/a?recurse=false")
        .returning(|_, _| Ok(json!(true)));
    handler
        .expect_handle()
        .times(1)
        .withf(|options, _| options.method == Method::Delete && options.path == "/v1/kv/app-1?recurse=true")
        .returning(|_, _| Ok(json!(false)));
    let service = service(handler);

    assert!(service.delete("app-1/a", &KvQuery::default()).await.unwrap());
    assert!(!service.delete_tree("app-1", &KvQuery::default()).await.unwrap());
}

#[tokio::test]
async fn test_configured_datacenter_is_default_for_queries() {
    let mut handler = MockRequestHandler::new();
    handler
        .expect_handle()
        .times(1)
        .withf(|options, _| options.path == "/v1/kv/a?dc=dc1&recurse=false")
        .returning(|_, _| Ok(json!(true)));
    handler
        .expect_handle()
        .times(1)
        .withf(|options, _| options.path == "/v1/kv/a?dc=dc9&recurse=false")
        .returning(|_, _| Ok(json!(true)));
    let service = KvService::new(&config(Some("dc1")), Arc::new(handler));

    service.delete("a", &KvQuery::default()).await.unwrap();
    service.delete("a", &KvQuery::datacenter("dc9")).await.unwrap();
}

#[tokio::test]
async fn test_transport_error_is_propagated() {
    let mut handler = MockRequestHandler::new();
    handler
        .expect_handle()
        .returning(|_, _| Err(DispatchError::Transport("connection refused".to_string()).into()));

    let result = service(handler).get_keys("a", &KvQuery::default()).await;

    assert!(matches!(result, Err(Error::Dispatch(DispatchError::Transport(_)))));
}

#[test]
fn test_query_pairs_keep_only_set_fields() {
    let query = KvQuery {
        ns: Some("team-a".to_string()),
        acquire: Some("session-1".to_string()),
        ..Default::default()
    };
    assert_eq!(
        query.to_pairs(Some("dc1")),
        vec![
            ("dc", "dc1".to_string()),
            ("ns", "team-a".to_string()),
            ("acquire", "session-1".to_string()),
        ]
    );
    assert!(KvQuery::default().to_pairs(None).is_empty());
}
