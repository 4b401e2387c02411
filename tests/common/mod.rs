#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use flagpost::routes::{app, AppState};
use flagpost::store::{
    AccessLevel, ApiKey, AppData, Flag, FlagData, FlagPart, FlagVariant, Store,
};

pub const ADMIN_KEY: &str = "admin-key";
pub const WRITE_KEY: &str = "write-key";
pub const READ_KEY: &str = "read-key";

pub fn api_key(key: &str, access_level: AccessLevel, enabled: bool) -> ApiKey {
    ApiKey {
        key: key.into(),
        access_level,
        enabled,
    }
}

/// The flag from the spec scenarios: blue (default) is off for everyone,
/// green is on for the "beta" audience.
pub fn beta_flag(tag: &str) -> Flag {
    Flag {
        tag: tag.into(),
        name: "Beta rollout".into(),
        description: "Green variant for the beta audience".into(),
        enabled: true,
        data: FlagData {
            blue: FlagPart {
                value: false,
                name: "blue".into(),
                description: "default off".into(),
                applies_to: vec![],
            },
            green: FlagPart {
                value: true,
                name: "green".into(),
                description: "beta on".into(),
                applies_to: vec!["beta".into()],
            },
            default_variant: FlagVariant::Blue,
        },
    }
}

pub fn seeded_data() -> AppData {
    AppData {
        flags: vec![beta_flag("checkout")],
        api_keys: vec![
            api_key(ADMIN_KEY, AccessLevel::Admin, true),
            api_key(WRITE_KEY, AccessLevel::Write, true),
            api_key(READ_KEY, AccessLevel::Read, true),
        ],
    }
}

/// Build an in-process app over a temp-file store seeded with `data`.
/// The TempDir must stay alive for the duration of the test.
pub fn test_app(data: AppData) -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = Store::load(dir.path().join("data.json"));
    store.data = data;
    store.persist().expect("seed data should persist");
    (app(AppState::new(store, false)), dir)
}

/// Send one request through the router and decode the response. A missing
/// body comes back as `Value::Null`.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = auth {
        builder = builder.header(header::AUTHORIZATION, key);
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("dispatch");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, value)
}
