// One handler per registered route. Handlers are thin: they parse the
// already-validated body, touch the store, and shape the response.
use axum::response::{IntoResponse, Json};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::flag::evaluate;
use crate::routes::{AppState, HandlerFuture, RequestInput};
use crate::store::{ApiKey, Flag};

/// Bridge from the schema-validated JSON body to a typed struct. The shapes
/// in `validate` mirror these types, so a failure here means the two drifted.
fn parse_body<T: DeserializeOwned>(body: Option<Value>) -> Result<T, ApiError> {
    let value = body.ok_or(ApiError::MissingBody)?;
    serde_json::from_value(value).map_err(|e| {
        ApiError::InvalidBody(vec![json!({ "path": "$", "message": e.to_string() })])
    })
}

/// GET /admin/keys - list all API keys, credentials included.
pub fn keys_list(state: AppState, _input: RequestInput) -> HandlerFuture {
    Box::pin(async move {
        let store = state.store.read().await;
        Ok(Json(store.data.api_keys.clone()).into_response())
    })
}

/// POST /admin/keys - append an API key and persist.
pub fn keys_add(state: AppState, input: RequestInput) -> HandlerFuture {
    Box::pin(async move {
        let key: ApiKey = parse_body(input.body)?;
        let mut store = state.store.write().await;
        store.data.api_keys.push(key);
        store.persist()?;
        Ok(Json(json!({ "message": "Api key added" })).into_response())
    })
}

/// DELETE /admin/keys?key=K - remove an API key by credential.
pub fn keys_remove(state: AppState, input: RequestInput) -> HandlerFuture {
    Box::pin(async move {
        let Some(key) = input.query.get("key").cloned() else {
            return Err(ApiError::not_found(json!({ "message": "No api key provided" })));
        };
        let mut store = state.store.write().await;
        let before = store.data.api_keys.len();
        store.data.api_keys.retain(|entry| entry.key != key);
        if store.data.api_keys.len() == before {
            return Err(ApiError::not_found(json!({
                "message": "Api key not found",
                "key": key,
            })));
        }
        store.persist()?;
        Ok(Json(json!({ "message": "Api key removed", "key": key })).into_response())
    })
}

/// GET /flags - list all flags.
pub fn flags_list(state: AppState, _input: RequestInput) -> HandlerFuture {
    Box::pin(async move {
        let store = state.store.read().await;
        Ok(Json(store.data.flags.clone()).into_response())
    })
}

/// POST /flags - append a flag and persist.
pub fn flags_add(state: AppState, input: RequestInput) -> HandlerFuture {
    Box::pin(async move {
        let flag: Flag = parse_body(input.body)?;
        let mut store = state.store.write().await;
        store.data.flags.push(flag);
        store.persist()?;
        Ok(Json(json!({ "message": "Flag added" })).into_response())
    })
}

/// GET /flag?tag=T&target=X - evaluate a flag for an optional target.
pub fn flag_check(state: AppState, input: RequestInput) -> HandlerFuture {
    Box::pin(async move {
        let Some(tag) = input.query.get("tag") else {
            return Err(ApiError::not_found(json!({ "message": "No flag tag provided" })));
        };
        let store = state.store.read().await;
        let Some(flag) = store.data.flags.iter().find(|f| &f.tag == tag) else {
            return Err(ApiError::not_found(json!({
                "message": "Flag not found",
                "tag": tag,
            })));
        };
        let value = evaluate(flag, input.query.get("target").map(String::as_str));
        Ok(Json(json!({ "tag": tag, "value": value })).into_response())
    })
}
