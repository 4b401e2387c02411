// Route table and the per-request dispatch pipeline.
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::Router;
use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{extract_auth_header, is_authorized};
use crate::error::ApiError;
use crate::handlers;
use crate::store::{AccessLevel, Store};
use crate::validate::{validation_errors, API_KEY_SHAPE, FLAG_SHAPE};

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared handle to the single mutable application aggregate.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    /// Whether disabled API keys are rejected by the authorizer.
    pub enforce_key_enabled: bool,
}

impl AppState {
    pub fn new(store: Store, enforce_key_enabled: bool) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            enforce_key_enabled,
        }
    }
}

/// Parsed request material handed to a route handler: the validated JSON body
/// (or `None` for bodyless routes) and the decoded query parameters.
pub struct RequestInput {
    pub body: Option<Value>,
    pub query: HashMap<String, String>,
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Response, ApiError>> + Send>>;
pub type Handler = fn(AppState, RequestInput) -> HandlerFuture;

/// One registered route: exact (path, method) match, the tier it requires,
/// an optional body shape, and the handler to invoke.
pub struct ApiRoute {
    pub path: &'static str,
    pub method: Method,
    pub level: AccessLevel,
    pub data_shape: Option<&'static Lazy<Validator>>,
    pub handler: Handler,
}

pub static ROUTES: &[ApiRoute] = &[
    ApiRoute {
        path: "/admin/keys",
        method: Method::GET,
        level: AccessLevel::Admin,
        data_shape: None,
        handler: handlers::keys_list,
    },
    ApiRoute {
        path: "/admin/keys",
        method: Method::POST,
        level: AccessLevel::Admin,
        data_shape: Some(&API_KEY_SHAPE),
        handler: handlers::keys_add,
    },
    ApiRoute {
        path: "/admin/keys",
        method: Method::DELETE,
        level: AccessLevel::Admin,
        data_shape: None,
        handler: handlers::keys_remove,
    },
    ApiRoute {
        path: "/flags",
        method: Method::GET,
        level: AccessLevel::Read,
        data_shape: None,
        handler: handlers::flags_list,
    },
    ApiRoute {
        path: "/flags",
        method: Method::POST,
        level: AccessLevel::Write,
        data_shape: Some(&FLAG_SHAPE),
        handler: handlers::flags_add,
    },
    ApiRoute {
        path: "/flag",
        method: Method::GET,
        level: AccessLevel::Read,
        data_shape: None,
        handler: handlers::flag_check,
    },
];

/// Build the application router. Matching and authorization live in the
/// dispatcher; axum supplies HTTP framing and the global middleware only.
pub fn app(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    match route(state, request).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

/// The per-request state machine, terminal at the first applicable exit:
/// extract credential (401), match route (404), authorize (403), validate
/// body (400), then invoke the handler.
async fn route(state: AppState, request: Request) -> Result<Response, ApiError> {
    let presented = extract_auth_header(request.headers())
        .ok_or(ApiError::Unauthenticated)?
        .to_string();

    let path = request.uri().path().to_string();
    let method = request.method().clone();
    let query = parse_query(request.uri().query());

    let matching = ROUTES
        .iter()
        .find(|r| r.path == path && r.method == method)
        .ok_or_else(|| ApiError::NoRoute {
            path: path.clone(),
            method: method.to_string(),
        })?;

    {
        let store = state.store.read().await;
        if !is_authorized(
            &presented,
            matching.level,
            &store.data,
            state.enforce_key_enabled,
        ) {
            return Err(ApiError::Forbidden);
        }
    }

    let body = match matching.data_shape {
        Some(shape) if method == Method::POST || method == Method::PATCH => {
            Some(read_validated_body(request, shape).await?)
        }
        _ => None,
    };

    (matching.handler)(state, RequestInput { body, query }).await
}

async fn read_validated_body(
    request: Request,
    shape: &Lazy<Validator>,
) -> Result<Value, ApiError> {
    let bytes = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to read request body: {e}")))?;
    if bytes.is_empty() {
        return Err(ApiError::MissingBody);
    }
    let payload: Value = serde_json::from_slice(&bytes).map_err(|e| {
        ApiError::InvalidBody(vec![serde_json::json!({
            "path": "$",
            "message": format!("invalid JSON: {e}"),
        })])
    })?;
    let errors = validation_errors(shape, &payload);
    if !errors.is_empty() {
        return Err(ApiError::InvalidBody(errors));
    }
    Ok(payload)
}

fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    match query {
        Some(q) => url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect(),
        None => HashMap::new(),
    }
}
