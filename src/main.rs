use flagpost::config::config;
use flagpost::routes::{app, AppState};
use flagpost::store::Store;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up FEATURE_FLAG_ADMIN_KEY etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config();

    let mut store = Store::load(&config.data_file);
    match store.bootstrap_admin_key(config.admin_key.as_deref()) {
        Ok(Some(key)) => {
            // Intentionally printed: without this key a fresh install is
            // unreachable.
            tracing::info!("no API keys found; bootstrap admin key: {}", key);
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("failed to persist bootstrap admin key: {}", e);
            std::process::exit(1);
        }
    }

    let state = AppState::new(store, config.enforce_key_enabled);
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("feature flag server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
