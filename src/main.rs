//! Chat Courier server binary.
//!
//! Loads configuration, wires the adapters to the correlation core, and
//! serves the relay API.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::{middleware, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use chat_courier::adapters::auth::InMemoryApiKeyStore;
use chat_courier::adapters::http::middleware::{api_key_middleware, ApiKeyState};
use chat_courier::adapters::http::relay::{health_router, relay_router, RelayAppState};
use chat_courier::adapters::log_sink::{NoopLogSink, TracingLogSink};
use chat_courier::adapters::preamble::FilePreambleSource;
use chat_courier::adapters::transport::{
    ChatBackendConfig, FileCredentialProvider, HttpChatTransport,
};
use chat_courier::application::{DispatchQueue, RelayService};
use chat_courier::config::AppConfig;
use chat_courier::domain::correlation::{CorrelationEngine, EngineConfig};
use chat_courier::domain::foundation::GroupId;
use chat_courier::ports::LogSink;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server.log_level);

    let app = build_app(&config)?;
    let addr = config.server.socket_addr()?;

    tracing::info!(%addr, environment = ?config.server.environment, "chat-courier listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_app(config: &AppConfig) -> Result<Router, Box<dyn Error>> {
    let credentials = Arc::new(FileCredentialProvider::new(
        &config.transport.username,
        config.transport.password.clone(),
        &config.transport.session_file,
    ));
    let backend_config = ChatBackendConfig::new(&config.transport.base_url)
        .with_session_ttl(chrono::Duration::hours(
            config.transport.session_ttl_hours as i64,
        ))
        .with_timeout(Duration::from_secs(config.transport.request_timeout_secs));
    let transport = Arc::new(HttpChatTransport::new(backend_config, credentials)?);

    let engine = CorrelationEngine::new(
        transport.clone(),
        EngineConfig::new()
            .with_reply_timeout(Duration::from_secs(config.relay.reply_timeout_secs))
            .with_poll_interval(Duration::from_millis(config.relay.poll_interval_ms)),
    );
    let dispatch = DispatchQueue::spawn(
        transport.clone(),
        config.dispatch.queue_capacity,
        Duration::from_secs(config.dispatch.send_spacing_secs),
    );

    let preambles = Arc::new(FilePreambleSource::new(
        &config.relay.prompt_path,
        &config.relay.instructions_path,
    ));
    let log_sink: Arc<dyn LogSink> = if config.relay.log_exchanges {
        Arc::new(TracingLogSink::new())
    } else {
        Arc::new(NoopLogSink::new())
    };

    let service = RelayService::new(
        engine,
        dispatch,
        transport,
        preambles,
        log_sink,
        GroupId::new(&config.relay.group_id)?,
    );
    let state = RelayAppState::new(Arc::new(service));

    let key_store = InMemoryApiKeyStore::with_keys(config.server.api_keys_list());
    if key_store.is_empty() {
        // Development convenience: validation already requires configured
        // keys in production.
        let key = key_store.generate();
        tracing::warn!(%key, "no API keys configured, generated a temporary key");
    }
    let validator: ApiKeyState = Arc::new(key_store);

    let app = relay_router()
        .layer(middleware::from_fn_with_state(validator, api_key_middleware))
        .merge(health_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(config));

    Ok(app)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "skipping unparseable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    }
}

fn init_tracing(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .unwrap_or_else(|err| tracing::error!(error = %err, "failed to install ctrl-c handler"));
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
