// --- File: crates/services/opaylink_backend/src/main.rs ---
use axum::{extract::State, routing::get, Json, Router};
use opaylink_common::{log_error, Context, OpaylinkError};
#[cfg(feature = "opay")]
use opaylink_common::log_result;
use opaylink_config::{load_config, AppConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
#[cfg(feature = "opay")]
use tracing::warn;

#[cfg(feature = "opay")]
use opaylink_opay::{routes as opay_routes, OpayMonitor};

#[axum::debug_handler]
async fn index(State(config): State<Arc<AppConfig>>) -> Json<Value> {
    Json(json!({
        "service": "Opaylink API",
        "opay": config.use_opay,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log_error(e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), OpaylinkError> {
    opaylink_common::init();

    let config = Arc::new(
        load_config().map_err(|e| OpaylinkError::ConfigError(e.to_string()))?,
    );

    let api_router = Router::new()
        .route("/", get(index))
        .with_state(config.clone());

    #[cfg(feature = "opay")]
    let opay_monitor = if opaylink_common::is_opay_enabled(&config) {
        let opay_config = opaylink_config::require_opay(&config)
            .map_err(|e| OpaylinkError::ConfigError(e.to_string()))?;
        let monitor = Arc::new(OpayMonitor::from_config(opay_config).map_err(OpaylinkError::from)?);
        log_result(monitor.start().await, "Opay monitor running", "Opay monitor failed to start")
            .map_err(OpaylinkError::from)?;
        Some(monitor)
    } else {
        warn!("Opay integration disabled (use_opay = false or [opay] missing)");
        None
    };

    let api_router = Router::new().nest("/api", {
        #[allow(unused_mut)] // for the features it needs to be mutable
        let mut router = api_router.merge(opaylink_common::routes());
        #[cfg(feature = "opay")]
        {
            if let Some(monitor) = opay_monitor.as_ref() {
                router = router.merge(opay_routes(config.clone(), monitor.clone()));
            }
        }
        router
    });

    #[allow(unused_mut)]
    let mut app = api_router;

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        #[cfg(feature = "opay")]
        use opaylink_opay::doc::OpayApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Opaylink API",
                version = "0.1.0",
                description = "Opay subscription validation service",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        #[allow(unused_mut)]
        let mut openapi_doc = ApiDoc::openapi();
        #[cfg(feature = "opay")]
        openapi_doc.merge(OpayApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error");

    #[cfg(feature = "opay")]
    {
        if let Some(monitor) = opay_monitor {
            monitor.shutdown().await;
        }
    }

    served
}
