pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod repository;
pub mod service;
pub mod settings;
pub mod validation;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use handlers::{create_booking, create_class, healthz_live, healthz_ready, root};
use tower_http::LatencyUnit;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::panic_response;
use crate::openapi::ApiDoc;
use crate::repository::{InMemoryBookingStore, InMemoryClassStore};
use crate::service::{ClassService, SchedulingService};
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub service: Arc<dyn SchedulingService>,
}

impl AppState {
    /// State backed by fresh in-memory stores.
    pub fn in_memory(settings: Settings) -> Self {
        let service = ClassService::new(
            Arc::new(InMemoryClassStore::new()),
            Arc::new(InMemoryBookingStore::new()),
        );
        Self {
            settings,
            service: Arc::new(service),
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let state = AppState::in_memory(settings);
    let app = build_router(state.clone());

    let host: IpAddr = state.settings.host.parse()?;
    let addr = SocketAddr::new(host, state.settings.port);
    info!("Starting Class Booking API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/classes", post(create_class))
        .route("/bookings", post(create_booking))
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    if state.settings.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(CatchPanicLayer::custom(panic_response)).layer(trace_layer)
}
