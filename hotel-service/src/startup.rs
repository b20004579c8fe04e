//! Application startup and lifecycle management.

use crate::config::{HotelConfig, ReservationGuard};
use crate::handlers::{hotels, reservations, rooms};
use crate::services::{
    get_metrics, init_metrics, BookingEngine, Database, HealthCheck, HotelService, HotelStore,
    ReservationStore, RoomService, RoomStore,
};
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::panic::panic_response;
use service_core::middleware::tracing::{http_span, request_id_middleware};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub request_timeout: Duration,
    pub health: Arc<dyn HealthCheck>,
    pub hotels: HotelService,
    pub rooms: RoomService,
    pub bookings: BookingEngine,
}

impl AppState {
    /// Wire every service to one store implementing all capabilities.
    pub fn new<S>(
        service_name: impl Into<String>,
        request_timeout: Duration,
        guard: ReservationGuard,
        store: Arc<S>,
    ) -> Self
    where
        S: HealthCheck + HotelStore + RoomStore + ReservationStore + 'static,
    {
        let hotel_store: Arc<dyn HotelStore> = store.clone();
        let room_store: Arc<dyn RoomStore> = store.clone();
        let reservation_store: Arc<dyn ReservationStore> = store.clone();

        Self {
            service_name: service_name.into(),
            request_timeout,
            health: store,
            hotels: HotelService::new(hotel_store.clone()),
            rooms: RoomService::new(room_store.clone(), hotel_store.clone()),
            bookings: BookingEngine::new(hotel_store, room_store, reservation_store, guard),
        }
    }
}

/// Health check endpoint for Docker/K8s liveness probes.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.health.health_check().await {
        Ok(_) => {
            tracing::debug!("Health check passed");
            (
                StatusCode::OK,
                Json(json!({
                    "status": "ok",
                    "service": state.service_name,
                    "version": env!("CARGO_PKG_VERSION")
                })),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed - database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": state.service_name,
                    "error": e.to_string()
                })),
            )
        }
    }
}

/// Readiness check endpoint for K8s readiness probes.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.health.health_check().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Metrics endpoint for Prometheus scraping.
async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

/// HTTP routes: `/api/v1` resources plus health and metrics.
pub fn build_router(state: AppState) -> Router {
    let timeout = state.request_timeout;

    let api = Router::new()
        .route(
            "/hotels",
            post(hotels::create_hotel).get(hotels::list_hotels),
        )
        .route(
            "/hotels/:id",
            get(hotels::get_hotel)
                .put(hotels::update_hotel)
                .delete(hotels::delete_hotel),
        )
        .route("/rooms", post(rooms::create_room))
        .route("/rooms/available", get(rooms::available_rooms))
        .route("/rooms/hotel/:hotel_id", get(rooms::list_rooms_by_hotel))
        .route(
            "/rooms/:id",
            get(rooms::get_room)
                .put(rooms::update_room)
                .delete(rooms::delete_room),
        )
        .route("/reservations", post(reservations::create_reservation))
        .route("/reservations/user/:user_id", get(reservations::list_by_user))
        .route("/reservations/room/:room_id", get(reservations::list_by_room))
        .route(
            "/reservations/:id",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .delete(reservations::cancel_reservation),
        )
        .route("/reservations/:id/status", put(reservations::update_status));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", api)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http().make_span_with(http_span::<axum::body::Body>))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    /// Connects to PostgreSQL, applies pending migrations and binds the listeners.
    pub async fn build(config: HotelConfig) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(&config.database).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        db.run_migrations().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            e
        })?;

        let state = AppState::new(
            config.service_name.clone(),
            Duration::from_secs(config.request_timeout_secs),
            config.reservation_guard,
            Arc::new(db),
        );

        let addr = config.common.socket_addr(config.common.port);
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port = port,
            reservation_guard = %config.reservation_guard,
            "Hotel service listener bound"
        );

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until `shutdown` resolves, then finish in-flight requests.
    pub async fn run_until_stopped<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state.clone());

        tracing::info!(
            service = %self.state.service_name,
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "HTTP server error");
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
