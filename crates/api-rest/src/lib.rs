//! # API REST
//!
//! REST API for the discharge assistant.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - Bearer session restoration and per-session conversation context
//!
//! Uses `api-shared` for wire types and `mail-relay` for email commands.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod conversations;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use conversations::ConversationStore;
use discharge_core::{Assistant, DischargeWorkflow};
use mail_relay::MailRelayClient;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::RestConfig;

/// Shared state for the REST handlers.
///
/// The assistant is read-only. The workflow and the conversation map are mutated under their
/// locks; neither lock is held across an await.
#[derive(Clone)]
pub struct AppState {
    pub(crate) assistant: Arc<Assistant>,
    pub(crate) workflow: Arc<Mutex<DischargeWorkflow>>,
    /// Conversation context per session subject, bounded.
    pub(crate) conversations: Arc<Mutex<ConversationStore>>,
    pub(crate) mail_relay: MailRelayClient,
    pub(crate) chat_delay: Duration,
    pub(crate) login_delay: Duration,
    clock: fn() -> DateTime<Utc>,
}

impl AppState {
    pub fn new(
        assistant: Assistant,
        workflow: DischargeWorkflow,
        mail_relay: MailRelayClient,
        chat_delay: Duration,
        login_delay: Duration,
    ) -> Self {
        Self {
            assistant: Arc::new(assistant),
            workflow: Arc::new(Mutex::new(workflow)),
            conversations: Arc::new(Mutex::new(ConversationStore::default())),
            mail_relay,
            chat_delay,
            login_delay,
            clock: Utc::now,
        }
    }

    /// Builds the state from startup configuration: roster, seeded workflow and relay client.
    pub fn from_config(cfg: &RestConfig) -> anyhow::Result<Self> {
        let registry = cfg.core.load_registry(Utc::now().date_naive())?;
        let mail_relay = MailRelayClient::new(&cfg.mail_relay_url, cfg.mail_relay_timeout)?;
        Ok(Self::new(
            Assistant::new(&registry),
            DischargeWorkflow::seed(),
            mail_relay,
            cfg.chat_delay,
            cfg.login_delay,
        ))
    }

    /// Caps the number of conversations kept at once.
    pub fn with_conversation_capacity(mut self, capacity: usize) -> Self {
        self.conversations = Arc::new(Mutex::new(ConversationStore::new(capacity)));
        self
    }

    /// Replaces the wall clock, for reproducible reports.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::login,
        handlers::current_session,
        handlers::list_patients,
        handlers::get_patient,
        handlers::analytics,
        handlers::chat,
        handlers::list_discharge_requests,
        handlers::approve_discharge_request,
        handlers::reject_discharge_request,
        handlers::audit_log,
    ),
    components(schemas(
        api_shared::dto::HealthRes,
        api_shared::dto::LoginReq,
        api_shared::dto::LoginRes,
        api_shared::dto::SessionRes,
        api_shared::dto::PatientRes,
        api_shared::dto::ListPatientsRes,
        api_shared::dto::InsightRes,
        api_shared::dto::AnalyticsRes,
        api_shared::dto::ChatReq,
        api_shared::dto::ChatRes,
        api_shared::dto::EntityRes,
        api_shared::dto::DischargeRequestRes,
        api_shared::dto::ListDischargeRequestsRes,
        api_shared::dto::AuditEventRes,
        api_shared::dto::ListAuditRes,
    ))
)]
pub struct ApiDoc;

/// All routes plus Swagger UI, with permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(handlers::login))
        .route("/auth/session", get(handlers::current_session))
        .route("/patients", get(handlers::list_patients))
        .route("/patients/:id", get(handlers::get_patient))
        .route("/analytics", get(handlers::analytics))
        .route("/chat", post(handlers::chat))
        .route("/discharge-requests", get(handlers::list_discharge_requests))
        .route(
            "/discharge-requests/:id/approve",
            post(handlers::approve_discharge_request),
        )
        .route(
            "/discharge-requests/:id/reject",
            post(handlers::reject_discharge_request),
        )
        .route("/audit", get(handlers::audit_log))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `cfg.addr` and serves until the process stops.
pub async fn serve(cfg: RestConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&cfg)?;
    let app = router(state);

    tracing::info!("-- Starting discharge assistant REST API on {}", cfg.addr);
    let listener = tokio::net::TcpListener::bind(&cfg.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
