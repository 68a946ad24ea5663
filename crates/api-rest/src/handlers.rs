//! HTTP handlers.
//!
//! Every handler except `health` and `login` expects an `Authorization: Bearer <token>` header.
//! Failures come back as `(StatusCode, String)`.

use crate::AppState;
use api_shared::dto::{
    AnalyticsRes, AuditEventRes, ChatReq, ChatRes, DischargeRequestRes, HealthRes,
    ListAuditRes, ListDischargeRequestsRes, ListPatientsRes, LoginReq, LoginRes, PatientRes,
    SessionRes,
};
use api_shared::{session_from_authorization, HealthService};
use axum::{
    extract::{Path as AxumPath, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::Json,
};
use discharge_core::assistant::{sending_notice, MISSING_STAFF_NAME_MESSAGE};
use discharge_core::constants::VIEW_PATIENT_RECORDS;
use discharge_core::{
    ChatCommand, DischargeError, DischargeStatus, DischargeWorkflow, RequestStatus, Role,
    RosterSummary, Session,
};
use serde::Deserialize;
use std::sync::{Mutex, MutexGuard};
use utoipa::IntoParams;

pub type ApiError = (StatusCode, String);

/// Intent label reported for chat lines handled by the mail relay.
pub const EMAIL_COMMAND_INTENT: &str = "email_command";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusFilter {
    /// Only return entries with this status.
    pub status: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

fn core_error(err: DischargeError) -> ApiError {
    let status = match &err {
        DischargeError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        DischargeError::RequestNotFound(_) | DischargeError::PatientNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        DischargeError::NotPending { .. } => StatusCode::CONFLICT,
        DischargeError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
        DischargeError::UnknownRole(_)
        | DischargeError::InvalidInput(_)
        | DischargeError::Text(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("request failed: {:?}", err);
        (status, "Internal error".into())
    } else {
        tracing::warn!(status = status.as_u16(), "request refused: {err}");
        (status, err.to_string())
    }
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    session_from_authorization(header, state.now()).map_err(|e| {
        tracing::warn!("rejected bearer token: {e}");
        (StatusCode::UNAUTHORIZED, e.to_string())
    })
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ApiError> {
    mutex.lock().map_err(|_| {
        tracing::error!("shared state lock poisoned");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
    })
}

fn email_reply(response: String) -> ChatRes {
    ChatRes {
        intent: EMAIL_COMMAND_INTENT.into(),
        confidence: 1.0,
        entities: Vec::new(),
        response,
    }
}

// ============================================================================
// Health and sessions
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Demo session for the chosen role", body = LoginRes),
        (status = 400, description = "Unknown role")
    )
)]
/// Demo login: any of the four roles, no credentials.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> Result<Json<LoginRes>, ApiError> {
    let role: Role = req.role.parse().map_err(core_error)?;
    tokio::time::sleep(state.login_delay).await;

    let session = Session::demo_login(role, state.now());
    let token = session.to_token().map_err(core_error)?;
    tracing::info!(actor = %session.sub, %role, "demo login");

    Ok(Json(LoginRes {
        token,
        session: SessionRes::from(&session),
    }))
}

#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Session restored from the bearer token", body = SessionRes),
        (status = 401, description = "Missing or malformed token")
    )
)]
#[axum::debug_handler]
pub async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionRes>, ApiError> {
    let session = authenticate(&state, &headers)?;
    Ok(Json(SessionRes::from(&session)))
}

// ============================================================================
// Patients and analytics
// ============================================================================

#[utoipa::path(
    get,
    path = "/patients",
    params(StatusFilter),
    responses(
        (status = 200, description = "Roster patients with derived attributes", body = ListPatientsRes),
        (status = 400, description = "Unknown discharge status"),
        (status = 401, description = "Missing or malformed token"),
        (status = 403, description = "Missing view:patient_records")
    )
)]
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<ListPatientsRes>, ApiError> {
    let session = authenticate(&state, &headers)?;
    session.require(VIEW_PATIENT_RECORDS).map_err(core_error)?;

    let status = filter
        .status
        .as_deref()
        .map(str::parse::<DischargeStatus>)
        .transpose()
        .map_err(core_error)?;

    let now = state.now();
    let patients = state
        .assistant
        .patients()
        .iter()
        .filter(|p| status.map_or(true, |s| p.discharge_status == s))
        .map(|p| PatientRes::from_enhanced(p, now))
        .collect();

    Ok(Json(ListPatientsRes { patients }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id, e.g. PT001")),
    responses(
        (status = 200, description = "One patient", body = PatientRes),
        (status = 401, description = "Missing or malformed token"),
        (status = 403, description = "Missing view:patient_records"),
        (status = 404, description = "No such patient")
    )
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<PatientRes>, ApiError> {
    let session = authenticate(&state, &headers)?;
    session.require(VIEW_PATIENT_RECORDS).map_err(core_error)?;

    let patient = state
        .assistant
        .patient(&id)
        .ok_or_else(|| core_error(DischargeError::PatientNotFound(id.clone())))?;
    Ok(Json(PatientRes::from_enhanced(patient, state.now())))
}

#[utoipa::path(
    get,
    path = "/analytics",
    responses(
        (status = 200, description = "Roster summary and insights", body = AnalyticsRes),
        (status = 401, description = "Missing or malformed token")
    )
)]
#[axum::debug_handler]
pub async fn analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalyticsRes>, ApiError> {
    authenticate(&state, &headers)?;
    let summary = RosterSummary::compute(state.assistant.patients(), state.now());
    Ok(Json(AnalyticsRes::from(&summary)))
}

// ============================================================================
// Chat
// ============================================================================

#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatReq,
    responses(
        (status = 200, description = "Assistant or mail relay answer", body = ChatRes),
        (status = 400, description = "Empty message"),
        (status = 401, description = "Missing or malformed token")
    )
)]
/// Answers one chat line.
///
/// Lines mentioning "email" go to the mail relay. Everything else is answered by the assistant
/// after the configured thinking delay, using the caller's conversation context.
#[axum::debug_handler]
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChatReq>,
) -> Result<Json<ChatRes>, ApiError> {
    let session = authenticate(&state, &headers)?;
    let message = req.message.trim();
    if message.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message must not be empty".into()));
    }

    match ChatCommand::parse(message) {
        ChatCommand::SendEmail { staff_name } => {
            tracing::info!(actor = %session.sub, "{}", sending_notice(&staff_name));
            let result = state.mail_relay.send_discharge_email(&staff_name).await;
            Ok(Json(email_reply(mail_relay::chat_message(&result))))
        }
        ChatCommand::MissingStaffName => Ok(Json(email_reply(MISSING_STAFF_NAME_MESSAGE.into()))),
        ChatCommand::Query => {
            tokio::time::sleep(state.chat_delay).await;
            let now = state.now();
            let reply = {
                let mut conversations = lock(&*state.conversations)?;
                let context = conversations.context_mut(&session.sub);
                state.assistant.process(context, message, now)
            };
            Ok(Json(ChatRes::from(reply)))
        }
    }
}

// ============================================================================
// Discharge requests
// ============================================================================

#[utoipa::path(
    get,
    path = "/discharge-requests",
    params(StatusFilter),
    responses(
        (status = 200, description = "Discharge requests and what the caller may do with them", body = ListDischargeRequestsRes),
        (status = 400, description = "Unknown request status"),
        (status = 401, description = "Missing or malformed token")
    )
)]
#[axum::debug_handler]
pub async fn list_discharge_requests(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<ListDischargeRequestsRes>, ApiError> {
    let session = authenticate(&state, &headers)?;
    let status = filter
        .status
        .as_deref()
        .map(str::parse::<RequestStatus>)
        .transpose()
        .map_err(core_error)?;

    let workflow = lock(&*state.workflow)?;
    let requests = workflow
        .list(status)
        .into_iter()
        .map(DischargeRequestRes::from)
        .collect();

    Ok(Json(ListDischargeRequestsRes {
        requests,
        can_approve: DischargeWorkflow::can_approve(&session),
        can_reject: DischargeWorkflow::can_reject(&session),
    }))
}

#[utoipa::path(
    post,
    path = "/discharge-requests/{id}/approve",
    params(("id" = String, Path, description = "Discharge request id")),
    responses(
        (status = 200, description = "Request approved", body = DischargeRequestRes),
        (status = 401, description = "Missing or malformed token"),
        (status = 403, description = "Missing approve:discharge"),
        (status = 404, description = "No such request"),
        (status = 409, description = "Request is no longer pending")
    )
)]
#[axum::debug_handler]
pub async fn approve_discharge_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<DischargeRequestRes>, ApiError> {
    let session = authenticate(&state, &headers)?;
    let mut workflow = lock(&*state.workflow)?;
    let request = workflow
        .approve(&session, &id, state.now())
        .map_err(core_error)?;
    Ok(Json(DischargeRequestRes::from(request)))
}

#[utoipa::path(
    post,
    path = "/discharge-requests/{id}/reject",
    params(("id" = String, Path, description = "Discharge request id")),
    responses(
        (status = 200, description = "Request rejected", body = DischargeRequestRes),
        (status = 401, description = "Missing or malformed token"),
        (status = 403, description = "Missing reject:discharge"),
        (status = 404, description = "No such request"),
        (status = 409, description = "Request is no longer pending")
    )
)]
#[axum::debug_handler]
pub async fn reject_discharge_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<DischargeRequestRes>, ApiError> {
    let session = authenticate(&state, &headers)?;
    let mut workflow = lock(&*state.workflow)?;
    let request = workflow
        .reject(&session, &id, state.now())
        .map_err(core_error)?;
    Ok(Json(DischargeRequestRes::from(request)))
}

#[utoipa::path(
    get,
    path = "/audit",
    responses(
        (status = 200, description = "Approval and rejection attempts, oldest first", body = ListAuditRes),
        (status = 401, description = "Missing or malformed token"),
        (status = 403, description = "Missing view:audit_logs")
    )
)]
#[axum::debug_handler]
pub async fn audit_log(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ListAuditRes>, ApiError> {
    let session = authenticate(&state, &headers)?;
    let workflow = lock(&*state.workflow)?;
    let events = workflow
        .audit_events(&session)
        .map_err(core_error)?
        .iter()
        .map(AuditEventRes::from)
        .collect();
    Ok(Json(ListAuditRes { events }))
}
