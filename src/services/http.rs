use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::approvals::ApprovalRequest;
use super::mining::MiningRequest;
use super::users::UserRequest;
use super::withdrawals::WithdrawalRequest;
use super::ServiceError;
use crate::models::Identity;
use crate::repositories::LedgerError;
use crate::settings::Server;

mod approvals;
mod mining;
mod users;
mod withdrawals;

#[derive(Clone)]
struct AppState {
    user_channel: mpsc::Sender<UserRequest>,
    approval_channel: mpsc::Sender<ApprovalRequest>,
    mining_channel: mpsc::Sender<MiningRequest>,
    withdrawal_channel: mpsc::Sender<WithdrawalRequest>,
}

/// Caller identity supplied by the external auth layer in the
/// `x-caller-id` header. The core treats it as opaque.
struct Caller(Identity);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-caller-id")
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(|value| Caller(value.to_string()))
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(json!({"kind": "unauthenticated", "error": "Missing x-caller-id header"})),
            ))
    }
}

/// Failure kinds travel as a machine-readable `kind` next to the message;
/// no client ever has to parse the text.
fn error_response(error: ServiceError) -> (StatusCode, Json<Value>) {
    let (status, kind) = match &error {
        ServiceError::Ledger(LedgerError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
        ServiceError::Ledger(LedgerError::AlreadyExists(_)) => {
            (StatusCode::CONFLICT, "already_exists")
        }
        ServiceError::Ledger(LedgerError::InvalidArgument(_)) => {
            (StatusCode::BAD_REQUEST, "invalid_argument")
        }
        ServiceError::Ledger(LedgerError::InsufficientFunds { .. }) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_funds")
        }
        ServiceError::Ledger(LedgerError::InvalidStateTransition(_)) => {
            (StatusCode::CONFLICT, "invalid_state_transition")
        }
        ServiceError::PermissionDenied => (StatusCode::FORBIDDEN, "permission_denied"),
        ServiceError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    };

    (status, Json(json!({"kind": kind, "error": error.to_string()})))
}

fn channel_error<E: std::fmt::Display>(e: E) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"kind": "internal", "error": format!("Failed to process request: {}", e)})),
    )
}

/// Await the service's oneshot reply and turn it into a JSON response.
async fn reply<T: Serialize>(
    rx: oneshot::Receiver<Result<T, ServiceError>>,
) -> (StatusCode, Json<Value>) {
    match rx.await {
        Ok(Ok(value)) => (StatusCode::OK, Json(json!(value))),
        Ok(Err(error)) => error_response(error),
        Err(e) => channel_error(e),
    }
}

pub async fn start_http_server(
    user_channel: mpsc::Sender<UserRequest>,
    approval_channel: mpsc::Sender<ApprovalRequest>,
    mining_channel: mpsc::Sender<MiningRequest>,
    withdrawal_channel: mpsc::Sender<WithdrawalRequest>,
    server: &Server,
) -> Result<(), anyhow::Error> {
    let app_state = AppState {
        user_channel,
        approval_channel,
        mining_channel,
        withdrawal_channel,
    };

    let app = Router::new()
        .route(
            "/profile",
            get(users::get_caller_profile).post(users::save_caller_profile),
        )
        .route("/profile/{identity}", get(users::get_user_profile))
        .route("/balance", get(users::get_balances))
        .route(
            "/telegram/link",
            get(users::get_telegram_link).post(users::link_telegram),
        )
        .route("/approval/request", post(approvals::request_approval))
        .route("/approval/status", get(approvals::is_approved))
        .route("/role", get(approvals::get_role).post(approvals::assign_own_role))
        .route("/role/admin", get(approvals::is_admin))
        .route("/mining", get(mining::get_tasks).post(mining::start_mining))
        .route(
            "/withdrawals",
            get(withdrawals::get_transactions).post(withdrawals::request_withdrawal),
        )
        .route("/admin/roles", post(approvals::assign_role))
        .route(
            "/admin/approvals",
            get(approvals::list_approvals).post(approvals::set_approval),
        )
        .route("/admin/profiles", get(users::get_all_profiles))
        .route("/admin/mining", get(mining::get_all_tasks))
        .route("/admin/withdrawals", get(withdrawals::get_all_transactions))
        .route(
            "/admin/withdrawals/{id}/approve",
            post(withdrawals::approve_withdrawal),
        )
        .route(
            "/admin/withdrawals/{id}/reject",
            post(withdrawals::reject_withdrawal),
        )
        .route("/health", get(|| async { "OK" }))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", server.host, server.port)).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
