use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tokio::sync::oneshot;

use super::{channel_error, reply, AppState, Caller};
use crate::models::users::{ApprovalStatus, UserRole};
use crate::models::Identity;
use crate::services::approvals::ApprovalRequest;

#[derive(Deserialize)]
pub struct RoleBody {
    pub role: UserRole,
}

#[derive(Deserialize)]
pub struct AssignRoleBody {
    pub identity: Identity,
    pub role: UserRole,
}

#[derive(Deserialize)]
pub struct SetApprovalBody {
    pub identity: Identity,
    pub status: ApprovalStatus,
}

pub async fn request_approval(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .approval_channel
        .send(ApprovalRequest::RequestApproval {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn is_approved(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .approval_channel
        .send(ApprovalRequest::IsApproved {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn is_admin(State(state): State<AppState>, Caller(caller): Caller) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .approval_channel
        .send(ApprovalRequest::IsAdmin {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn get_role(State(state): State<AppState>, Caller(caller): Caller) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .approval_channel
        .send(ApprovalRequest::GetRole {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn assign_own_role(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<RoleBody>,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .approval_channel
        .send(ApprovalRequest::AssignOwnRole {
            caller,
            role: body.role,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn assign_role(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<AssignRoleBody>,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .approval_channel
        .send(ApprovalRequest::AssignRole {
            caller,
            target: body.identity,
            role: body.role,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn list_approvals(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .approval_channel
        .send(ApprovalRequest::ListApprovals {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn set_approval(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<SetApprovalBody>,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .approval_channel
        .send(ApprovalRequest::SetApproval {
            caller,
            target: body.identity,
            status: body.status,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}
