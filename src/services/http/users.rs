use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use tokio::sync::oneshot;

use super::{channel_error, reply, AppState, Caller};
use crate::models::users::UserProfile;
use crate::models::Identity;
use crate::services::users::UserRequest;

pub async fn get_caller_profile(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_channel
        .send(UserRequest::GetCallerProfile {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn save_caller_profile(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(profile): Json<UserProfile>,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_channel
        .send(UserRequest::SaveCallerProfile {
            caller,
            profile,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn get_user_profile(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(target): Path<Identity>,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_channel
        .send(UserRequest::GetProfile {
            caller,
            target,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn get_all_profiles(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_channel
        .send(UserRequest::GetAllProfiles {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn get_balances(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_channel
        .send(UserRequest::GetBalances {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn link_telegram(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_channel
        .send(UserRequest::LinkTelegram {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn get_telegram_link(State(state): State<AppState>) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .user_channel
        .send(UserRequest::GetTelegramLink { response: tx })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}
