use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tokio::sync::oneshot;

use super::{channel_error, reply, AppState, Caller};
use crate::services::mining::MiningRequest;

#[derive(Deserialize)]
pub struct StartMiningBody {
    pub duration: u64,
}

pub async fn start_mining(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<StartMiningBody>,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .mining_channel
        .send(MiningRequest::StartMining {
            caller,
            duration_days: body.duration,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn get_tasks(State(state): State<AppState>, Caller(caller): Caller) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .mining_channel
        .send(MiningRequest::GetTasks {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn get_all_tasks(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .mining_channel
        .send(MiningRequest::GetAllTasks {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}
