use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use tokio::sync::oneshot;

use super::{channel_error, reply, AppState, Caller};
use crate::models::transactions::NewWithdrawal;
use crate::services::withdrawals::WithdrawalRequest;

pub async fn request_withdrawal(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<NewWithdrawal>,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .withdrawal_channel
        .send(WithdrawalRequest::RequestWithdrawal {
            caller,
            wallet_address: body.wallet_address,
            amount: body.amount,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn get_transactions(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .withdrawal_channel
        .send(WithdrawalRequest::GetTransactions {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn get_all_transactions(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .withdrawal_channel
        .send(WithdrawalRequest::GetAllTransactions {
            caller,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn approve_withdrawal(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(transaction_id): Path<u64>,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .withdrawal_channel
        .send(WithdrawalRequest::Approve {
            caller,
            transaction_id,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}

pub async fn reject_withdrawal(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(transaction_id): Path<u64>,
) -> impl IntoResponse {
    let (tx, rx) = oneshot::channel();
    if let Err(e) = state
        .withdrawal_channel
        .send(WithdrawalRequest::Reject {
            caller,
            transaction_id,
            response: tx,
        })
        .await
    {
        return channel_error(e);
    }
    reply(rx).await
}
