use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::repositories::approvals::ApprovalRepository;
use crate::repositories::mining::MiningRepository;
use crate::repositories::transactions::TransactionRepository;
use crate::repositories::users::UserRepository;
use crate::repositories::LedgerError;
use crate::settings::Settings;
use crate::utils::{SharedClock, SystemClock};

mod approvals;
mod http;
mod mining;
mod users;
mod withdrawals;

#[derive(Debug, thiserror::Error)]
enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Permission denied: admin role required")]
    PermissionDenied,
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

pub async fn start_services(settings: Settings) -> Result<(), anyhow::Error> {
    let clock: SharedClock = std::sync::Arc::new(SystemClock);

    let user_repository = UserRepository::new();
    let approval_repository = ApprovalRepository::new(&settings.admin.identity);
    let mining_repository = MiningRepository::new();
    let transaction_repository = TransactionRepository::new();

    let (user_tx, mut user_rx) = mpsc::channel(512);
    let (approval_tx, mut approval_rx) = mpsc::channel(512);
    let (mining_tx, mut mining_rx) = mpsc::channel(512);
    let (withdrawal_tx, mut withdrawal_rx) = mpsc::channel(512);

    let mut user_service = users::UserService::new();
    let mut approval_service = approvals::ApprovalService::new();
    let mut mining_service = mining::MiningService::new();
    let mut withdrawal_service = withdrawals::WithdrawalService::new();

    log::info!("Starting user service.");
    let user_handler = users::UserRequestHandler::new(
        user_repository.clone(),
        approval_repository.clone(),
        settings.telegram.link.clone(),
    );
    tokio::spawn(async move {
        user_service.run(user_handler, &mut user_rx).await;
    });

    log::info!("Starting approval service.");
    let approval_handler = approvals::ApprovalRequestHandler::new(approval_repository.clone());
    tokio::spawn(async move {
        approval_service.run(approval_handler, &mut approval_rx).await;
    });

    log::info!("Starting mining service.");
    let mining_handler = mining::MiningRequestHandler::new(
        mining_repository.clone(),
        user_repository.clone(),
        approval_repository.clone(),
        clock.clone(),
    );
    mining_handler.start_settlement_sweep();
    tokio::spawn(async move {
        mining_service.run(mining_handler, &mut mining_rx).await;
    });

    log::info!("Starting withdrawal service.");
    let withdrawal_handler = withdrawals::WithdrawalRequestHandler::new(
        transaction_repository,
        user_repository,
        approval_repository,
    );
    tokio::spawn(async move {
        withdrawal_service
            .run(withdrawal_handler, &mut withdrawal_rx)
            .await;
    });

    log::info!("Starting HTTP server.");
    http::start_http_server(
        user_tx,
        approval_tx,
        mining_tx,
        withdrawal_tx,
        &settings.server,
    )
    .await?;

    Ok(())
}
