//! Wallet HTTP handlers.
//!
//! This module implements the wallet API endpoints:
//! - POST /api/v1/wallet/create - Create a new wallet
//! - GET /api/v1/wallets/{wallet_id} - Get wallet balance
//! - POST /api/v1/wallet - Deposit into or withdraw from a wallet

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        ledger::{Operation, OperationRequest},
        money,
        wallet::{BalanceResponse, CreateWalletResponse},
    },
    services::wallet_service::{WalletError, WalletService},
};

/// Create a new wallet.
///
/// # Endpoint
///
/// `POST /api/v1/wallet/create`
///
/// The wallet id is generated by the server (UUID v4).
///
/// # Response
///
/// - **Success (201 Created)**: `{"walletID": "550e8400-..."}`
/// - **Error (409)**: Generated id collided with an existing wallet
/// - **Error (500)**: Ledger store error
pub async fn create_wallet(
    State(service): State<WalletService>,
) -> Result<(StatusCode, Json<CreateWalletResponse>), AppError> {
    let wallet_id = Uuid::new_v4();
    service.create_wallet(wallet_id).await?;

    Ok((StatusCode::CREATED, Json(CreateWalletResponse { wallet_id })))
}

/// Get the balance of a wallet.
///
/// # Endpoint
///
/// `GET /api/v1/wallets/{wallet_id}`
///
/// # Response
///
/// - **Success (200 OK)**: `{"wallet_id": "550e8400-...", "balance": 20.5}`
/// - **Error (400)**: `wallet_id` is not a UUID
/// - **Error (404)**: Wallet does not exist
pub async fn get_balance(
    State(service): State<WalletService>,
    Path(wallet_id): Path<String>,
) -> Result<Json<BalanceResponse>, AppError> {
    let wallet_id = parse_wallet_id(&wallet_id)?;
    let balance_cents = service.get_balance(wallet_id).await?;

    Ok(Json(BalanceResponse {
        wallet_id,
        balance: money::from_cents(balance_cents),
    }))
}

/// Deposit into or withdraw from a wallet.
///
/// # Endpoint
///
/// `POST /api/v1/wallet`
///
/// # Request Body
///
/// ```json
/// {
///   "walletId": "550e8400-...",
///   "operationType": "WITHDRAW",
///   "amount": 30.00
/// }
/// ```
///
/// `amount` is in currency units and is converted to cents here. More than
/// two fractional digits is rejected as an invalid amount.
///
/// # Response
///
/// - **Success (200 OK)**: `{"status": "success"}`
/// - **Error (400)**: Malformed body, malformed id, non-positive or sub-cent amount,
///   insufficient funds
/// - **Error (415)**: Body is not `application/json`
/// - **Error (404)**: Wallet does not exist
/// - **Error (500)**: Ledger store error
pub async fn handle_operation(
    State(service): State<WalletService>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let wallet_id = parse_wallet_id(&request.wallet_id)?;
    let amount_cents = money::to_cents(request.amount).ok_or(WalletError::InvalidAmount)?;

    match request.operation_type {
        Operation::Deposit => service.deposit(wallet_id, amount_cents).await?,
        Operation::Withdraw => service.withdraw(wallet_id, amount_cents).await?,
    }

    Ok(Json(json!({ "status": "success" })))
}

fn parse_wallet_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::InvalidRequest("invalid wallet ID format".to_string()))
}
