//! REST API handlers for ledger operations
//!
//! Transactions and queries are routed through the [`Contract`], so each
//! request produces exactly one notification. The caller is taken from the
//! `x-sender` header.

use crate::api::websocket::WsBroadcaster;
use crate::config::LedgerConfig;
use crate::contract::*;
use crate::crypto::LocalKeyProvider;
use crate::notify::{LogNotifier, Notification, Notifier};
use crate::storage::Store;
use crate::token::{AccountKind, TokenLedger};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Header naming the caller of a request
pub const SENDER_HEADER: &str = "x-sender";

pub type ApiContract = Contract<Box<dyn Store + Send>, LocalKeyProvider, ApiNotifier>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Notifier used by the API host
///
/// Keeps the latest result for the request in flight, pushes every result to
/// WebSocket subscribers and mirrors it to the log.
pub struct ApiNotifier {
    last: Mutex<Option<Notification>>,
    broadcaster: Arc<WsBroadcaster>,
}

impl ApiNotifier {
    pub fn new(broadcaster: Arc<WsBroadcaster>) -> Self {
        Self {
            last: Mutex::new(None),
            broadcaster,
        }
    }

    /// Take the latest result, leaving none behind
    pub fn take_last(&self) -> Option<Notification> {
        match self.last.lock() {
            Ok(mut last) => last.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl Notifier for ApiNotifier {
    fn result(&self, success: bool, message: &str) {
        LogNotifier.result(success, message);
        self.broadcaster.result(success, message);
        let mut last = self
            .last
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Some(Notification::new(success, message));
    }
}

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub contract: Arc<tokio::sync::Mutex<ApiContract>>,
    pub ws_broadcaster: Arc<WsBroadcaster>,
}

impl ApiState {
    pub fn new(store: Box<dyn Store + Send>, keys: LocalKeyProvider, config: LedgerConfig) -> Self {
        let ws_broadcaster = Arc::new(WsBroadcaster::new());
        let ledger = TokenLedger::with_config(store, keys, config);
        let contract = Contract::new(ledger, ApiNotifier::new(ws_broadcaster.clone()));

        Self {
            contract: Arc::new(tokio::sync::Mutex::new(contract)),
            ws_broadcaster,
        }
    }
}

/// Caller identity carried by a request
struct RequestIdentity(Option<String>);

impl RequestIdentity {
    fn from_headers(headers: &HeaderMap) -> Self {
        let sender = headers
            .get(SENDER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self(sender)
    }
}

impl Identity for RequestIdentity {
    fn current_sender(&self) -> Option<String> {
        self.0.clone()
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

/// Outcome of a contract call
#[derive(Debug, Serialize)]
pub struct CallResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CurrencyInfo {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u64,
    pub account_count: usize,
}

#[derive(Debug, Serialize)]
pub struct AccountInfo {
    pub address: String,
    pub kind: AccountKind,
    pub balance: u64,
    pub allowances: usize,
}

#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub total_supply: u64,
    pub sum_of_balances: u128,
    pub accounts: usize,
    pub consistent: bool,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct AllowanceQuery {
    pub owner: String,
    pub spender: String,
}

fn not_found(message: String) -> (StatusCode, Json<ApiError>) {
    (StatusCode::NOT_FOUND, Json(ApiError { error: message }))
}

/// Invoke a call under the contract lock and turn its notification into a
/// response
async fn dispatch(state: &ApiState, headers: &HeaderMap, call: Call) -> ApiResult<CallResponse> {
    let identity = RequestIdentity::from_headers(headers);
    let method = call.method();

    let mut contract = state.contract.lock().await;
    let reply = contract.invoke(&identity, call);

    let outcome = contract.notifier().take_last().ok_or_else(|| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("{} reported no result", method),
            }),
        )
    })?;

    if !outcome.success {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: outcome.message,
            }),
        ));
    }

    Ok(Json(CallResponse {
        success: true,
        message: outcome.message,
        value: reply.value().map(str::to_string),
    }))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health - Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /api/currency - Currency metadata
pub async fn get_currency(State(state): State<ApiState>) -> ApiResult<CurrencyInfo> {
    let contract = state.contract.lock().await;
    let currency = contract
        .ledger()
        .registry()
        .currency()
        .map_err(|e| not_found(e.to_string()))?;

    Ok(Json(CurrencyInfo {
        id: currency.id.clone(),
        name: currency.name.clone(),
        symbol: currency.symbol.clone(),
        decimals: currency.decimals,
        total_supply: currency.total_supply,
        account_count: currency.accounts().len(),
    }))
}

/// POST /api/currency - Create the currency
pub async fn create_currency(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(input): Json<CreateCurrencyInput>,
) -> ApiResult<CallResponse> {
    dispatch(&state, &headers, Call::CreateCurrency(input)).await
}

/// GET /api/accounts - List registered accounts
pub async fn list_accounts(State(state): State<ApiState>) -> ApiResult<Vec<AccountInfo>> {
    let contract = state.contract.lock().await;
    let accounts = contract
        .ledger()
        .accounts()
        .map_err(|e| not_found(e.to_string()))?;

    Ok(Json(
        accounts
            .into_iter()
            .map(|(address, account)| AccountInfo {
                address,
                kind: account.kind,
                balance: account.balance,
                allowances: account.allowances().len(),
            })
            .collect(),
    ))
}

/// POST /api/accounts - Open an account for the sender
pub async fn open_account(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(input): Json<OpenAccountInput>,
) -> ApiResult<CallResponse> {
    dispatch(&state, &headers, Call::OpenAccount(input)).await
}

/// GET /api/accounts/{address}/balance - Balance of an account
pub async fn get_balance(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(address): Path<String>,
) -> ApiResult<CallResponse> {
    dispatch(
        &state,
        &headers,
        Call::BalanceOf(BalanceOfInput {
            owner: Some(address),
        }),
    )
    .await
}

/// GET /api/allowance?owner=..&spender=.. - Remaining allowance
pub async fn get_allowance(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<AllowanceQuery>,
) -> ApiResult<CallResponse> {
    dispatch(
        &state,
        &headers,
        Call::Allowance(AllowanceInput {
            owner: query.owner,
            spender: query.spender,
        }),
    )
    .await
}

/// POST /api/transfer
pub async fn transfer(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(input): Json<TransferInput>,
) -> ApiResult<CallResponse> {
    dispatch(&state, &headers, Call::Transfer(input)).await
}

/// POST /api/approve
pub async fn approve(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(input): Json<ApproveInput>,
) -> ApiResult<CallResponse> {
    dispatch(&state, &headers, Call::Approve(input)).await
}

/// POST /api/transferFrom
pub async fn transfer_from(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(input): Json<TransferFromInput>,
) -> ApiResult<CallResponse> {
    dispatch(&state, &headers, Call::TransferFrom(input)).await
}

/// POST /api/increaseAllowance
pub async fn increase_allowance(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(input): Json<IncreaseAllowanceInput>,
) -> ApiResult<CallResponse> {
    dispatch(&state, &headers, Call::IncreaseAllowance(input)).await
}

/// POST /api/decreaseAllowance
pub async fn decrease_allowance(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(input): Json<DecreaseAllowanceInput>,
) -> ApiResult<CallResponse> {
    dispatch(&state, &headers, Call::DecreaseAllowance(input)).await
}

/// POST /api/mint
pub async fn mint(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(input): Json<MintInput>,
) -> ApiResult<CallResponse> {
    dispatch(&state, &headers, Call::Mint(input)).await
}

/// POST /api/burn
pub async fn burn(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(input): Json<BurnInput>,
) -> ApiResult<CallResponse> {
    dispatch(&state, &headers, Call::Burn(input)).await
}

/// POST /api/burnFrom
pub async fn burn_from(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(input): Json<BurnFromInput>,
) -> ApiResult<CallResponse> {
    dispatch(&state, &headers, Call::BurnFrom(input)).await
}

/// POST /api/call - Invoke any method as `{"method": .., "params": ..}`
pub async fn call(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(call): Json<Call>,
) -> ApiResult<CallResponse> {
    dispatch(&state, &headers, call).await
}

/// GET /api/audit - Compare total supply with the sum of balances
pub async fn audit(State(state): State<ApiState>) -> ApiResult<AuditResponse> {
    let contract = state.contract.lock().await;
    let audit = contract
        .ledger()
        .audit()
        .map_err(|e| not_found(e.to_string()))?;

    Ok(Json(AuditResponse {
        total_supply: audit.total_supply,
        sum_of_balances: audit.sum_of_balances,
        accounts: audit.accounts,
        consistent: audit.is_consistent(),
    }))
}
