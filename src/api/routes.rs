//! API Routes
//!
//! HTTP endpoint definitions.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{Account, NewAccount, NewOperation, Operation, Transaction, TransactionCollection};
use crate::error::AppError;
use crate::service::{PostTransaction, TransactionService};
use crate::store::{
    AccountFilter, AccountStore, OperationFilter, OperationStore, Page, TransactionFilter,
    TransactionStore,
};

// =========================================================================
// Request types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub document_number: String,
    #[serde(default)]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOperationRequest {
    #[serde(default)]
    pub description: String,
    pub debit: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AccountListQuery {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub size: i64,
    pub document_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OperationListQuery {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub size: i64,
    pub description: Option<String>,
    pub debit: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub size: i64,
    pub account_id: Option<i64>,
    pub operation_id: Option<i64>,
    pub event_date_start: Option<DateTime<Utc>>,
    pub event_date_end: Option<DateTime<Utc>>,
}

// =========================================================================
// Router
// =========================================================================

/// Shared handles behind every route. Stores are trait objects so the router
/// can be built over the Postgres stores or over test doubles.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub operations: Arc<dyn OperationStore>,
    pub transactions: Arc<dyn TransactionStore>,
    pub posting: Arc<TransactionService>,
}

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(create_account).get(find_accounts))
        .route("/accounts/:id", get(find_account))
        .route("/operations", post(create_operation).get(find_operations))
        .route("/operations/:id", get(find_operation))
        .route("/transactions", post(create_transaction).get(find_transactions))
}

// =========================================================================
// Accounts
// =========================================================================

/// Register a new account
async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    if request.document_number.trim().is_empty() {
        return Err(AppError::Validation(vec![
            "document_number is required".to_string(),
        ]));
    }

    let account = state
        .accounts
        .create(NewAccount {
            document: request.document_number,
            limit: request.limit,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Get account by ID
async fn find_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Account>, AppError> {
    let account = state.accounts.find_by_id(id).await?;

    Ok(Json(account))
}

/// List accounts
async fn find_accounts(
    State(state): State<AppState>,
    Query(query): Query<AccountListQuery>,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = state
        .accounts
        .find_all(AccountFilter {
            page: Page::new(query.page, query.size),
            document: query.document_number,
        })
        .await?;

    Ok(Json(accounts))
}

// =========================================================================
// Operations
// =========================================================================

/// Register a new operation type
async fn create_operation(
    State(state): State<AppState>,
    Json(request): Json<CreateOperationRequest>,
) -> Result<(StatusCode, Json<Operation>), AppError> {
    let mut failures = Vec::new();
    if request.description.trim().is_empty() {
        failures.push("description is required".to_string());
    }
    let Some(debit) = request.debit else {
        failures.push("debit is required".to_string());
        return Err(AppError::Validation(failures));
    };
    if !failures.is_empty() {
        return Err(AppError::Validation(failures));
    }

    let operation = state
        .operations
        .create(NewOperation {
            description: request.description,
            debit,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(operation)))
}

/// Get operation by ID
async fn find_operation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Operation>, AppError> {
    let operation = state.operations.find_by_id(id).await?;

    Ok(Json(operation))
}

/// List operation types
async fn find_operations(
    State(state): State<AppState>,
    Query(query): Query<OperationListQuery>,
) -> Result<Json<Vec<Operation>>, AppError> {
    let operations = state
        .operations
        .find_all(OperationFilter {
            page: Page::new(query.page, query.size),
            description: query.description,
            debit: query.debit,
        })
        .await?;

    Ok(Json(operations))
}

// =========================================================================
// Transactions
// =========================================================================

/// Post a transaction against an account
async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<PostTransaction>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let transaction = state.posting.post(request).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// List transactions with a page-scoped running total
async fn find_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionCollection>, AppError> {
    let collection = state
        .transactions
        .find_all(TransactionFilter {
            page: Page::new(query.page, query.size),
            account_id: query.account_id,
            operation_id: query.operation_id,
            event_date_start: query.event_date_start,
            event_date_end: query.event_date_end,
        })
        .await?;

    Ok(Json(collection))
}
