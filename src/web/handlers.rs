use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::application::{AccountProfile, AccountService};
use crate::domain::{Account, AccountError, AccountUpdate};
use crate::infrastructure::repository::AccountFilter;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub password: String,
    pub email: String,
    pub country: String,
}

#[derive(Debug, Deserialize)]
pub struct ModifyAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub country: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Account as rendered to gateway callers. The password hash never leaves
/// the service.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        AccountResponse {
            id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            nickname: account.nickname,
            email: account.email,
            country: account.country,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub accounts: Vec<AccountResponse>,
    pub total_count: u64,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: AccountError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, message) = match &err {
        AccountError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
        AccountError::DuplicateEmail(_) => (StatusCode::CONFLICT, err.to_string()),
        AccountError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
        AccountError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        AccountError::HashingFailure(_) | AccountError::InfrastructureError(_) => {
            error!(error = %err, "internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            )
        }
    };

    (status, Json(ErrorResponse { error: message }))
}

pub async fn add_account(
    State(service): State<Arc<AccountService>>,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let profile = AccountProfile {
        first_name: payload.first_name,
        last_name: payload.last_name,
        nickname: payload.nickname,
        email: payload.email,
        country: payload.country,
    };

    let account = service
        .add_account(profile, &payload.password)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

pub async fn modify_account(
    State(service): State<Arc<AccountService>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModifyAccountRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let update = AccountUpdate {
        first_name: payload.first_name,
        last_name: payload.last_name,
        nickname: payload.nickname,
        country: payload.country,
        email: payload.email,
    };

    let account = service
        .modify_account(id, update)
        .await
        .map_err(error_response)?;

    Ok(Json(AccountResponse::from(account)))
}

pub async fn change_password(
    State(service): State<Arc<AccountService>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    service
        .change_password(id, &payload.old_password, &payload.new_password)
        .await
        .map_err(error_response)?;

    Ok(Json(SuccessResponse { success: true }))
}

pub async fn delete_account(
    State(service): State<Arc<AccountService>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    service.delete_account(id).await.map_err(error_response)?;

    Ok(Json(SuccessResponse { success: true }))
}

pub async fn get_accounts(
    State(service): State<Arc<AccountService>>,
    Query(filter): Query<AccountFilter>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let page = service
        .get_accounts_by_filter(&filter)
        .await
        .map_err(error_response)?;

    Ok(Json(AccountsResponse {
        accounts: page.accounts.into_iter().map(AccountResponse::from).collect(),
        total_count: page.total_count,
    }))
}

pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}
