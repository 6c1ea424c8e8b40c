use crate::application::auth_service::AuthService;
use crate::application::expense_service::ExpenseService;
use crate::data::expense_repository::InMemoryExpenseRepository;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::DomainError;
use crate::domain::expense::{CreateExpense, UpdateExpense};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{FromRequest, HttpMessage, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub struct AppState {
    pub auth_service: Arc<AuthService<InMemoryUserRepository>>,
    pub expense_service: ExpenseService<InMemoryExpenseRepository>,
}

/// Error/confirmation body: a bare human-readable message, nothing more.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("An account with this email already exists")]
    DuplicateEmail,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Something went wrong")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            ApiError::Validation(_) => actix_web::http::StatusCode::BAD_REQUEST,
            ApiError::DuplicateEmail => actix_web::http::StatusCode::CONFLICT,
            ApiError::InvalidCredentials => actix_web::http::StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized(_) => actix_web::http::StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            ApiError::Internal(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = self.to_string();

        match self {
            ApiError::Internal(detail) => {
                error!(status = %status, detail = %detail, "Internal error")
            }
            _ => warn!(status = %status, message = %message, "Request failed"),
        }

        HttpResponse::build(status).json(MessageResponse { message })
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(DomainError::DuplicateEmail) => ApiError::DuplicateEmail,
            Some(DomainError::InvalidCredentials) => ApiError::InvalidCredentials,
            Some(DomainError::Unauthorized(msg)) => ApiError::Unauthorized(msg.clone()),
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Internal(err.to_string()),
        }
    }
}

// AuthenticatedUser extractor
impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move {
            user.ok_or_else(|| ApiError::Unauthorized("User not authenticated".to_string()))
        })
    }
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_expenses(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let expenses = state
        .expense_service
        .list(&user.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list expenses");
            ApiError::from(e)
        })?;
    info!(count = expenses.len(), "Expenses listed");
    Ok(HttpResponse::Ok().json(expenses))
}

#[instrument(skip(state, req), fields(user_id = %user.user_id))]
pub async fn create_expense(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateExpense>,
) -> Result<HttpResponse, ApiError> {
    let expense = state
        .expense_service
        .create(&user.user_id, req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create expense");
            ApiError::from(e)
        })?;
    info!(expense_id = %expense.id, "Expense created");
    Ok(HttpResponse::Created().json(expense))
}

#[instrument(skip(state, req), fields(user_id = %user.user_id, expense_id = %*path))]
pub async fn update_expense(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    req: web::Json<UpdateExpense>,
) -> Result<HttpResponse, ApiError> {
    let expense_id = path.into_inner();
    let expense = state
        .expense_service
        .update(&user.user_id, &expense_id, req.into_inner())
        .await
        .map_err(|e| {
            error!(expense_id = %expense_id, error = %e, "Failed to update expense");
            ApiError::from(e)
        })?;
    info!(expense_id = %expense.id, "Expense updated");
    Ok(HttpResponse::Ok().json(expense))
}

#[instrument(skip(state), fields(user_id = %user.user_id, expense_id = %*path))]
pub async fn delete_expense(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let expense_id = path.into_inner();
    state
        .expense_service
        .delete(&user.user_id, &expense_id)
        .await
        .map_err(|e| {
            error!(expense_id = %expense_id, error = %e, "Failed to delete expense");
            ApiError::from(e)
        })?;
    info!(expense_id = %expense_id, "Expense deleted");
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Expense deleted successfully".to_string(),
    }))
}

#[instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn expense_stats(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let stats = state
        .expense_service
        .stats(&user.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to compute statistics");
            ApiError::from(e)
        })?;
    Ok(HttpResponse::Ok().json(stats))
}
