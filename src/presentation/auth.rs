use crate::domain::user::{LoginRequest, PublicUser, RegisterRequest};
use crate::presentation::handlers::{ApiError, AppState};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[instrument(skip_all, fields(email = %req.email))]
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Registration request received");

    let (token, user) = state
        .auth_service
        .register(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to register user");
            ApiError::from(e)
        })?;

    let response = AuthResponse {
        token,
        user: PublicUser::from(&user),
    };

    info!(user_id = %response.user.id, "User registered");
    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip_all, fields(email = %req.email))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let (token, user) = state.auth_service.login(req.into_inner()).await.map_err(|e| {
        error!(error = %e, "Failed to login");
        ApiError::from(e)
    })?;

    let response = AuthResponse {
        token,
        user: PublicUser::from(&user),
    };

    info!(user_id = %response.user.id, "Login successful");
    Ok(HttpResponse::Ok().json(response))
}
