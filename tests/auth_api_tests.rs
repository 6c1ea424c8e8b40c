use actix_web::{App, ResponseError, test, web};
use expense_tracker::application::auth_service::AuthService;
use expense_tracker::application::expense_service::ExpenseService;
use expense_tracker::data::expense_repository::InMemoryExpenseRepository;
use expense_tracker::data::user_repository::InMemoryUserRepository;
use expense_tracker::domain::user::{LoginRequest, RegisterRequest};
use expense_tracker::infrastructure::security::TokenService;
use expense_tracker::presentation::auth::{login, register};
use expense_tracker::presentation::handlers::{AppState, health_check, list_expenses};
use expense_tracker::presentation::middleware::JwtAuthMiddleware;
use std::sync::Arc;

const JWT_SECRET: &str = "test-secret-key-for-auth-tests";

macro_rules! setup_auth_test {
    () => {{
        let user_repository = Arc::new(InMemoryUserRepository::new());
        let expense_repository = Arc::new(InMemoryExpenseRepository::new());
        let tokens = TokenService::new(JWT_SECRET, 3600);
        let auth_service = Arc::new(AuthService::new(user_repository, tokens.clone()));
        let expense_service = ExpenseService::new(expense_repository);

        let state = web::Data::new(AppState {
            auth_service,
            expense_service,
        });

        test::init_service(
            App::new().app_data(state.clone()).service(
                web::scope("/api")
                    .wrap(JwtAuthMiddleware::new(tokens))
                    .route("/health", web::get().to(health_check))
                    .route("/auth/register", web::post().to(register))
                    .route("/auth/login", web::post().to(login))
                    .route("/expenses", web::get().to(list_expenses)),
            ),
        )
        .await
    }};
}

fn register_body(email: &str) -> RegisterRequest {
    RegisterRequest {
        name: "Alice".to_string(),
        email: email.to_string(),
        password: "pw123".to_string(),
    }
}

#[actix_web::test]
async fn test_full_registration_login_flow() {
    let app = setup_auth_test!();

    // Register
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(register_body("flow@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let resp: serde_json::Value = test::read_body_json(resp).await;
    assert!(resp["token"].as_str().is_some());
    assert_eq!(resp["user"]["email"], "flow@example.com");
    assert_eq!(resp["user"]["name"], "Alice");

    // Login with the same credentials
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(LoginRequest {
            email: "flow@example.com".to_string(),
            password: "pw123".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let resp: serde_json::Value = test::read_body_json(resp).await;
    let token = resp["token"].as_str().unwrap().to_string();

    // The issued token passes verification on a gated route
    let req = test::TestRequest::get()
        .uri("/api/expenses")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_register_duplicate_email_conflicts() {
    let app = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(register_body("duplicate@example.com"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(register_body("duplicate@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CONFLICT);
    let resp: serde_json::Value = test::read_body_json(resp).await;
    assert!(resp["message"].as_str().is_some());
}

#[actix_web::test]
async fn test_login_wrong_password() {
    let app = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(register_body("wrongpass@example.com"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(LoginRequest {
            email: "wrongpass@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_login_nonexistent_user() {
    let app = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(LoginRequest {
            email: "nonexistent@example.com".to_string(),
            password: "password".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_missing_token_is_unauthorized() {
    let app = setup_auth_test!();

    let req = test::TestRequest::get().uri("/api/expenses").to_request();
    match test::try_call_service(&app, req).await {
        Ok(resp) => assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED),
        Err(err) => assert_eq!(
            err.as_response_error().status_code(),
            actix_web::http::StatusCode::UNAUTHORIZED
        ),
    }
}

#[actix_web::test]
async fn test_invalid_token_is_unauthorized() {
    let app = setup_auth_test!();

    let req = test::TestRequest::get()
        .uri("/api/expenses")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    match test::try_call_service(&app, req).await {
        Ok(resp) => assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED),
        Err(err) => assert_eq!(
            err.as_response_error().status_code(),
            actix_web::http::StatusCode::UNAUTHORIZED
        ),
    }
}

#[actix_web::test]
async fn test_health_check_is_public() {
    let app = setup_auth_test!();

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_password_never_appears_in_responses() {
    let app = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(register_body("plaintext@example.com"))
        .to_request();
    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert!(resp["user"].get("password").is_none());
    assert!(resp["user"].get("password_hash").is_none());
}
