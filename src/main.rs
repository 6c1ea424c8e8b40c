use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use expense_tracker::application::auth_service::AuthService;
use expense_tracker::application::expense_service::ExpenseService;
use expense_tracker::data::expense_repository::InMemoryExpenseRepository;
use expense_tracker::data::user_repository::InMemoryUserRepository;
use expense_tracker::infrastructure::config::AppConfig;
use expense_tracker::infrastructure::logging::init_logging;
use expense_tracker::infrastructure::security::TokenService;
use expense_tracker::presentation::auth::{login, register};
use expense_tracker::presentation::handlers::{
    AppState, create_expense, delete_expense, expense_stats, health_check, list_expenses,
    update_expense,
};
use expense_tracker::presentation::middleware::JwtAuthMiddleware;
use std::env;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args: Vec<String> = env::args().collect();
    if args.get(1).map(String::as_str) == Some("server") {
        run_server().await
    } else {
        let config = AppConfig::from_env();
        expense_tracker::tui::run(config.api_base_url).await
    }
}

async fn run_server() -> anyhow::Result<()> {
    init_logging();
    let config = AppConfig::from_env();

    info!("Creating repositories");
    let user_repository = Arc::new(InMemoryUserRepository::new());
    let expense_repository = Arc::new(InMemoryExpenseRepository::new());

    info!("Creating services");
    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_secs);
    let auth_service = Arc::new(AuthService::new(user_repository, tokens.clone()));
    let expense_service = ExpenseService::new(expense_repository);

    let state = web::Data::new(AppState {
        auth_service,
        expense_service,
    });

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .service(
                web::scope("/api")
                    .wrap(JwtAuthMiddleware::new(tokens.clone()))
                    .route("/health", web::get().to(health_check))
                    .route("/auth/register", web::post().to(register))
                    .route("/auth/login", web::post().to(login))
                    .route("/expenses", web::get().to(list_expenses))
                    .route("/expenses", web::post().to(create_expense))
                    .route("/expenses/stats", web::get().to(expense_stats))
                    .route("/expenses/{id}", web::put().to(update_expense))
                    .route("/expenses/{id}", web::delete().to(delete_expense)),
            )
    });

    info!(host = %config.host, port = config.port, "Starting HTTP server");
    server.bind(config.bind_addr())?.run().await?;
    Ok(())
}
