//! Field visit inspection API: reference data, visit lifecycle, and PDF
//! report generation with email dispatch.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post, put};
use axum::{middleware, Router};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, AuthConfig, AuthService};
use crate::config::AppConfig;
use crate::handlers::AppServices;
use crate::services::mailer::Mailer;

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod services;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthService>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: Arc<AppConfig>, mailer: Arc<dyn Mailer>) -> Self {
        let auth = Arc::new(AuthService::new(
            AuthConfig::new(
                config.jwt_secret.clone(),
                Duration::from_secs(config.jwt_expiration_secs),
            ),
            db.clone(),
        ));
        let services = AppServices::new(db.clone(), mailer, config.report_organization.clone());

        Self {
            db,
            config,
            auth,
            services,
        }
    }
}

/// Assemble the full router: public login and health endpoints, plus the
/// credential-gated API surface.
pub fn app_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/companies", get(handlers::reference::list_companies))
        .route("/branches", get(handlers::reference::list_branches))
        .route("/visits/start", post(handlers::visits::start_visit))
        .route("/visits/:id/end", post(handlers::visits::end_visit))
        .route("/visits/:id/cash", put(handlers::visits::record_cash))
        .route("/visits/:id/inventory", post(handlers::visits::record_inventory))
        .route("/visits/:id/notes", post(handlers::visits::add_note))
        .route("/visits/:id/submit", post(handlers::visits::submit_visit))
        .route("/visits/:id/approve", post(handlers::visits::approve_visit))
        .route("/visits/:id/pdf", get(handlers::visits::visit_pdf))
        .route("/visits/:id/send", post(handlers::visits::send_report))
        .nest("/admin", admin_routes())
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .merge(protected);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/ready", get(handlers::health::readiness))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies",
            get(handlers::admin::list_companies).post(handlers::admin::create_company),
        )
        .route(
            "/companies/:id",
            put(handlers::admin::update_company).delete(handlers::admin::delete_company),
        )
        .route(
            "/branches",
            get(handlers::admin::list_branches).post(handlers::admin::create_branch),
        )
        .route(
            "/branches/:id",
            put(handlers::admin::update_branch).delete(handlers::admin::delete_branch),
        )
        .route(
            "/recipients",
            get(handlers::admin::list_recipients).post(handlers::admin::create_recipient),
        )
        .route(
            "/recipients/:id",
            put(handlers::admin::update_recipient).delete(handlers::admin::delete_recipient),
        )
        .route(
            "/users",
            get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route(
            "/users/:id",
            put(handlers::admin::update_user).delete(handlers::admin::delete_user),
        )
        .route(
            "/users/:id/password",
            put(handlers::admin::set_user_password),
        )
}
