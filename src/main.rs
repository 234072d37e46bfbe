use std::sync::Arc;

use tracing::{info, warn};

use fieldvisit_api::services::mailer::{DisabledMailer, Mailer, SmtpMailer};
use fieldvisit_api::{app_router, config, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_config()?;
    config::init_tracing(app_config.log_level(), app_config.log_json);

    info!(
        environment = %app_config.environment,
        "starting fieldvisit-api v{}",
        env!("CARGO_PKG_VERSION")
    );

    let pool = db::establish_connection_from_app_config(&app_config).await?;
    if app_config.auto_migrate {
        info!("running database migrations");
        db::run_migrations(&pool).await?;
    }

    let mailer: Arc<dyn Mailer> = match SmtpMailer::from_config(&app_config)? {
        Some(smtp) => Arc::new(smtp),
        None => {
            warn!("smtp_host not configured; report email dispatch is disabled");
            Arc::new(DisabledMailer)
        }
    };

    let cors = cors_layer(app_config.cors_allowed_origins.as_deref());
    let addr = format!("{}:{}", app_config.host, app_config.port);

    let state = AppState::new(Arc::new(pool), Arc::new(app_config), mailer);
    let app = app_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn cors_layer(allowed_origins: Option<&str>) -> tower_http::cors::CorsLayer {
    use tower_http::cors::{Any, CorsLayer};

    match allowed_origins {
        None | Some("*") => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        Some(origins) => {
            let origins: Vec<axum::http::HeaderValue> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
