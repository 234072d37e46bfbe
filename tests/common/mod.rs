use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use fieldvisit_api::{
    auth::{password, Role},
    config::AppConfig,
    db,
    entities::{branch, branch_recipient, company, user},
    errors::ServiceError,
    services::mailer::{Mailer, OutgoingReport},
    app_router, AppState,
};

/// Recording mail double; dispatch tests assert against captured messages.
#[derive(Default)]
pub struct InMemoryMailer {
    pub sent: Mutex<Vec<OutgoingReport>>,
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, outgoing: OutgoingReport) -> Result<(), ServiceError> {
        self.sent.lock().unwrap().push(outgoing);
        Ok(())
    }
}

impl InMemoryMailer {
    pub fn messages(&self) -> Vec<OutgoingReport> {
        self.sent.lock().unwrap().clone()
    }
}

pub const ADMIN_PASSWORD: &str = "admin-pass-123";
pub const MANAGER_PASSWORD: &str = "manager-pass-123";
pub const EMPLOYEE_PASSWORD: &str = "employee-pass-123";

/// One seeded account per role, plus its bearer token.
pub struct SeededUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

/// Test application over a throwaway SQLite database, exercised through
/// the real router via `oneshot`.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<InMemoryMailer>,
    pub admin: SeededUser,
    pub manager: SeededUser,
    pub employee: SeededUser,
    _db_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = TempDir::new().expect("create temp dir for test db");
        let db_path = db_dir.path().join("fieldvisit_test.db");
        let mut config = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            18_090,
            "test".to_string(),
        );
        config.db_max_connections = 1;
        config.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&config)
            .await
            .expect("create test database");
        db::run_migrations(&pool).await.expect("run migrations");

        let db_arc = Arc::new(pool);
        let mailer = Arc::new(InMemoryMailer::default());
        let state = AppState::new(db_arc, Arc::new(config), mailer.clone());
        let router = app_router(state.clone());

        let admin = seed_user(&state, "Ada Admin", "admin@example.com", ADMIN_PASSWORD, Role::Admin).await;
        let manager =
            seed_user(&state, "Mona Manager", "manager@example.com", MANAGER_PASSWORD, Role::Manager)
                .await;
        let employee = seed_user(
            &state,
            "Evan Employee",
            "employee@example.com",
            EMPLOYEE_PASSWORD,
            Role::Employee,
        )
        .await;

        Self {
            router,
            state,
            mailer,
            admin,
            manager,
            employee,
            _db_dir: db_dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };

        let request = builder.body(body).expect("build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_company(&self, name: &str) -> company::Model {
        company::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed company")
    }

    pub async fn seed_branch(&self, company_id: i64, name: &str) -> branch::Model {
        branch::ActiveModel {
            company_id: Set(company_id),
            name: Set(name.to_string()),
            location: Set(None),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed branch")
    }

    pub async fn seed_recipient(
        &self,
        branch_id: i64,
        email: &str,
        notify_email: bool,
    ) -> branch_recipient::Model {
        branch_recipient::ActiveModel {
            branch_id: Set(branch_id),
            name: Set("Recipient".to_string()),
            email: Set(email.to_string()),
            notify_email: Set(notify_email),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed recipient")
    }
}

async fn seed_user(
    state: &AppState,
    name: &str,
    email: &str,
    plain_password: &str,
    role: Role,
) -> SeededUser {
    let model = user::ActiveModel {
        full_name: Set(name.to_string()),
        email: Set(email.to_string()),
        phone: Set(None),
        password_hash: Set(password::hash_password(plain_password).expect("hash test password")),
        role: Set(role.to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = model.insert(&*state.db).await.expect("seed user");

    let token = state
        .auth
        .issue_token(created.id, role, name)
        .expect("issue test token");

    SeededUser {
        id: created.id,
        email: email.to_string(),
        token,
    }
}

/// Read a JSON response body.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is json")
}

/// Read a raw response body.
pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body")
        .to_vec()
}
