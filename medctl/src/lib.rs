//! # medctl: hospital administration service
//!
//! `medctl` is the backend for a hospital administration dashboard. It keeps records of doctors,
//! patient appointments, health resource articles, support tickets, inventory items and user
//! accounts, and exposes them over a JSON REST API.
//!
//! ## Overview
//!
//! Every resource follows the same request flow. A handler receives the raw JSON body and runs it
//! through a declarative field specification ([`validation`]), so a single `400` response lists
//! every missing field and every malformed one. The typed request is then handed to a repository
//! ([`db::handlers`]) that reads and writes JSON documents through a [`DocumentStore`]. Appointments
//! additionally resolve the doctor they reference before they are written, and doctors cannot be
//! deleted while appointments still point at them.
//!
//! Some writes have side effects by email: booking an appointment confirms it to the patient,
//! publishing an article alerts the admin address, and a stock check alerts on every empty item.
//! Those emails go through a bounded queue drained by a background task ([`notifications`]), so a
//! slow or failing mail server never affects the response.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). Persistence is a [`DocumentStore`]
//! with two backends: PostgreSQL (a single JSONB `documents` table, migrated on startup) and an
//! in-memory store used for local runs and the test suite.
//!
//! - The **API layer** ([`api`]) holds handlers and request/response models, documented with
//!   `utoipa` and served at `/docs`.
//! - The **database layer** ([`db`]) holds the store backends, the typed document bodies and one
//!   repository per collection.
//! - **Background services** are the notification dispatcher, stopped through a shared
//!   cancellation token on shutdown.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use medctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = medctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     medctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod errors;
pub mod notifications;
mod openapi;
pub mod telemetry;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::models::users::{Role, UserProfile},
    auth::password::{self, Argon2Params},
    config::{CorsOrigin, DatabaseConfig},
    db::handlers::{Repository, Users},
    db::models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    db::store::{DocumentStore, MemoryDocumentStore, PgDocumentStore},
    email::{LettreTransport, MailTransport},
    notifications::Notifier,
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    http::{Method, header},
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{AppointmentId, ArticleId, DoctorId, InventoryItemId, TicketId, UserId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .store(Arc::new(MemoryDocumentStore::new()))
///     .config(config)
///     .notifier(Notifier::disabled())
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Config,
    pub notifier: Notifier,
    /// Argon2 cost used when hashing new passwords
    #[builder(default)]
    pub password_params: Argon2Params,
}

/// Get the medctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: an existing account with this email keeps its id and profile, and only has its
/// password replaced when one is given. Returns the admin's user id.
#[instrument(skip_all, fields(email = %email))]
pub async fn create_initial_admin_user(
    store: &dyn DocumentStore,
    email: &str,
    password: Option<&str>,
    params: Argon2Params,
) -> anyhow::Result<UserId> {
    let password_hash = password
        .map(|pwd| password::hash_string(pwd, params))
        .transpose()?;

    let mut users = Users::new(store);

    if let Some(existing) = users.get_user_by_email(email).await? {
        if let Some(password_hash) = password_hash {
            users
                .update(
                    existing.id,
                    &UserUpdateDBRequest {
                        profile: existing.data.profile,
                        password_hash: Some(password_hash),
                    },
                )
                .await?;
        }
        return Ok(existing.id);
    }

    let created = users
        .create(&UserCreateDBRequest {
            profile: UserProfile {
                title: String::new(),
                first_name: "System".to_string(),
                last_name: "Administrator".to_string(),
                address: String::new(),
                nic: String::new(),
                dob: Default::default(),
                contact: String::new(),
                email_address: email.to_string(),
                city: String::new(),
                district: String::new(),
            },
            role: Role::Admin,
            password_hash,
        })
        .await?;

    info!(user_id = %created.id, "Created initial admin user");
    Ok(created.id)
}

/// Open the configured document store, running migrations for PostgreSQL.
async fn setup_store(config: &Config) -> anyhow::Result<(Arc<dyn DocumentStore>, Option<PgPool>)> {
    match &config.database {
        DatabaseConfig::Memory => {
            info!("Using in-memory document store; data is lost on shutdown");
            Ok((Arc::new(MemoryDocumentStore::new()), None))
        }
        DatabaseConfig::Postgres { url, pool } => {
            info!("Using PostgreSQL document store");
            let pg_pool = PgPoolOptions::new()
                .max_connections(pool.max_connections)
                .min_connections(pool.min_connections)
                .acquire_timeout(pool.acquire_timeout)
                .idle_timeout(Some(pool.idle_timeout))
                .max_lifetime(Some(pool.max_lifetime))
                .connect(url)
                .await?;
            migrator().run(&pg_pool).await?;
            Ok((Arc::new(PgDocumentStore::new(pg_pool.clone())), Some(pg_pool)))
        }
    }
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.cors;

    let allow_origin = if cors_config
        .allowed_origins
        .iter()
        .any(|origin| matches!(origin, CorsOrigin::Wildcard))
    {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// Routes are grouped per resource; `/healthz`, the OpenAPI document and the Scalar UI sit at
/// the root, and `/internal/metrics` is added when `enable_metrics` is set.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    use api::handlers::{appointments, articles, doctors, inventory, tickets, users};

    let api_routes = Router::new()
        // Doctors
        .route("/doctors", post(doctors::create_doctor).get(doctors::list_doctors))
        .route("/doctors/specialization-counts", get(doctors::specialization_counts))
        .route(
            "/doctors/{id}",
            get(doctors::get_doctor).put(doctors::update_doctor).delete(doctors::delete_doctor),
        )
        // Appointments
        .route(
            "/appointments",
            post(appointments::create_appointment).get(appointments::list_appointments),
        )
        .route(
            "/appointments/{id}",
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        // Health resource articles
        .route("/resources", post(articles::create_article).get(articles::list_articles))
        .route("/resources/category-counts", get(articles::category_counts))
        .route(
            "/resources/{id}",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        // Support tickets
        .route("/tickets", post(tickets::create_ticket).get(tickets::list_tickets))
        .route("/tickets/search", get(tickets::search_tickets))
        .route(
            "/tickets/{id}",
            get(tickets::get_ticket).put(tickets::update_ticket).delete(tickets::delete_ticket),
        )
        // Inventory
        .route("/inventory", post(inventory::create_item).get(inventory::list_items))
        .route("/inventory/report", get(inventory::stock_report))
        .route("/inventory/check-stock", post(inventory::check_stock))
        .route(
            "/inventory/{id}",
            get(inventory::get_item).put(inventory::update_item).delete(inventory::delete_item),
        )
        // Users
        .route("/users", post(users::register_user).get(users::list_users))
        .route("/users/register", post(users::register_user))
        .route("/users/login", post(users::login))
        .route(
            "/users/{id}",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .with_state(state.clone());

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .merge(api_routes)
        .layer(create_cors_layer(&state.config)?);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application: store, background notification dispatcher and HTTP router.
///
/// 1. **Create**: [`Application::new`] opens the store, runs migrations, seeds the admin user
///    and starts the notification dispatcher
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: when the shutdown future resolves, stops the dispatcher and closes the pool
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
    dispatcher: Option<JoinHandle<()>>,
    shutdown_token: CancellationToken,
}

impl Application {
    /// Create a new application delivering email through the configured lettre transport
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let transport = Arc::new(LettreTransport::new(&config.email)?);
        Self::new_with(config, transport, Argon2Params::default()).await
    }

    /// Create a new application with an explicit mail transport and password hashing cost
    pub async fn new_with(
        config: Config,
        transport: Arc<dyn MailTransport>,
        password_params: Argon2Params,
    ) -> anyhow::Result<Self> {
        debug!("Starting medctl with configuration: {:#?}", config);

        let (store, pool) = setup_store(&config).await?;

        create_initial_admin_user(
            store.as_ref(),
            &config.admin_email,
            config.admin_password.as_deref(),
            password_params,
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {e}"))?;

        let shutdown_token = CancellationToken::new();
        let (notifier, dispatcher) = if config.notifications.enabled {
            let (notifier, handle) = Notifier::spawn(transport, &config.notifications, shutdown_token.clone());
            (notifier, Some(handle))
        } else {
            info!("Notifications disabled");
            (Notifier::disabled(), None)
        };

        let app_state = AppState::builder()
            .store(store)
            .config(config.clone())
            .notifier(notifier)
            .password_params(password_params)
            .build();

        let router = build_router(app_state)?;

        Ok(Self {
            router,
            config,
            pool,
            dispatcher,
            shutdown_token,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "medctl listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Stopping notification dispatcher...");
        self.shutdown_token.cancel();
        if let Some(handle) = self.dispatcher {
            let _ = handle.await;
        }

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::*;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use serde_json::Value;

    #[tokio::test]
    async fn test_initial_admin_user_is_idempotent() {
        let store = MemoryDocumentStore::new();
        let params = Argon2Params::insecure_fast();

        let first = create_initial_admin_user(&store, "admin@hospital.example", Some("AdminPassword1"), params)
            .await
            .unwrap();
        let second = create_initial_admin_user(&store, "admin@hospital.example", Some("AdminPassword2"), params)
            .await
            .unwrap();
        assert_eq!(first, second);

        let mut users = Users::new(&store);
        let all = users.list(&()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].data.role, Role::Admin);
        let hash = all[0].data.password_hash.clone().unwrap();
        assert!(password::verify_string("AdminPassword2", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_initial_admin_without_password() {
        let store = MemoryDocumentStore::new();
        let id = create_initial_admin_user(&store, "admin@hospital.example", None, Argon2Params::insecure_fast())
            .await
            .unwrap();

        let admin = Users::new(&store).get_by_id(id).await.unwrap().unwrap();
        assert!(admin.data.password_hash.is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_health_and_docs() {
        let (server, _mail) = create_test_app().await;

        let health = server.get("/healthz").await;
        health.assert_status_ok();
        health.assert_text("OK");

        let spec: Value = server.get("/api-docs/openapi.json").await.json();
        assert_eq!(spec["info"]["title"], "medctl");
        assert!(spec["paths"]["/doctors/{id}"].is_object());

        server.get("/docs").await.assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_cors_preflight_allows_any_origin_by_default() {
        let (server, _mail) = create_test_app().await;

        let response = server
            .method(Method::OPTIONS, "/doctors")
            .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:5173"))
            .add_header(
                HeaderName::from_static("access-control-request-method"),
                HeaderValue::from_static("POST"),
            )
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }

    #[test_log::test(tokio::test)]
    async fn test_cors_explicit_origins() {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec![CorsOrigin::Url("https://dashboard.hospital.example".parse().unwrap())];
        let (server, _mail) = create_test_app_with(config).await;

        let response = server
            .get("/doctors")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://dashboard.hospital.example"))
            .await;
        assert_eq!(
            response.header("access-control-allow-origin"),
            "https://dashboard.hospital.example"
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_disabled_notifications_queue_nothing() {
        let mut config = create_test_config();
        config.notifications.enabled = false;
        let (server, mail) = create_test_app_with(config).await;

        server
            .post("/inventory")
            .json(&item_json("Gauze", 0, "2.50"))
            .await
            .assert_status(StatusCode::CREATED);

        let response: Value = server.post("/inventory/check-stock").await.json();
        assert_eq!(response["outOfStock"], serde_json::json!(["Gauze"]));
        assert_eq!(response["notificationsQueued"], 0);
        assert_eq!(mail.attempts(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_send_does_not_change_response() {
        let (server, mail) = create_test_app().await;
        mail.fail_sends(true);
        let doctor_id = create_doctor(&server, "Perera", "Cardiology").await;

        server
            .post("/appointments")
            .json(&appointment_json(&doctor_id))
            .await
            .assert_status(StatusCode::CREATED);

        mail.wait_for_attempts(1).await;
        assert!(mail.sent().is_empty());
        assert_eq!(server.get("/appointments").await.json::<Value>().as_array().unwrap().len(), 1);
    }
}
