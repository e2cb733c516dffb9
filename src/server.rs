//! Reusable booking server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: database connection,
//! migrations, demo data, session sweeper, REST API, metrics and graceful
//! shutdown. The CLI binary is a thin wrapper around it.

use std::sync::{Arc, OnceLock};

use chrono::{Days, NaiveDate, Utc};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::{start_session_sweeper, SessionStore, SharedSessionStore};
use crate::config::AppConfig;
use crate::domain::{CreateUserDto, DomainResult, RepositoryProvider, Reservation};
use crate::infrastructure::crypto::password::hash_password;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{init_database, SeaOrmRepositoryProvider};
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the booking server.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup.
    pub auto_migrate: bool,
    /// Insert demo data into an empty database when `seed.demo_data` is on.
    pub seed_demo_data: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            seed_demo_data: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running booking server.
///
/// ```rust,no_run
/// use amenity_booking::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub sessions: SharedSessionStore,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Port the API is listening on.
    pub port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
    sweeper_task: tokio::task::JoinHandle<()>,
}

/// The global recorder can only be installed once per process
fn prometheus_handle() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics recorder installed");
    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

impl ServerHandle {
    /// Start the server: metrics recorder, database, migrations, demo
    /// data, session sweeper and the REST API.
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let config = opts.config;
        info!("Starting amenity booking server...");

        let prometheus = prometheus_handle()?;

        // ── Database ───────────────────────────────────────────
        let db = init_database(&config.database.to_database_config()).await?;
        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

        if opts.seed_demo_data && config.seed.demo_data {
            match seed_demo_data(repos.as_ref(), Utc::now().date_naive()).await {
                Ok(true) => info!("Demo data inserted (users share password 'password123')"),
                Ok(false) => info!("Database already populated, demo data skipped"),
                Err(e) => error!(error = %e, "Failed to insert demo data"),
            }
        }

        // ── Sessions & shutdown ────────────────────────────────
        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let sessions = SessionStore::shared(config.session.ttl());
        let sweeper_task = start_session_sweeper(
            sessions.clone(),
            shutdown_signal.clone(),
            config.session.sweep_interval_secs,
        );

        // ── REST API ───────────────────────────────────────────
        let state = AppState::new(
            repos.clone(),
            db.clone(),
            sessions.clone(),
            &config,
            prometheus,
        );
        let router = create_api_router(state);

        let addr = config.address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();
        info!("REST API listening on http://{}", addr);
        info!("Swagger UI available at http://{}/docs/", addr);

        let api_shutdown = shutdown_signal.clone();
        let drain_secs = shutdown.timeout_secs();
        let api_task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                api_shutdown.wait().await;
                info!("REST API received shutdown signal");
            });
            let drain_deadline = async {
                shutdown_signal.wait().await;
                tokio::time::sleep(std::time::Duration::from_secs(drain_secs)).await;
            };
            tokio::select! {
                result = server => {
                    if let Err(e) = result {
                        error!("REST API server error: {}", e);
                    }
                }
                _ = drain_deadline => {
                    warn!(timeout_secs = drain_secs, "In-flight requests did not drain in time");
                }
            }
        });

        Ok(Self {
            repos,
            sessions,
            config,
            port,
            db,
            shutdown,
            api_task,
            sweeper_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown without waiting.
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for everything to stop after shutdown has been triggered.
    pub async fn wait(self) {
        info!("Waiting for server tasks to complete...");

        match self.api_task.await {
            Ok(()) => info!("REST API server stopped"),
            Err(e) => error!("REST API server task panicked: {}", e),
        }
        if let Err(e) = self.sweeper_task.await {
            error!("Session sweeper task panicked: {}", e);
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
        info!("Shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down...");
        self.trigger_shutdown();
        self.wait().await;
    }
}

// ── Helpers ────────────────────────────────────────────────────────

pub const DEMO_AMENITIES: [&str; 5] = [
    "Swimming Pool",
    "Tennis Court",
    "Gym & Fitness Center",
    "Conference Room",
    "BBQ Area",
];

/// username, first name, last name, email
pub const DEMO_USERS: [(&str, &str, &str, &str); 3] = [
    ("john_doe", "John", "Doe", "john.doe@example.com"),
    ("jane_smith", "Jane", "Smith", "jane.smith@example.com"),
    ("admin", "Admin", "User", "admin@example.com"),
];

pub const DEMO_PASSWORD: &str = "password123";

const DEMO_RESERVATIONS: u32 = 20;

/// Populate an empty store with demo amenities, users and reservations.
///
/// Reservation `i` falls on `today + i`, one hour from `9 + i % 12`
/// o'clock, on amenity `i % 5` for user `i % 3`. Returns `false` and
/// leaves the store untouched when it already holds users or amenities.
pub async fn seed_demo_data(repos: &dyn RepositoryProvider, today: NaiveDate) -> DomainResult<bool> {
    if repos.users().count().await? > 0 || repos.amenities().count().await? > 0 {
        return Ok(false);
    }

    let mut amenities = Vec::with_capacity(DEMO_AMENITIES.len());
    for name in DEMO_AMENITIES {
        amenities.push(repos.amenities().create(name).await?);
    }

    let password_hash = hash_password(DEMO_PASSWORD)?;
    let mut users = Vec::with_capacity(DEMO_USERS.len());
    for (username, first_name, last_name, email) in DEMO_USERS {
        users.push(
            repos
                .users()
                .create_user(CreateUserDto {
                    username: username.to_string(),
                    password_hash: password_hash.clone(),
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    email: email.to_string(),
                })
                .await?,
        );
    }

    for i in 0..DEMO_RESERVATIONS {
        let hour = 9 + (i % 12) as i32;
        let date = today
            .checked_add_days(Days::new(u64::from(i)))
            .unwrap_or(today);
        let reservation = Reservation::new(
            amenities[(i % 5) as usize].id,
            users[(i % 3) as usize].id.clone(),
            hour * 60,
            (hour + 1) * 60,
            date,
        )?;
        repos.reservations().save(reservation).await?;
    }

    info!(
        amenities = amenities.len(),
        users = users.len(),
        reservations = DEMO_RESERVATIONS,
        "Demo data seeded"
    );
    Ok(true)
}

/// Initialize tracing from the application config.
///
/// `RUST_LOG` wins over `logging.level`. Call once at process startup.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {}", e);
    }
}
