use std::net::SocketAddr;
use std::sync::Arc;

use auth::AccessTokenCodec;
use auth::RefreshTokenFactory;
use session_service::config::Config;
use session_service::domain::auth::service::AuthService;
use session_service::inbound::http::router::create_router;
use session_service::outbound::password::Argon2PasswordService;
use session_service::outbound::repositories::PostgresSessionStore;
use session_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "session-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_token_ttl_minutes = config.auth_tokens.access_token_ttl_minutes,
        refresh_token_ttl_hours = config.auth_tokens.refresh_token_ttl_hours,
        operation_timeout_ms = config.service.operation_timeout_ms,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let access_tokens = Arc::new(AccessTokenCodec::from_pem_files(
        &config.auth_tokens.private_key_path,
        &config.auth_tokens.public_key_path,
        config.auth_tokens.access_token_ttl(),
    )?);
    let refresh_tokens = Arc::new(RefreshTokenFactory::new(
        config.auth_tokens.fingerprint_secret.clone(),
        config.auth_tokens.refresh_token_ttl(),
    ));
    tracing::info!(algorithm = "RS256", "Token keys loaded");

    let auth_service = Arc::new(AuthService::new(
        Arc::new(PostgresUserRepository::new(pg_pool.clone())),
        Arc::new(PostgresSessionStore::new(pg_pool)),
        Arc::new(Argon2PasswordService::new()),
        access_tokens,
        refresh_tokens,
        config.service.operation_timeout(),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service);
    axum::serve(
        http_listener,
        http_application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    tracing::info!("Server exited");
    Ok(())
}
