use std::sync::Arc;

use emr_service::config::Config;
use emr_service::inbound::http::router::create_router;
use emr_service::outbound::repositories::PostgresCredentialStore;
use emr_service::role::resolver::RoleResolver;
use emr_service::user::authenticator::Authenticator;
use emr_service::user::provisioner::AccountProvisioner;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emr_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "emr-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        token_validity_hours = config.jwt.expiration_hours,
        "Configuration loaded"
    );

    let tokens = Arc::new(config.jwt.token_service()?);

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

    let store = Arc::new(PostgresCredentialStore::new(pg_pool));

    let role_resolver = Arc::new(RoleResolver::new(Arc::clone(&store)));
    let missing = role_resolver.preload().await?;
    if !missing.is_empty() {
        tracing::warn!(
            missing = ?missing,
            "Serving with incomplete role reference data"
        );
    }

    let provisioner = Arc::new(AccountProvisioner::new(
        Arc::clone(&store),
        role_resolver,
    ));
    let authenticator = Arc::new(Authenticator::new(store, Arc::clone(&tokens)));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(provisioner, authenticator, tokens);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited successfully");

    Ok(())
}
