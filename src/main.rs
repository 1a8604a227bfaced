use tracker_api::{config, database, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Tracker API in {:?} mode", config.environment);

    let pool = database::manager::connect(&config.database.url, config.database.max_connections)
        .await?;
    database::manager::migrate(&pool).await?;

    let app = handlers::router(pool);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Tracker API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
