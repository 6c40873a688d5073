use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use larder_server::{
    api,
    auth::{session::Sessions, GoTrueClient},
    boards::Boards,
    cache::new_cache,
    catalog::MealDbClient,
    config::Config,
    database::Database,
    state::AllStates,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Path to the YAML configuration file
    #[clap(long, default_value = "larder.yml")]
    config: String,

    /// Override the address and optionally port to bind to
    #[clap(long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    // initialize tracing
    let file_appender = tracing_appender::rolling::daily(
        if std::fs::exists("/app")? {
            "/app/data/logs".into()
        } else {
            std::env::current_dir()?
        },
        "access.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command line arguments
    let args = Args::parse();
    let config = Config::load(&args.config).context("Loading configuration")?;

    // connect to the database
    let db = Database::connect(&config.database)
        .await
        .context("Connecting to database")?;
    let catalog = MealDbClient::new(&config.catalog).context("Building catalog client")?;
    let identity = GoTrueClient::new_from_config(&config.auth).context("Building identity client")?;
    let sessions = Sessions::from_config(&config.auth).await;

    let app = api::router(AllStates {
        db,
        catalog: Arc::new(catalog),
        cache: new_cache(),
        identity: Arc::new(identity),
        sessions,
        boards: Boards::new(),
    })
    .layer(
        tower_http::compression::CompressionLayer::new()
            .quality(tower_http::CompressionLevel::Fastest),
    )
    .layer(tower_http::trace::TraceLayer::new_for_http());

    let address = args.address.unwrap_or(config.server.address);

    // In development, use HTTP. In production, use HTTPS.
    if let Some(tls) = &config.server.tls {
        rustls::crypto::ring::default_provider()
            .install_default()
            .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;
        let tls_config =
            axum_server::tls_rustls::RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .context("Loading TLS certificate")?;

        let addr = address.parse()?;
        tracing::info!("Listening on {}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .context("Starting TLS server")?;
    } else {
        let listener = tokio::net::TcpListener::bind(&address).await?;
        tracing::info!("Listening on {}", address);
        axum::serve(listener, app).await?;
    }
    Ok(())
}
