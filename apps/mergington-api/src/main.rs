use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod router;
mod services;

use config::AppConfig;
use services::activity_service::ActivityService;
use services::seed_service::SeedService;
use services::signup_service::SignupService;

#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub activity_service: Arc<ActivityService>,
    pub signup_service: Arc<SignupService>,
}

impl AppState {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self {
            activity_service: Arc::new(ActivityService::new(pool.clone())),
            signup_service: Arc::new(SignupService::new(pool.clone())),
            pool,
        }
    }
}

#[derive(Parser)]
#[command(name = "mergington-api")]
#[command(about = "Mergington High School extracurricular activities API", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database if needed and start the web server
    Serve,
    /// Create the database and seed the default activities, then exit
    Seed,
    /// Show the effective configuration
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        println!("No .env file loaded: {}", e);
    }

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let file_appender = tracing_appender::rolling::never(&config.log_dir, "server.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "mergington_api=debug,mergington_db=debug,tower_http=info,sqlx=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("Loaded config from {}", config.source);

    let pool = mergington_db::connect(&config.database_url).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            SeedService::new(pool.clone()).seed().await?;
            run_server(pool, &config).await?;
        }
        Commands::Seed => {
            let inserted = SeedService::new(pool.clone()).seed().await?;
            println!("Seeded {} activities.", inserted);
        }
        Commands::Info => {
            let activities = ActivityService::new(pool.clone()).activity_count().await?;
            println!("\n=== MERGINGTON API INFO ===");
            println!("Config source: {}", config.source);
            println!("Database:      {}", config.database_url);
            println!("Listen port:   {}", config.listen_port);
            println!("Static dir:    {}", config.static_dir);
            println!("Log dir:       {}", config.log_dir);
            println!("Activities:    {}", activities);
            println!("===========================\n");
        }
    }

    Ok(())
}

async fn run_server(pool: sqlx::SqlitePool, config: &AppConfig) -> Result<()> {
    let state = AppState::new(pool);
    let app = router::build_router(state, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
