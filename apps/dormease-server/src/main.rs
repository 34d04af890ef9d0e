use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use std::path::{Path, PathBuf};
use std::time::Duration;

use api_ingress::{ApiIngress, ApiIngressConfig};
use housing::config::HousingConfig;
use housing::Housing;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MEMORY_DSN: &str = "sqlite::memory:";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps in-memory DSNs as `sqlite::memory:`.
/// - Adds `mode=rwc` so a missing database file is created.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case(MEMORY_DSN) || dsn.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    out.push('?');
    out.push_str(query.unwrap_or("mode=rwc"));
    Ok(out)
}

/// Only SQLite is compiled in.
fn validate_dsn(cfg: &DatabaseConfig) -> Result<()> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        bail!("Database URL not configured");
    }
    if !raw.starts_with("sqlite:") {
        bail!("Unsupported database URL '{raw}': only sqlite is supported");
    }
    Ok(())
}

/// DormEase Server - student housing marketplace
#[derive(Parser)]
#[command(name = "dormease-server")]
#[command(about = "DormEase Server - student housing marketplace")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("DormEase Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
        Commands::Migrate => migrate(config, args).await,
    }
}

/// Resolves the DSN to connect to: `--mock` forces an in-memory database.
fn resolve_dsn(config: &AppConfig, args: &CliArgs) -> Result<String> {
    if args.mock {
        return Ok(MEMORY_DSN.to_string());
    }
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| anyhow!("No database configuration found"))?;
    validate_dsn(db_config)?;
    absolutize_sqlite_dsn(db_config.url.trim(), &config.home_dir(), true)
}

async fn connect(config: &AppConfig, args: &CliArgs) -> Result<DatabaseConnection> {
    let dsn = resolve_dsn(config, args)?;

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if let Some(db_config) = config.database.as_ref().filter(|_| !args.mock) {
        if let Some(max) = db_config.max_conns {
            opts.max_connections(max);
        }
        if let Some(ms) = db_config.busy_timeout_ms {
            let busy = Duration::from_millis(u64::from(ms));
            opts.map_sqlx_sqlite_opts(move |o| o.busy_timeout(busy));
        }
    }

    tracing::info!("Connecting to database: {}", dsn);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("failed to connect to {dsn}"))?;
    tracing::info!("Connected to database");
    Ok(db)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let housing_cfg: HousingConfig = config.module_config(Housing::NAME)?;
    let ingress_cfg: ApiIngressConfig = config.module_config("api_ingress")?;
    let addr = ingress_cfg.resolve_bind_addr(&config.server.host, config.server.port)?;

    let db = connect(&config, &args).await?;
    Housing::migrate(&db).await?;
    let housing = Housing::init(&housing_cfg, db)?;

    let ingress = ApiIngress::new(ingress_cfg);
    let routes = housing.register_rest(axum::Router::new())?;
    let doc = api_ingress::openapi::build_document([Housing::openapi()]);
    let router = ingress.build_router(routes, Some(doc))?;

    ingress.serve(router, addr, shutdown_signal()).await?;
    tracing::info!("DormEase Server stopped");
    Ok(())
}

async fn migrate(config: AppConfig, args: CliArgs) -> Result<()> {
    let db = connect(&config, &args).await?;
    Housing::migrate(&db).await?;
    println!("Migrations applied");
    Ok(())
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let housing_cfg: HousingConfig = config.module_config(Housing::NAME)?;
    if housing_cfg.min_monthly_price > housing_cfg.max_monthly_price {
        bail!("invalid housing configuration: min_monthly_price exceeds max_monthly_price");
    }
    let ingress_cfg: ApiIngressConfig = config.module_config("api_ingress")?;
    ingress_cfg.resolve_bind_addr(&config.server.host, config.server.port)?;
    resolve_dsn(&config, &args)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
