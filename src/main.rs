//! Container runtime API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dockwatch_api::api::{create_router, AppState};
use dockwatch_api::config::Config;
use dockwatch_api::metrics;
use dockwatch_api::runtime::{ContainerRuntime, DockerRuntime};
use dockwatch_api::utils::shutdown_signal;

/// Key-protected JSON API over the local container runtime.
#[derive(Parser, Debug)]
#[command(name = "dockwatch-api")]
#[command(about = "Serve read-only container runtime queries over HTTP")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Run every runtime query once and report the results.
    CheckRuntime,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("dockwatch_api=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Initialize metrics
    metrics::init_metrics();

    match args.command {
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::CheckRuntime) => cmd_check_runtime().await,
        None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration, logging failures.
fn load_config() -> anyhow::Result<Config> {
    Config::load_validated().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e.into()
    })
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("DOCKWATCH API - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Listen: {}:{}", config.host, config.port);
    println!("  Key Match: {}", config.key_match);
    println!("  Upstream Errors: {}", config.upstream_errors);
    println!(
        "  Docker Host: {}",
        config.docker_host.as_deref().unwrap_or("local defaults")
    );
    match config.current_container_ref() {
        Some(name) => println!("  Current Container: {}", name),
        None => println!("  WARNING: no CURRENT_CONTAINER or HOSTNAME; /api/containers, /api/stats and /api/logs will fail"),
    }
    println!("  Log Tail: {}", config.log_tail);
    match config.metrics_port {
        Some(port) => println!("  Metrics Port: {}", port),
        None => println!("  Metrics: Disabled"),
    }
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run each runtime query once.
async fn cmd_check_runtime() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("DOCKWATCH API - RUNTIME CHECK");
    println!("======================================================================");

    let config = load_config()?;
    let runtime = DockerRuntime::connect(&config)?;

    print!("\n1. Current container... ");
    let container = match runtime.container().await {
        Ok(c) => {
            println!("OK");
            println!("   {} ({}) {}", c.name, c.image, c.state);
            Some(c)
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
            None
        }
    };

    print!("\n2. Images... ");
    report_count(runtime.images().await.map(|v| v.len()));

    print!("\n3. Volumes... ");
    report_count(runtime.volumes().await.map(|v| v.len()));

    print!("\n4. Networks... ");
    report_count(runtime.networks().await.map(|v| v.len()));

    print!("\n5. Stats... ");
    match runtime.stats().await {
        Ok(s) => {
            println!("OK");
            println!(
                "   CPU {:.2}%  Memory {} / {} ({:.1}%)",
                s.cpu_percent, s.memory_usage, s.memory_limit, s.memory_percent
            );
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
        }
    }

    print!("\n6. Logs... ");
    match container {
        Some(c) => report_count(runtime.logs(&c).await.map(|l| l.len())),
        None => println!("SKIPPED (no current container)"),
    }

    println!("\n======================================================================");
    println!("RUNTIME CHECK COMPLETED");
    println!("======================================================================");

    Ok(())
}

fn report_count<E: std::fmt::Display>(result: Result<usize, E>) {
    match result {
        Ok(n) => {
            println!("OK");
            println!("   Found: {}", n);
        }
        Err(e) => {
            println!("FAILED");
            println!("   Error: {}", e);
        }
    }
}

/// Run the HTTP server until shutdown.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config()?;

    if let Some(port) = port_override {
        config.port = port;
    }

    info!("Configuration loaded successfully");
    info!("Key match: {}", config.key_match);
    info!("Upstream errors: {}", config.upstream_errors);

    if let Some(port) = config.metrics_port {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        metrics::install_exporter(addr)?;
        info!("Metrics exporter listening on {}", addr);
    }

    let runtime: Arc<dyn ContainerRuntime> = Arc::new(DockerRuntime::connect(&config)?);
    let app_state = AppState::new(&config, runtime);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
