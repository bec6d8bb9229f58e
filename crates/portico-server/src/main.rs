//! Portico Edge Server
//!
//! This server provides:
//! - Tenant resolution from the Host header (file or HTTP directory, cached)
//! - Archetype-aware route decisions (allow, CMS fallback, redirect)
//! - Session-hint redirects for auth entry and protected paths
//! - Context propagation to the rendering upstream via x-portico-* headers
//! - An internal template resolution endpoint for the rendering layer
//!
//! Usage:
//! ```bash
//! # With config file
//! portico-server --config config.yaml
//!
//! # Or with environment variables
//! PORTICO_TENANTS_FILE=tenants.yaml portico-server
//!
//! # With both (env vars override config)
//! PORTICO_UPSTREAM_URL=http://localhost:3000 portico-server --config config.yaml
//!
//! # Validate a configuration without starting the server
//! portico-server check-config --config config.yaml
//! ```
//!
//! Test with:
//! ```bash
//! # Tenant content (allowed, proxied with x-portico-* context headers)
//! curl -H "Host: harborside.test" http://localhost:8080/about
//!
//! # Protected path without a session (307 to /login?next=...)
//! curl -i -H "Host: harborside.test" http://localhost:8080/dashboard
//!
//! # Template resolution for the rendering layer
//! curl "http://localhost:8080/api/internal/template-resolution?domain=harborside.test&path=/about"
//! ```

mod config;
mod readiness;
mod resolution;

use axum::{Router, middleware};
use clap::{Parser, Subcommand};
use config::{DirectorySource, ServerConfig};
use portico_core::TenantDirectory;
use portico_directory::{
    CachedDirectory, DirectoryCacheConfig, FileTenantDirectory, HttpTenantDirectory,
};
use portico_ingress::{
    EdgeState, UpstreamRenderer, edge_middleware, request_context_middleware,
    security_headers_middleware, with_renderer,
};
use portico_observability::{
    HealthState, Metrics, TracerConfig, health_router, init_tracer_provider,
};
use portico_templates::TemplateRegistry;
use readiness::DirectoryReadiness;
use resolution::ResolutionState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const GATE: &str = r#"
                   /\
                  /  \
             ____/____\____
            |______________|
             | || || || | |
             | || || || | |      ____            _   _
             | || || || | |     |  _ \ ___  _ __| |_(_) ___ ___
             | || || || | |     | |_) / _ \| '__| __| |/ __/ _ \
            _|_||_||_||_|_|_    |  __/ (_) | |  | |_| | (_| (_) |
           |________________|   |_|   \___/|_|    \__|_|\___\___/
                                 https://portico.dev
                                 version : {VERSION}
"#;

/// Portico Server - Multi-Tenant Edge Router
#[derive(Parser)]
#[command(name = "portico-server")]
#[command(about = "Portico edge server for multi-tenant routing", long_about = None)]
#[command(before_help = GATE)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "PORTICO_CONFIG",
        global = true
    )]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Portico edge server (default if no command specified)
    Serve,
    /// Load the configuration, validate it, and print the resolved settings
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration, then let environment variables override it
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    config.merge_env();

    // Handle subcommands
    match cli.command {
        Some(Commands::CheckConfig) => {
            return check_config(&config).await;
        }
        Some(Commands::Serve) | None => {
            // Continue with server startup (default behavior)
        }
    }

    // Initialize tracing with the configured level
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let filter = EnvFilter::new(format!("{}", log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!("{}", GATE.replace("{VERSION}", env!("CARGO_PKG_VERSION")));

    match &cli.config {
        Some(path) => info!("📁 Loaded configuration from: {}", path),
        None => info!("📁 Using default configuration"),
    }

    info!("🚀 Initializing Portico edge");

    // Optional OpenTelemetry tracer; metrics and health endpoints are
    // always on
    let tracer_provider = if config.tracing.enabled {
        let provider = init_tracer_provider(TracerConfig {
            service_name: "portico-server".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            sampling_rate: config.tracing.sampling_rate,
        });
        opentelemetry::global::set_tracer_provider(provider.clone());
        info!(
            "🛰  OpenTelemetry tracing enabled (sampling rate {})",
            config.tracing.sampling_rate
        );
        Some(provider)
    } else {
        None
    };

    info!("📊 Initializing observability (metrics, health endpoints)");
    let metrics = Arc::new(Metrics::new()?);

    // Tenant directory per configured source
    let inner: Arc<dyn TenantDirectory> = match config.directory.source {
        DirectorySource::File => {
            let file_directory =
                Arc::new(FileTenantDirectory::new(&config.directory.tenants_file).await?);
            info!(
                "✓ Tenant directory: file ({}, {} tenants)",
                config.directory.tenants_file,
                file_directory.len()
            );
            if config.directory.watch {
                file_directory.watch();
            }
            file_directory
        }
        DirectorySource::Http => {
            let Some(base_url) = config.directory.base_url.clone() else {
                anyhow::bail!("directory.base_url is required when directory.source is 'http'");
            };
            let mut http_directory = HttpTenantDirectory::with_timeout(
                &base_url,
                Duration::from_secs(config.directory.lookup_timeout_secs),
            )?;
            if let Some(api_key) = &config.directory.api_key {
                http_directory = http_directory.with_api_key(api_key);
            }
            info!("✓ Tenant directory: http ({})", base_url);
            Arc::new(http_directory)
        }
    };

    let directory: Arc<dyn TenantDirectory> = if config.directory.cache.enabled {
        let cache = DirectoryCacheConfig {
            ttl: Duration::from_secs(config.directory.cache.ttl_secs),
            negative_ttl: Duration::from_secs(config.directory.cache.negative_ttl_secs),
            max_entries: config.directory.cache.max_entries,
        };
        info!(
            "✓ Directory cache enabled (ttl {}s, negative ttl {}s, max {} entries)",
            config.directory.cache.ttl_secs,
            config.directory.cache.negative_ttl_secs,
            config.directory.cache.max_entries
        );
        Arc::new(CachedDirectory::new(inner, cache).with_metrics(metrics.clone()))
    } else {
        info!("✓ Directory cache disabled");
        inner
    };

    // Readiness follows the directory: if lookups cannot be answered,
    // every decision degrades to "no tenant" and this pod should be
    // rotated out
    let readiness = DirectoryReadiness::start(directory.clone(), Duration::from_secs(10));
    let health_state = HealthState::with_readiness_checker(metrics.clone(), readiness);

    let edge_state = EdgeState::new(directory.clone()).with_metrics(metrics.clone());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream.timeout_secs))
        .build()?;
    let renderer = Arc::new(UpstreamRenderer::new(
        config.upstream.base_url.clone(),
        Arc::new(client),
    ));
    info!("✓ Upstream renderer: {}", renderer.base_url());

    let resolution_router = resolution::router(ResolutionState {
        directory: directory.clone(),
        registry: TemplateRegistry::shared(),
        metrics: Some(metrics.clone()),
    });

    // Routed endpoints first, renderer proxy as the fallback, then the
    // edge pipeline in front of everything
    let app = Router::new()
        .merge(health_router(health_state))
        .merge(resolution_router);
    let app = with_renderer(app, renderer, Some(metrics.clone()));
    let app = app
        .layer(middleware::from_fn_with_state(edge_state, edge_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_context_middleware));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("");
    info!("✅ Portico edge listening on http://{}", addr);
    info!("   Tenant traffic is proxied to {}", config.upstream.base_url);
    info!("   Internal API:");
    info!(
        "   - Template resolution: http://{}/api/internal/template-resolution",
        addr
    );
    info!("   Observability:");
    info!("   - Health check:       http://{}/healthz", addr);
    info!("   - Readiness check:    http://{}/readyz", addr);
    info!("   - Prometheus metrics: http://{}/metrics", addr);
    info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(provider) = tracer_provider
        && let Err(e) = provider.shutdown()
    {
        warn!("Tracer provider shutdown failed: {}", e);
    }

    Ok(())
}

/// Validate the resolved configuration and print a summary.
///
/// File-backed directories are actually loaded, so duplicate domains and
/// parse errors surface here instead of at startup.
async fn check_config(config: &ServerConfig) -> anyhow::Result<()> {
    println!("listen    : {}:{}", config.host, config.port);

    match config.directory.source {
        DirectorySource::File => {
            let directory = FileTenantDirectory::new(&config.directory.tenants_file).await?;
            println!(
                "directory : file {} ({} tenants)",
                config.directory.tenants_file,
                directory.len()
            );
        }
        DirectorySource::Http => {
            let Some(base_url) = &config.directory.base_url else {
                anyhow::bail!("directory.base_url is required when directory.source is 'http'");
            };
            println!("directory : http {}", base_url);
        }
    }

    if config.directory.cache.enabled {
        println!(
            "cache     : ttl {}s, negative ttl {}s, max {} entries",
            config.directory.cache.ttl_secs,
            config.directory.cache.negative_ttl_secs,
            config.directory.cache.max_entries
        );
    } else {
        println!("cache     : disabled");
    }

    println!("upstream  : {}", config.upstream.base_url);
    println!("logging   : {}", config.logging.level);
    println!(
        "tracing   : {}",
        if config.tracing.enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!();
    println!("✓ Configuration OK");

    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
