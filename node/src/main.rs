// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Wallet Ledger Node
//!
//! Entry point for the `wallet-node` binary. Parses CLI arguments, sets up
//! logging and metrics, opens the sled store, and serves the invoke API.
//!
//! - `run`     serve the API and metrics endpoints
//! - `invoke`  run one operation against the local database
//! - `digest`  hash a password from stdin, for `WALLET_MASTER_DIGEST`
//! - `version` print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::BufRead;
use std::sync::Arc;
use tokio::signal;

use wallet_ledger::crypto::digest;
use wallet_ledger::storage::SledStore;
use wallet_ledger::{invoke, Amount, Ledger, LedgerConfig};

use cli::{Commands, LedgerArgs, WalletNodeCli};
use logging::LogFormat;
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = WalletNodeCli::parse();
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&cli.log_format),
    );

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Invoke(args) => invoke_once(args),
        Commands::Digest => print_digest(),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Opens the store under `data_dir` and builds the ledger from deployment
/// settings. Refuses to continue without a well-formed master digest.
fn open_ledger(args: &LedgerArgs) -> Result<(SledStore, Ledger)> {
    let config = LedgerConfig::from_master_digest(&args.master_digest)
        .context("WALLET_MASTER_DIGEST is not a valid SHA-256 hex digest")?;
    let initial = Amount::parse(&args.initial_balance).with_context(|| {
        format!(
            "invalid master initial balance: {:?}",
            args.initial_balance
        )
    })?;
    let ledger = Ledger::new(config.with_initial_balance(initial));

    let db_path = args.data_dir.join("db");
    std::fs::create_dir_all(&db_path)
        .with_context(|| format!("failed to create database directory: {}", db_path.display()))?;
    let store = SledStore::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;

    tracing::info!(
        path = %db_path.display(),
        wallets = store.account_count(),
        "database opened"
    );
    Ok((store, ledger))
}

/// Serves the invoke API and the metrics endpoint until a shutdown signal.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    tracing::info!(
        rpc_port = args.rpc_port,
        metrics_port = args.metrics_port,
        data_dir = %args.ledger.data_dir.display(),
        "starting wallet-node"
    );

    let (store, ledger) = open_ledger(&args.ledger)?;
    let store = Arc::new(store);

    let node_metrics = Arc::new(NodeMetrics::new().context("failed to register metrics")?);
    node_metrics.wallets.set(store.account_count() as i64);

    let app_state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: Arc::clone(&store),
        ledger: Arc::new(ledger),
        metrics: Arc::clone(&node_metrics),
    };

    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.rpc_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    store.flush().context("failed to flush database")?;
    tracing::info!("wallet-node stopped");
    Ok(())
}

/// Runs one operation and prints the response JSON to stdout.
fn invoke_once(args: cli::InvokeArgs) -> Result<()> {
    let (store, ledger) = open_ledger(&args.ledger)?;
    let response = invoke(&store, &ledger, &args.function, &args.args);

    println!("{}", serde_json::to_string_pretty(&response)?);

    match response.kind {
        None => Ok(()),
        Some(kind) => anyhow::bail!("{} failed ({}): {}", args.function, kind, response.message),
    }
}

/// Reads one line from stdin and prints its digest.
fn print_digest() -> Result<()> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;

    let password = line.trim_end_matches(['\n', '\r']);
    if password.is_empty() {
        anyhow::bail!("empty password on stdin");
    }

    println!("{}", digest(password));
    Ok(())
}

fn print_version() {
    println!("wallet-node   {}", env!("CARGO_PKG_VERSION"));
    println!("wallet-ledger {}", wallet_ledger::VERSION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
