//! # CLI Interface
//!
//! Command-line structure for `wallet-node`, via `clap` derive. Subcommands:
//! `run`, `invoke`, `digest`, and `version`. Every setting a deployment
//! would change has a `WALLET_*` environment fallback.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Wallet ledger node.
///
/// Hosts the wallet ledger over a persistent sled store, serves the invoke
/// API, and exposes Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "wallet-node",
    about = "Wallet ledger node",
    version,
    propagate_version = true
)]
pub struct WalletNodeCli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "WALLET_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the ledger API.
    Run(RunArgs),
    /// Run one operation against the local database and print the response.
    Invoke(InvokeArgs),
    /// Read a password from stdin and print its digest.
    ///
    /// Use the output as `WALLET_MASTER_DIGEST`.
    Digest,
    /// Print version information and exit.
    Version,
}

/// Settings shared by every subcommand that opens the ledger.
#[derive(Args, Debug, Clone)]
pub struct LedgerArgs {
    /// Directory holding the sled database. Created on first use.
    #[arg(long, short = 'd', env = "WALLET_DATA_DIR", default_value = "./wallet-data")]
    pub data_dir: PathBuf,

    /// Upper-case hex SHA-256 digest of the master password.
    #[arg(long, env = "WALLET_MASTER_DIGEST", hide_env_values = true)]
    pub master_digest: String,

    /// Opening balance of the master wallet, as a decimal amount.
    #[arg(long, env = "WALLET_INITIAL_BALANCE", default_value = "100000")]
    pub initial_balance: String,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    /// Port for the invoke API.
    #[arg(long, env = "WALLET_RPC_PORT", default_value_t = 9741)]
    pub rpc_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "WALLET_METRICS_PORT", default_value_t = 9742)]
    pub metrics_port: u16,
}

#[derive(Args, Debug)]
pub struct InvokeArgs {
    #[command(flatten)]
    pub ledger: LedgerArgs,

    /// Operation name, e.g. `createWallet`.
    pub function: String,

    /// Positional string arguments for the operation.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
