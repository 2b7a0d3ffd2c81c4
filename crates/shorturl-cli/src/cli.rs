use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "shorturl",
    about = "Short, reversible, human-typable links for long URLs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the code for a URL, storing it if new
    Encode(EncodeArgs),
    /// Print the URL stored under a code
    Decode(DecodeArgs),
}

/// Store location and id floor, shared by every subcommand.
#[derive(Args, Clone, Debug)]
pub struct StoreArgs {
    /// Storage file
    #[arg(short = 's', long = "storage")]
    pub storage: Option<PathBuf>,
    /// Start index: no id below it is ever allocated (0 disables)
    #[arg(short = 'i', long = "index")]
    pub index: Option<u64>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Listen on the address
    #[arg(short = 'a', long = "address")]
    pub address: Option<SocketAddr>,
    /// Base URL for returned links (default: derived from the Host header)
    #[arg(short = 'b', long = "base-url")]
    pub base_url: Option<String>,
    /// TOML config file; flags override its values
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args)]
pub struct EncodeArgs {
    pub url: String,
    /// Store the URL byte for byte instead of normalizing it first
    #[arg(long)]
    pub raw: bool,
    #[command(flatten)]
    pub store: StoreArgs,
}

/// Decoding only reads, so it takes no start index.
#[derive(Args)]
pub struct DecodeArgs {
    pub code: String,
    /// Storage file
    #[arg(short = 's', long = "storage")]
    pub storage: Option<PathBuf>,
}
