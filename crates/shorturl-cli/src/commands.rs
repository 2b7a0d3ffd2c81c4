use anyhow::Context;
use colored::Colorize;
use shorturl_server::{normalize_url, ServerConfig, ShortUrlServer};
use shorturl_store::{SqliteStore, StoreConfig, UrlStore};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Encode(args) => cmd_encode(args),
        Command::Decode(args) => cmd_decode(args),
    }
}

/// Apply store flags on top of `base`.
fn store_config(args: &StoreArgs, base: StoreConfig) -> StoreConfig {
    StoreConfig {
        starting_index: args.index.unwrap_or(base.starting_index),
        path: args.storage.clone().unwrap_or(base.path),
    }
}

/// Build the server config: defaults, then the config file, then flags.
fn server_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(addr) = args.address {
        config.bind_addr = addr;
    }
    if let Some(base) = &args.base_url {
        config.base_url = Some(base.clone());
    }
    config.store = store_config(&args.store, config.store);
    Ok(config)
}

fn open_store(config: &StoreConfig) -> anyhow::Result<SqliteStore> {
    SqliteStore::from_config(config)
        .with_context(|| format!("opening store {}", config.path.display()))
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = server_config(&args)?;
    let server = ShortUrlServer::open(config).context("starting server")?;
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let origin = if args.raw {
        args.url.clone()
    } else {
        normalize_url(&args.url).with_context(|| format!("cannot shorten {:?}", args.url))?
    };
    let store = open_store(&store_config(&args.store, StoreConfig::default()))?;
    let code = store.encode(&origin)?;
    tracing::debug!(%origin, %code, "encoded");
    println!("{}", code.green().bold());
    store.close()?;
    Ok(())
}

fn cmd_decode(args: DecodeArgs) -> anyhow::Result<()> {
    // A zero floor leaves the id counter untouched.
    let config = StoreConfig {
        starting_index: 0,
        path: args.storage.unwrap_or_else(|| StoreConfig::default().path),
    };
    let store = open_store(&config)?;
    let origin = store
        .decode(&args.code)
        .with_context(|| format!("no URL for code {}", args.code.yellow()))?;
    println!("{origin}");
    store.close()?;
    Ok(())
}
