use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use clap::Parser;
use gemqa::Config;
use gemqa::web::{self, AppState, DEFAULT_PORT};
use tokio::net::TcpListener;
use tracing::info;

/// gemqa-web - HTTP front end for Gemini question answering
#[derive(Parser)]
#[command(name = "gemqa-web")]
#[command(about = "Serves a question page and a JSON /ask endpoint")]
#[command(version)]
struct Cli {
    /// Address to bind
    #[arg(long, value_name = "ADDR", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn main() {
    // .env must be loaded before clap reads PORT
    let config = Config::load();
    let cli = Cli::parse();
    gemqa::init_tracing("info");

    if let Err(e) = run(&cli, &config) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    // Built before the runtime starts: the Gemini client is blocking
    let state = AppState::from_config(config).context("Failed to create Gemini client")?;
    let keep_alive = state.clone();

    info!(model = config.model(), "Starting gemqa-web");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let addr = SocketAddr::new(cli.host, cli.port);
    let result = runtime.block_on(async move {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        web::serve(listener, state).await.context("Server error")
    });

    // Last handle on the blocking client is released outside the runtime
    drop(runtime);
    drop(keep_alive);
    result
}
