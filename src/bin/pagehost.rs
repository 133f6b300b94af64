use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Parser as ClapParser;
use pagehost::config::Config;
use pagehost::dispatch::App;
use pagehost::logging;
use pagehost::rouille_runner::run_server;
use tracing::info;

#[derive(clap::Parser, Debug)]
/// Serve the site found in the data directory.
struct Args {
    /// Address to listen on.
    #[clap(long, env = "LISTEN_HTTP", default_value = "127.0.0.1:3000")]
    listen: String,

    /// Directory with `templates/`, `dictionary/` and `static/`.
    #[clap(long, env = "DATADIR", default_value = "data")]
    datadir: PathBuf,

    /// The config file; defaults to `config.json` in the data
    /// directory. Created by the setup page if missing.
    #[clap(long, env = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set.
    #[clap(long, default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(&args.log)?;

    let config_file = args.config.unwrap_or_else(|| args.datadir.join("config.json"));
    let config = Config::open(&config_file)?;
    if !config.is_setup_complete() {
        info!("setup is not complete, all pages redirect to /setup");
    }
    let app = Arc::new(App::new(&args.datadir, config, Some(config_file)));
    let static_dir = args.datadir.join("static");

    let http_thread = run_server("pagehost_http", args.listen, app, Some(static_dir))?;
    http_thread.join().map_err(|_| anyhow!("server thread panicked"))?;
    Ok(())
}
