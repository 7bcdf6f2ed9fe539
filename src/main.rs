#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use interim_pages::core::SiteConfig;
use interim_pages::{PagesResult, generate_cmd};

#[derive(Parser, Debug)]
#[command(name = "interim-pages")]
#[command(about = "Generate listing pages for numbered interim build directories", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set INTERIM_PAGES_LOG)
    #[arg(long)]
    verbose: bool,

    /// Site root holding index.html and the builds directory
    #[arg(long)]
    root: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write machine-readable JSON report to this file
    #[arg(long)]
    json: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("INTERIM_PAGES_LOG").unwrap_or_else(|_| {
        if verbose { "interim_pages=debug".to_string() } else { "interim_pages=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn load_config(cli: &Cli) -> PagesResult<SiteConfig> {
    let mut config = match &cli.config {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.site_root = root.clone();
    }
    Ok(config)
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(&cli).and_then(|config| generate_cmd::run(config, cli.json.clone()));

    match result {
        Ok(report) => std::process::exit(report.exit_code()),
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}
