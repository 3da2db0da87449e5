//! Headless host for stylesheet lifecycles.
//!
//! Loads a host config, builds an HTTP-backed document head, and drives one
//! application through bootstrap and a number of mount/unmount cycles,
//! printing the document head after each step.
//!
//! ```text
//! css-lifecycles --config navbar.toml --cycles 2 --hold-ms 500
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use url::Url;

use css_lifecycles::assets::BuildAssets;
use css_lifecycles::config::load_config;
use css_lifecycles::net::HttpStylesheetLoader;
use css_lifecycles::observability::{logging, metrics};
use css_lifecycles::{AppProps, CssLifecycles, HeadDocument};

#[derive(Parser)]
#[command(name = "css-lifecycles")]
#[command(
    about = "Drive stylesheet lifecycles for a micro-frontend against a headless document",
    long_about = None
)]
struct Cli {
    /// Host configuration file (TOML).
    #[arg(short, long, default_value = "css-lifecycles.toml")]
    config: PathBuf,

    /// Build asset JSON file; overrides the [build_assets] table.
    #[arg(long)]
    build_assets: Option<PathBuf>,

    /// Number of mount/unmount cycles to run.
    #[arg(long, default_value_t = 1)]
    cycles: u32,

    /// Time to stay mounted in each cycle, in milliseconds.
    #[arg(long, default_value_t = 0)]
    hold_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_tracing(&config.observability);
    tracing::info!(
        config = %cli.config.display(),
        app = %config.app.name,
        "css-lifecycles starting"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let base_url = Url::parse(&config.loader.base_url)?;
    let request_timeout = Duration::from_secs(config.loader.request_timeout_secs);
    let loader = HttpStylesheetLoader::new(base_url, request_timeout)?;
    let document = Arc::new(HeadDocument::with_loader(Arc::new(loader)));

    let build_assets = match &cli.build_assets {
        Some(path) => Some(BuildAssets::load(path)?),
        None => config.build_assets.clone(),
    };

    let mut builder = CssLifecycles::builder(document.clone());
    if let Some(assets) = build_assets {
        builder = builder.build_assets(assets);
    }
    let lifecycles = builder.build(config.css.clone())?;
    let props = AppProps::new(config.app.name.clone());

    lifecycles.bootstrap(&props).await?;
    println!("# bootstrapped\n{}", document.render_head());

    for cycle in 1..=cli.cycles {
        if let Err(e) = lifecycles.mount(&props).await {
            tracing::error!(cycle, error = %e, "Mount failed");
            println!("# mount failed (cycle {})\n{}", cycle, document.render_head());
            return Err(e.into());
        }
        println!("# mounted (cycle {})\n{}", cycle, document.render_head());

        if cli.hold_ms > 0 {
            tokio::time::sleep(Duration::from_millis(cli.hold_ms)).await;
        }

        lifecycles.unmount(&props).await;
        println!("# unmounted (cycle {})\n{}", cycle, document.render_head());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
