use anyhow::Result;
use asset_optimizer::app::{App, DEFAULT_IMAGES_DIR};
use asset_optimizer::image::CodecConverter;
use asset_optimizer::models::Catalog;
use asset_optimizer::report::Reporter;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "asset-optimizer")]
#[command(about = "Convert bundled image assets to WebP and AVIF")]
struct CliArgs {
    /// Directory holding the source images and receiving the outputs.
    #[arg(value_name = "IMAGES_DIR", default_value = DEFAULT_IMAGES_DIR)]
    images_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asset_optimizer=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    info!("Starting asset-optimizer in {}", args.images_dir.display());

    let mut app = App::new(
        Box::new(CodecConverter::new()),
        Reporter::stdio(),
        args.images_dir,
    );

    match app.run(&Catalog::bundled()).await {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("Optimization failed: {}", e);
            std::process::exit(1);
        }
    }
}
