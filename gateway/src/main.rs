use anyhow::Context;
use api::bridge::ApiBridge;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use viewpointcore::generation::GenerationClient;
use workflow::config::GatewayConfig;
use workflow::runner::{OfflineRequest, Runner};

mod api;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Viewpoint image-generation gateway")]
struct Args {
    /// Generate a single image from the arguments below and exit
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Keep serving HTTP after an offline run
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Load gateway config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    bind: Option<String>,
    /// Image model identifier override
    #[arg(long)]
    model: Option<String>,
    #[arg(long, default_value_t = 51.5007)]
    lat: f64,
    #[arg(long, default_value_t = -0.1246)]
    lng: f64,
    /// Degrees, 0 = north, clockwise
    #[arg(long, default_value_t = 0.0)]
    bearing: f64,
    /// Meters
    #[arg(long, default_value_t = 150.0)]
    length: f64,
    #[arg(long, default_value_t = 16.0)]
    zoom: f64,
    #[arg(long)]
    prompt: Option<String>,
    /// Output path without extension; the image type picks one
    #[arg(long, default_value = "tools/data/viewpoint")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Precedence: command line, then environment, then config file, then defaults.
    let config = match &args.config {
        Some(path) => GatewayConfig::load(path)?,
        None => GatewayConfig::default(),
    }
    .with_env_overrides()
    .with_args(args.bind.clone(), args.model.clone());

    let settings = config.to_settings();
    let client = Arc::new(GenerationClient::from_settings(&settings));
    let bridge = ApiBridge::new(client.clone());
    if client.is_mock() {
        bridge.publish_status("GEMINI_API_KEY not set; serving mock placeholders.");
    } else {
        bridge.publish_status(&format!("Using model {}", client.model()));
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating gateway runtime")?;

    if args.offline {
        let runner = Runner::new(config.clone(), client.clone());
        let request = OfflineRequest {
            latitude: args.lat,
            longitude: args.lng,
            bearing: args.bearing,
            length: args.length,
            zoom: args.zoom,
            prompt: args.prompt.clone(),
        };
        let outcome = runtime.block_on(runner.execute(&request, &args.output))?;
        println!(
            "Offline run -> id {}, model {}, image {}",
            outcome.result.id,
            outcome.result.model_identifier.as_deref().unwrap_or("unknown"),
            outcome.image_path.display()
        );
    }

    if args.serve || !args.offline {
        let address = config.bind_address()?;
        let routes = bridge.routes();
        runtime.block_on(async move {
            let (bound, server) = warp::serve(routes)
                .try_bind_with_graceful_shutdown(address, async {
                    if let Err(err) = signal::ctrl_c().await {
                        log::error!("awaiting Ctrl+C failed: {}", err);
                    }
                })
                .with_context(|| format!("binding {}", address))?;
            bridge.publish_status(&format!("HTTP gateway on http://{} (Ctrl+C to stop)...", bound));
            server.await;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
