//! gesture-pointer - hand-gesture pointer driven by recorded detections.

mod headless;

use clap::Parser;
use gesture_pointer::PointerConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gesture-pointer", about = "Hand-gesture pointer input")]
struct Cli {
    /// JSON-lines file of recorded detections to replay
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Configuration plist (default: built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Consumer frame rate
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Simulated detector latency in milliseconds
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// Exit after N seconds
    #[arg(long)]
    exit_after: Option<u64>,

    /// Write the interaction recording to this JSON file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Virtual screen size as WxH
    #[arg(long, default_value = "1920x1080")]
    screen: String,

    /// Print the active configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("gesture-pointer {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_pointer=info".into()),
        )
        .init();

    let pointer_config = match &cli.config {
        Some(path) => PointerConfig::load(path)?,
        None => PointerConfig::default(),
    };

    if cli.print_config {
        println!("{}", pointer_config.config_sexp());
        return Ok(());
    }

    let Some(replay) = cli.replay else {
        anyhow::bail!("no input: pass --replay FILE");
    };

    let (width, height) = headless::HeadlessConfig::parse_resolution(&cli.screen)
        .ok_or_else(|| anyhow::anyhow!("invalid --screen {}: expected WxH", cli.screen))?;

    info!("gesture-pointer v{} starting", env!("CARGO_PKG_VERSION"));
    info!("replay: {}", replay.display());

    let config = headless::HeadlessConfig {
        replay,
        record: cli.record,
        width,
        height,
        fps: cli.fps,
        latency_ms: cli.latency_ms,
        exit_after: cli.exit_after.map(Duration::from_secs),
        ..headless::HeadlessConfig::default()
    };

    headless::run(config, pointer_config)
}
