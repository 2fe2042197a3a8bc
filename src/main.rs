//! Pothole Scout - photograph a road defect and get it detected
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{bail, Result};
use tracing::{info, warn};

use pothole_scout::RunOptions;
use scout_app::config::{self, Settings};
use scout_app::SessionState;

/// Pothole Scout - photograph a road defect and get it detected
#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(about = "Submit a road photo with its location to a pothole detection service", long_about = None)]
struct Args {
    /// Photo to submit (prompts for one when omitted)
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Config file (default: <config dir>/pothole-scout/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Fixed latitude, overriding the config file
    #[arg(long, requires = "longitude", allow_negative_numbers = true)]
    latitude: Option<f64>,

    /// Fixed longitude, overriding the config file
    #[arg(long, requires = "latitude", allow_negative_numbers = true)]
    longitude: Option<f64>,

    /// Write the processed image here once ready
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Show the detection on a map once ready
    #[arg(long)]
    open_map: bool,

    /// Run in headless mode (NDJSON output, single cycle)
    #[arg(long)]
    headless: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

impl Args {
    fn settings(&self) -> Settings {
        let mut settings = config::load_settings(self.config.as_deref());
        if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            settings.location.latitude = Some(lat);
            settings.location.longitude = Some(lon);
        }
        settings
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            image: self.image.clone(),
            output: self.output.clone(),
            open_map: self.open_map,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Err(e) = scout_core::logging::init() {
        eprintln!("Logging disabled: {e}");
    }

    if args.init_config {
        let Some(path) = args.config.clone().or_else(config::default_config_path) else {
            bail!("No config directory on this platform; pass --config");
        };
        if config::init_config_file(&path)? {
            eprintln!("Created {}", path.display());
        } else {
            eprintln!("{} already exists", path.display());
        }
        return Ok(());
    }

    let settings = args.settings();
    config::validate_settings(&settings)?;

    if settings.location.fixed_position().is_none() {
        warn!("No fixed position configured; location services will report disabled");
    }

    let options = args.run_options();
    let state = if args.headless {
        pothole_scout::run_headless(&settings, &options).await?
    } else {
        pothole_scout::run_interactive(&settings, &options).await?
    };

    info!("Exiting in {}", state.phase());
    if matches!(state, SessionState::Failed(_)) && args.image.is_some() {
        std::process::exit(1);
    }

    Ok(())
}
