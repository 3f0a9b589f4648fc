//! One-shot antipode render.
//!
//! Acquires the latest GFS snapshot (or saved OPeNDAP responses), finds
//! antipodal matches, renders one map per layer and writes the JSON payload
//! to stdout or a file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ingestion::{
    CoastlineSource, GeometrySource, GfsGridSource, GridSource, StaticGeometrySource,
    StaticGridSource,
};
use renderer::InterpolationMethod;
use symmetry::ToleranceMode;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use antipode_render::{ConfigOverrides, RenderConfig, RenderPipeline};

#[derive(Parser, Debug)]
#[command(name = "antipode-render")]
#[command(about = "Find antipodal weather matches and render temperature/pressure maps")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "ANTIPODE_CONFIG")]
    config: Option<PathBuf>,

    /// Write the JSON payload here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Saved OPeNDAP ASCII response for temperature (Kelvin)
    #[arg(long, requires = "pressure_file")]
    temperature_file: Option<PathBuf>,

    /// Saved OPeNDAP ASCII response for pressure (Pascal)
    #[arg(long, requires = "temperature_file")]
    pressure_file: Option<PathBuf>,

    /// Timestamp label for grids loaded from files
    #[arg(long, default_value = "offline")]
    timestamp: String,

    /// Coastline GeoJSON file instead of downloading
    #[arg(long)]
    coastline_file: Option<PathBuf>,

    /// Render without coastlines
    #[arg(long)]
    no_coastlines: bool,

    /// Raster width in pixels
    #[arg(long, env = "ANTIPODE_WIDTH")]
    width: Option<usize>,

    /// Raster height in pixels
    #[arg(long, env = "ANTIPODE_HEIGHT")]
    height: Option<usize>,

    /// Match tolerance
    #[arg(long, env = "ANTIPODE_TOLERANCE")]
    tolerance: Option<f64>,

    /// relative_to_a, symmetric or absolute
    #[arg(long, env = "ANTIPODE_TOLERANCE_MODE")]
    tolerance_mode: Option<String>,

    /// nearest or bilinear
    #[arg(long, env = "ANTIPODE_INTERPOLATION")]
    interpolation: Option<String>,

    /// Hours to look back for a published GFS cycle
    #[arg(long, env = "ANTIPODE_LOOKBACK_HOURS")]
    lookback_hours: Option<u32>,

    /// GFS OPeNDAP root
    #[arg(long, env = "GFS_BASE_URL")]
    gfs_base_url: Option<String>,

    /// Prefix for every upstream request
    #[arg(long, env = "GFS_PROXY_URL")]
    proxy_url: Option<String>,

    /// Coastline GeoJSON URL
    #[arg(long, env = "COASTLINE_URL")]
    coastline_url: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn overrides(&self) -> Result<ConfigOverrides> {
        let tolerance_mode = self
            .tolerance_mode
            .as_deref()
            .map(|s| ToleranceMode::from_str(s).with_context(|| format!("Unknown tolerance mode '{}'", s)))
            .transpose()?;
        let interpolation = self
            .interpolation
            .as_deref()
            .map(|s| {
                InterpolationMethod::from_str(s)
                    .with_context(|| format!("Unknown interpolation method '{}'", s))
            })
            .transpose()?;

        Ok(ConfigOverrides {
            width: self.width,
            height: self.height,
            tolerance: self.tolerance,
            tolerance_mode,
            interpolation,
            lookback_hours: self.lookback_hours,
            gfs_base_url: self.gfs_base_url.clone(),
            proxy_url: self.proxy_url.clone(),
            coastline_url: self.coastline_url.clone(),
            no_coastlines: self.no_coastlines,
        })
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so the payload can be piped from stdout.
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let mut config = RenderConfig::load(args.config.as_deref())?;
    config.apply(&args.overrides()?);
    config.validate().context("Invalid render configuration")?;

    let grid: Arc<dyn GridSource> = match (&args.temperature_file, &args.pressure_file) {
        (Some(temperature), Some(pressure)) => Arc::new(
            StaticGridSource::from_ascii_files(&args.timestamp, temperature, pressure)
                .context("Failed to load grid files")?,
        ),
        _ => Arc::new(GfsGridSource::new(config.gfs.clone())?),
    };

    let geometry: Option<Arc<dyn GeometrySource>> = match &args.coastline_file {
        _ if !config.coastline_style.enabled => None,
        Some(path) => Some(Arc::new(
            StaticGeometrySource::from_geojson_file(path).context("Failed to load coastline file")?,
        )),
        None => Some(Arc::new(CoastlineSource::new(&config.coastlines)?)),
    };

    info!(
        width = config.width,
        height = config.height,
        tolerance = config.tolerance,
        mode = ?config.tolerance_mode,
        "Starting antipode render"
    );

    let pipeline = RenderPipeline::new(config, grid, geometry)?;
    let payload = pipeline.run().await.context("Render failed")?;
    let json = payload.to_json()?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write payload to {:?}", path))?;
            info!(path = ?path, matches = payload.matches.len(), "Wrote payload");
        }
        None => println!("{}", json),
    }

    Ok(())
}
