//! Swath tool.
//!
//! Command-line front end over the swath core:
//! - `planck`: brightness temperature from radiance
//! - `project`: Lambert azimuthal equal-area forward and inverse
//! - `calibrate`: raw counts to physical values with a coefficient table
//! - `descramble`: field-of-regard permutation of an instrument family
//! - `locate`: inverse cell search on a synthetic swath grid
//!
//! Results are printed to stdout as JSON; logs go to stderr.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "swath-tool")]
#[command(about = "Swath calibration, projection and geolocation utilities")]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "SWATH_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Brightness temperature (K) from radiance and wavenumber
    Planck {
        /// Radiance in mW/(m²·sr·cm⁻¹)
        #[arg(long)]
        radiance: f64,

        /// Central wavenumber in cm⁻¹
        #[arg(long)]
        wavenumber: f64,

        /// Radiation constant family: eps or sounder
        #[arg(long, default_value = "eps")]
        constants: String,
    },

    /// Lambert azimuthal equal-area projection of one point
    Project {
        /// Projection center longitude (degrees)
        #[arg(long, allow_hyphen_values = true)]
        center_lon: f64,

        /// Projection center latitude (degrees)
        #[arg(long, allow_hyphen_values = true)]
        center_lat: f64,

        /// Treat the inputs as planar x/y meters and return lon/lat
        #[arg(long)]
        inverse: bool,

        /// Longitude (or x with --inverse)
        #[arg(allow_hyphen_values = true)]
        a: f64,

        /// Latitude (or y with --inverse)
        #[arg(allow_hyphen_values = true)]
        b: f64,
    },

    /// Calibrate raw counts of one channel
    Calibrate {
        /// Calibration table (YAML, or JSON by extension)
        #[arg(long, env = "SWATH_CALIBRATION_TABLE")]
        table: PathBuf,

        #[arg(long)]
        instrument: String,

        #[arg(long)]
        channel: String,

        /// Scan positions per line (defaults to a single line)
        #[arg(long)]
        width: Option<usize>,

        /// Solar zenith angle in degrees, applied to every sample
        #[arg(long)]
        zenith: Option<f64>,

        /// Raw counts
        #[arg(required = true, allow_hyphen_values = true)]
        counts: Vec<f64>,
    },

    /// Print the native index feeding each image pixel
    Descramble {
        /// Geometry: cris_3x3, iasi_2x2 or iasi_2x2_flat
        geometry: String,

        /// Image width in pixels
        #[arg(long)]
        width: usize,

        /// Image height in pixels
        #[arg(long)]
        height: usize,
    },

    /// Find the pixel of a lon/lat point on a synthetic swath grid
    Locate {
        #[arg(long, default_value = "20")]
        width: usize,

        #[arg(long, default_value = "16")]
        height: usize,

        /// Longitude of the first sample
        #[arg(long, default_value = "10.0", allow_hyphen_values = true)]
        origin_lon: f64,

        /// Latitude of the first sample
        #[arg(long, default_value = "50.0", allow_hyphen_values = true)]
        origin_lat: f64,

        /// Sample spacing in degrees
        #[arg(long, default_value = "0.1")]
        step: f64,

        /// Longitude drift per scan line in degrees
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        shear: f64,

        #[arg(allow_hyphen_values = true)]
        lon: f64,

        #[arg(allow_hyphen_values = true)]
        lat: f64,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);
    debug!(command = ?cli.command, "Running swath-tool");

    let output = match cli.command {
        Commands::Planck {
            radiance,
            wavenumber,
            constants,
        } => commands::to_json(&commands::planck(radiance, wavenumber, &constants)?)?,
        Commands::Project {
            center_lon,
            center_lat,
            inverse,
            a,
            b,
        } => commands::to_json(&commands::project(center_lon, center_lat, inverse, a, b)?)?,
        Commands::Calibrate {
            table,
            instrument,
            channel,
            width,
            zenith,
            counts,
        } => commands::to_json(&commands::calibrate(
            &table,
            &instrument,
            &channel,
            width,
            zenith,
            &counts,
        )?)?,
        Commands::Descramble {
            geometry,
            width,
            height,
        } => commands::to_json(&commands::descramble(&geometry, width, height)?)?,
        Commands::Locate {
            width,
            height,
            origin_lon,
            origin_lat,
            step,
            shear,
            lon,
            lat,
        } => commands::to_json(&commands::locate(
            commands::SyntheticGrid {
                width,
                height,
                origin: (origin_lon, origin_lat),
                step,
                shear,
            },
            lon,
            lat,
        )?)?,
    };

    println!("{}", output);
    Ok(())
}
