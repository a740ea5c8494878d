//! Command-line interface definitions and parsing

use clap::Parser;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Advertised device name to match during the scan
    #[arg(short, long, default_value = "ControlCar")]
    pub name: String,

    /// Telemetry service UUID (any case accepted)
    #[arg(long)]
    pub service_uuid: Option<String>,

    /// Telemetry characteristic UUID (any case accepted)
    #[arg(long)]
    pub characteristic_uuid: Option<String>,

    /// Connect/discovery timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
