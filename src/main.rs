//! MicroRail host controller: main entry point.
//!
//! Runs the full controller against simulated motors and a fixed battery
//! reading, with the control channel on a real TCP port.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  TcpChannelServer   SimHardware      JsonFileConfig      │
//! │  (PeerChannel)      (Motor+Analog)   (ConfigPort)        │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ─────────────────  │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │            RailService (pure logic)                │  │
//! │  │  Ramp · Battery · Status · Scheduler               │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Boards with an I2C bus swap `SimHardware` for
//! [`MotorShieldAdapter`](microrail::adapters::hardware::MotorShieldAdapter)
//! plus their own ADC; the service does not change.
//!
//! Try it with `nc -C localhost 8181` and type `#FASTER`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use microrail::adapters::config_file::JsonFileConfig;
use microrail::adapters::sim::SimHardware;
use microrail::adapters::tcp_channel::TcpChannelServer;
use microrail::adapters::time::MonotonicClock;
use microrail::app::ports::{ConfigError, ConfigPort};
use microrail::app::service::RailService;
use microrail::config::RailConfig;

/// Longest the loop sleeps between channel polls.
const MAX_IDLE_MS: u64 = 10;

#[derive(Parser, Debug)]
#[command(name = "microrail", version, about = "MicroRail vehicle controller (host build)")]
struct Args {
    /// JSON configuration file; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Control channel TCP port (overrides the config file)
    #[arg(long)]
    port: Option<u16>,

    /// Raw ADC value the simulated battery divider reports
    #[arg(long, default_value_t = 1023)]
    battery_raw: u16,

    /// Log filter when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("MicroRail {} starting", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.control_port = port;
    }

    let mut channel = TcpChannelServer::bind(config.control_port, config.max_peers)
        .with_context(|| format!("cannot listen on port {}", config.control_port))?;
    let mut hw = SimHardware::new(args.battery_raw);
    let clock = MonotonicClock::new();

    let mut service = RailService::new(config);
    service.start(clock.uptime_ms(), &mut hw);

    loop {
        for event in channel.poll() {
            service.handle(event, &mut hw, &mut channel);
        }

        let now = clock.uptime_ms();
        service.poll_timers(now, &mut hw, &mut channel);

        let idle_ms = service
            .next_deadline()
            .map_or(MAX_IDLE_MS, |deadline| deadline.saturating_sub(now))
            .min(MAX_IDLE_MS);
        if idle_ms > 0 {
            std::thread::sleep(Duration::from_millis(idle_ms));
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<RailConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        return Ok(RailConfig::default());
    };

    match JsonFileConfig::new(path).load() {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound) => {
            warn!("Config {} not found, using defaults", path.display());
            Ok(RailConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("cannot load {}", path.display())),
    }
}
