//! System configuration parameters
//!
//! All tunable parameters for the MicroRail controller.
//! Defaults match the stock vehicle; a JSON file can override any subset
//! of them at start-up (see [`JsonFileConfig`](crate::adapters::config_file::JsonFileConfig)).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailConfig {
    // --- Identity ---
    /// Network name reported in every status message
    pub ssid: String,
    /// Firmware version string reported in every status message
    pub version: String,

    // --- Motion ---
    /// Speed change per command and per ramp tick (percent)
    pub speed_step: u8,
    /// Fraction of full duty that 100 % speed maps to (0.8 = 80 %)
    pub max_speed_fraction: f32,
    /// Motor PWM frequency: 100 Hz for small gear motors, > 10 kHz for coreless motors
    pub motor_frequency_hz: u32,

    // --- Battery ---
    /// Battery centivolts that read as ADC full scale (divider ratio)
    pub adc_reference_cv: u16,
    /// ADC counts at full scale
    pub adc_full_scale: u16,
    /// Centivolts reported as 0 %
    pub battery_empty_cv: u16,
    /// Centivolts reported as 100 %
    pub battery_full_cv: u16,

    // --- Timing ---
    /// Ramp tick period (milliseconds)
    pub ramp_period_ms: u32,
    /// Battery sampling period (milliseconds)
    pub telemetry_period_ms: u32,

    // --- Control channel ---
    /// TCP port of the control channel
    pub control_port: u16,
    /// Maximum number of simultaneously connected peers
    pub max_peers: usize,
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            ssid: "microrail01".into(),
            version: concat!("MicroRail R v", env!("CARGO_PKG_VERSION")).into(),

            speed_step: 7,
            max_speed_fraction: 1.0,
            motor_frequency_hz: 100,

            adc_reference_cv: 420,
            adc_full_scale: 1024,
            battery_empty_cv: 240,
            battery_full_cv: 420,

            ramp_period_ms: 100,         // 10 Hz
            telemetry_period_ms: 30_000, // every 30 s

            control_port: 8181,
            max_peers: 5,
        }
    }
}

impl RailConfig {
    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() || self.ssid.len() > 32 {
            return Err(ConfigError::ValidationFailed("ssid must be 1..=32 bytes"));
        }
        if self.speed_step == 0 || self.speed_step > 100 {
            return Err(ConfigError::ValidationFailed("speed_step must be 1..=100"));
        }
        if !(self.max_speed_fraction > 0.0 && self.max_speed_fraction <= 1.0) {
            return Err(ConfigError::ValidationFailed(
                "max_speed_fraction must be in (0, 1]",
            ));
        }
        if self.motor_frequency_hz == 0 {
            return Err(ConfigError::ValidationFailed("motor_frequency_hz must be > 0"));
        }
        if self.adc_reference_cv == 0 || self.adc_full_scale == 0 {
            return Err(ConfigError::ValidationFailed("ADC scale must be positive"));
        }
        if self.battery_empty_cv >= self.battery_full_cv {
            return Err(ConfigError::ValidationFailed(
                "battery_empty_cv must be below battery_full_cv",
            ));
        }
        if self.ramp_period_ms == 0 || self.telemetry_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("timer periods must be > 0"));
        }
        if self.max_peers == 0 || self.max_peers > usize::from(u8::MAX) {
            return Err(ConfigError::ValidationFailed("max_peers must be 1..=255"));
        }
        Ok(())
    }
}
