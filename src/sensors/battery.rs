//! Battery monitor on the A0 divider.
//!
//! Every sample goes through a 10-slot running median, is scaled to
//! centivolts through the divider ratio, and is mapped linearly onto the
//! Li-ion discharge window (2.40 V = 0 %, 4.20 V = 100 %).
//!
//! Readings outside the window are clamped to `0..=100` %: a cell below
//! 2.40 V reports 0 %, a charger pushing above 4.20 V reports 100 %.

use log::info;

use crate::app::ports::AnalogPort;
use crate::config::RailConfig;

use super::median::SmoothingWindow;

/// Number of raw samples the running median spans.
pub const SMOOTHING_WINDOW_LEN: usize = 10;

/// Battery state.  Only [`BatteryMonitor`] writes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerState {
    /// Remaining capacity (0–100 %).
    pub percent: u8,
    /// Cell voltage, rounded to two decimals.
    pub voltage: f32,
}

impl Default for PowerState {
    /// Full cell until the first sample says otherwise.
    fn default() -> Self {
        Self {
            percent: 100,
            voltage: 4.2,
        }
    }
}

/// Divider scaling and discharge window, all in centivolts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryCalibration {
    pub reference_cv: u16,
    pub full_scale: u16,
    pub empty_cv: u16,
    pub full_cv: u16,
}

impl Default for BatteryCalibration {
    fn default() -> Self {
        Self {
            reference_cv: 420,
            full_scale: 1024,
            empty_cv: 240,
            full_cv: 420,
        }
    }
}

impl BatteryCalibration {
    pub fn from_config(config: &RailConfig) -> Self {
        Self {
            reference_cv: config.adc_reference_cv,
            full_scale: config.adc_full_scale,
            empty_cv: config.battery_empty_cv,
            full_cv: config.battery_full_cv,
        }
    }

    /// Whole centivolts for a (smoothed) raw reading, truncated.
    ///
    /// `i64` holds any `u32 × u16` product, so no calibration overflows.
    pub fn centivolts(&self, raw: u32) -> i64 {
        i64::from(raw) * i64::from(self.reference_cv) / i64::from(self.full_scale.max(1))
    }

    /// Linear map of `cv` onto the discharge window, *not* clamped.
    pub fn percent_unclamped(&self, cv: i64) -> i64 {
        let span = (i64::from(self.full_cv) - i64::from(self.empty_cv)).max(1);
        (cv - i64::from(self.empty_cv)) * 100 / span
    }

    /// Full conversion of a smoothed raw reading.
    ///
    /// This is the one place the voltage is rounded to two decimals.
    pub fn power_state(&self, raw: u32) -> PowerState {
        let percent = self.percent_unclamped(self.centivolts(raw)).clamp(0, 100) as u8;
        let exact_cv = raw as f32 * self.reference_cv as f32 / self.full_scale.max(1) as f32;
        PowerState {
            percent,
            voltage: exact_cv.round() / 100.0,
        }
    }
}

pub struct BatteryMonitor {
    window: SmoothingWindow<SMOOTHING_WINDOW_LEN>,
    calibration: BatteryCalibration,
    state: PowerState,
    total_samples: u32,
}

impl BatteryMonitor {
    pub fn new(calibration: BatteryCalibration) -> Self {
        Self {
            window: SmoothingWindow::new(),
            calibration,
            state: PowerState::default(),
            total_samples: 0,
        }
    }

    pub fn from_config(config: &RailConfig) -> Self {
        Self::new(BatteryCalibration::from_config(config))
    }

    /// Take one reading and refresh the power state from the running median.
    pub fn sample(&mut self, adc: &mut impl AnalogPort) -> PowerState {
        self.total_samples = self.total_samples.saturating_add(1);

        let raw = adc.read_raw();
        self.window.push(raw);
        if let Some(median) = self.window.median() {
            self.state = self.calibration.power_state(median);
        }

        info!(
            "Battery {:.2} V, {}% (raw={}, samples={})",
            self.state.voltage, self.state.percent, raw, self.total_samples
        );
        self.state
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn total_samples(&self) -> u32 {
        self.total_samples
    }
}
