//! Time, speedup and energy comparison of the accelerated and baseline paths.
//!
//! Energy is `power [mW] * time [ms]`, which comes out in microjoules.

use serde::{Deserialize, Serialize};

/// Power and clock configuration of the host platform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerProfile {
    /// Dynamic power of the accelerated path in milliwatts.
    pub accelerated_power_mw: f64,
    /// Power of the processor-only baseline in milliwatts.
    pub baseline_power_mw: f64,
    /// Cycle counter frequency in Hz.
    pub clock_hz: f64,
}

impl Default for PowerProfile {
    fn default() -> Self {
        Self {
            accelerated_power_mw: 50.0,
            baseline_power_mw: 200.0,
            clock_hz: 100_000_000.0,
        }
    }
}

impl PowerProfile {
    /// Milliseconds per counter cycle; 0 for a non-positive clock.
    pub fn ms_per_cycle(&self) -> f64 {
        if self.clock_hz > 0.0 {
            1000.0 / self.clock_hz
        } else {
            0.0
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub accelerated_cycles: u64,
    pub baseline_cycles: u64,
    pub accelerated_time_ms: f64,
    pub baseline_time_ms: f64,
    /// `baseline_time / accelerated_time`, 0 when the accelerated time is 0.
    pub speedup: f64,
    pub accelerated_power_mw: f64,
    pub baseline_power_mw: f64,
    pub accelerated_energy_uj: f64,
    pub baseline_energy_uj: f64,
    /// `(1 - accelerated_energy / baseline_energy) * 100`, 0 when the
    /// baseline energy is 0.
    pub energy_savings_pct: f64,
}

impl PerformanceReport {
    pub fn compute(accelerated_cycles: u64, baseline_cycles: u64, profile: &PowerProfile) -> Self {
        let ms_per_cycle = profile.ms_per_cycle();
        let accelerated_time_ms = accelerated_cycles as f64 * ms_per_cycle;
        let baseline_time_ms = baseline_cycles as f64 * ms_per_cycle;

        let speedup = if accelerated_time_ms > 0.0 {
            baseline_time_ms / accelerated_time_ms
        } else {
            0.0
        };

        let accelerated_energy_uj = profile.accelerated_power_mw * accelerated_time_ms;
        let baseline_energy_uj = profile.baseline_power_mw * baseline_time_ms;
        let energy_savings_pct = if baseline_energy_uj > 0.0 {
            (1.0 - accelerated_energy_uj / baseline_energy_uj) * 100.0
        } else {
            0.0
        };

        Self {
            accelerated_cycles,
            baseline_cycles,
            accelerated_time_ms,
            baseline_time_ms,
            speedup,
            accelerated_power_mw: profile.accelerated_power_mw,
            baseline_power_mw: profile.baseline_power_mw,
            accelerated_energy_uj,
            baseline_energy_uj,
            energy_savings_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn design_target_numbers() {
        let r = PerformanceReport::compute(500_000, 20_000_000, &PowerProfile::default());
        assert_relative_eq!(r.accelerated_time_ms, 5.0, max_relative = 1e-12);
        assert_relative_eq!(r.baseline_time_ms, 200.0, max_relative = 1e-12);
        assert_relative_eq!(r.speedup, 40.0, max_relative = 1e-12);
        assert_relative_eq!(r.accelerated_energy_uj, 250.0, max_relative = 1e-12);
        assert_relative_eq!(r.baseline_energy_uj, 40_000.0, max_relative = 1e-12);
        assert_relative_eq!(r.energy_savings_pct, 99.375, max_relative = 1e-12);
    }

    #[test]
    fn zero_accelerated_time_gives_zero_speedup() {
        let r = PerformanceReport::compute(0, 1000, &PowerProfile::default());
        assert_eq!(r.speedup, 0.0);
        assert_relative_eq!(r.energy_savings_pct, 100.0);
    }

    #[test]
    fn zero_baseline_energy_gives_zero_savings() {
        let r = PerformanceReport::compute(1000, 0, &PowerProfile::default());
        assert_eq!(r.energy_savings_pct, 0.0);
        assert_eq!(r.speedup, 0.0);

        let unpowered = PowerProfile {
            baseline_power_mw: 0.0,
            ..PowerProfile::default()
        };
        let r = PerformanceReport::compute(1000, 1000, &unpowered);
        assert_eq!(r.energy_savings_pct, 0.0);
        assert_relative_eq!(r.speedup, 1.0);
    }

    #[test]
    fn profile_fields_default_when_missing() {
        let p: PowerProfile =
            serde_json::from_str(r#"{"clock_hz": 50000000.0}"#).expect("deserialize");
        assert_eq!(p.accelerated_power_mw, 50.0);
        assert_relative_eq!(p.ms_per_cycle(), 2e-5);
    }
}
