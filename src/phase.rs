use std::f64::consts::TAU;

/// Owned clock state for the two global phases. Passed explicitly into every
/// capture and render call; all time enters as millisecond arguments, so runs
/// are reproducible from injected timestamps.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhaseClock {
    /// Slow periodic phase in [0, 2π), driven by elapsed wall time.
    pub tidal_cycle: f64,
    /// Fast phase in [0, 2π), advanced by a fixed per-capture increment.
    pub wave_phase: f64,
    /// Timestamp of the previous capture; `None` before the first one.
    pub last_timestamp_ms: Option<u64>,
}

/// Immutable phase snapshot handed to the blend engine and surfaces.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhaseSample {
    pub tidal_cycle: f64,
    pub wave_phase: f64,
}

impl PhaseClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the tidal cycle from the elapsed time since the previous
    /// capture and returns that elapsed delta in milliseconds. The first
    /// capture observes a zero delta.
    pub fn advance(&mut self, timestamp_ms: u64, tidal_factor: f64) -> f64 {
        let delta_ms = match self.last_timestamp_ms {
            Some(last) => timestamp_ms.saturating_sub(last) as f64,
            None => 0.0,
        };
        self.last_timestamp_ms = Some(timestamp_ms);
        self.tidal_cycle =
            (self.tidal_cycle + delta_ms * 0.0001 * (tidal_factor / 50.0)).rem_euclid(TAU);
        delta_ms
    }

    /// Advances the wave phase by the fixed increment scaled by wave energy.
    pub fn bump_wave(&mut self, wave_energy: f64) {
        self.wave_phase = (self.wave_phase + 0.05 * (wave_energy / 100.0)).rem_euclid(TAU);
    }

    pub fn sample(&self) -> PhaseSample {
        PhaseSample {
            tidal_cycle: self.tidal_cycle,
            wave_phase: self.wave_phase,
        }
    }

    /// Wave phase used by the render entry points, derived from an explicit
    /// render-time clock rather than a hidden wall-clock read.
    pub fn render_wave_phase(now_ms: u64) -> f64 {
        (now_ms % 10_000) as f64 / 10_000.0 * TAU
    }
}
