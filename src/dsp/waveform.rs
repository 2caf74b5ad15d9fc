//! Waveform generators — pure phase-to-sample functions for each shape.
//!
//! Phase is measured in cycles for `d_ph` (the phase advanced since the
//! start of the wave) and in half-cycles for `ph0` (the initial offset).

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Supported oscillator shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaveType {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
    WhiteNoise,
}

impl WaveType {
    pub const ALL: [WaveType; 5] = [
        WaveType::Sine,
        WaveType::Square,
        WaveType::Sawtooth,
        WaveType::Triangle,
        WaveType::WhiteNoise,
    ];

    /// Evaluate this shape at the given phase. Output lies in `[-1, 1]`.
    ///
    /// `fullness` only affects `Square`; `WhiteNoise` ignores every phase
    /// argument and draws from `rng` instead.
    pub fn generate<R: Rng + ?Sized>(self, d_ph: f64, ph0: f64, fullness: f64, rng: &mut R) -> f64 {
        match self {
            WaveType::Sine => sine(d_ph, ph0),
            WaveType::Square => square(d_ph, ph0, fullness),
            WaveType::Sawtooth => sawtooth(d_ph, ph0),
            WaveType::Triangle => triangle(d_ph, ph0),
            WaveType::WhiteNoise => white_noise(rng),
        }
    }

    pub fn is_noise(self) -> bool {
        self == WaveType::WhiteNoise
    }
}

pub fn sine(d_ph: f64, ph0: f64) -> f64 {
    ((2.0 * d_ph + ph0) * PI).sin()
}

/// Pulse wave whose high portion covers `fullness` of the period.
/// At `fullness = 0.5` this is a 50% duty square.
pub fn square(d_ph: f64, ph0: f64, fullness: f64) -> f64 {
    let s = ((2.0 * d_ph - fullness + ph0 + 0.5) * PI).sin() - (fullness * PI).cos();
    // f64::signum maps 0.0 to 1.0; keep the mathematical sign
    if s == 0.0 { 0.0 } else { s.signum() }
}

/// Centered ramp from -1 to 1, period 1 in `d_ph`.
pub fn sawtooth(d_ph: f64, ph0: f64) -> f64 {
    let x = d_ph + 0.5 * ph0;
    2.0 * (x - (0.5 + x).floor())
}

pub fn triangle(d_ph: f64, ph0: f64) -> f64 {
    (1.0 + 4.0 * d_ph + 2.0 * ph0 - 4.0 * (0.75 + d_ph + 0.5 * ph0).floor()).abs() - 1.0
}

pub fn white_noise<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-1.0..=1.0)
}
