//! Wave — a modulatable oscillator.
//!
//! A wave owns its amplitude and frequency modulators outright, so a wave
//! and its modulators form a tree that is rendered bottom-up.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::error::{EngineError, EngineResult};

use super::{checked_buffer_len, sample_count};
use super::waveform::WaveType;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Fresh opaque identifier for a wave or note.
pub(crate) fn next_id() -> String {
    format!("{:08x}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// A parametric oscillator with optional modulators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Wave {
    pub id: String,
    /// Gain applied to the raw waveform.
    pub amplitude: f64,
    #[serde(rename = "type")]
    pub wave_type: WaveType,
    /// Frequency in Hz; ignored when `freq_mod` is set.
    pub freq: f64,
    /// Initial phase in half-cycles.
    pub ph0: f64,
    /// Duty-cycle-like shape in `[0, 1]`; only used by `Square`.
    pub fullness: f64,
    /// DC offset added after scaling.
    pub center: f64,
    /// Multiplies this wave sample-wise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amplitude_mod: Option<Box<Wave>>,
    /// Supplies the instantaneous frequency in Hz, sample by sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq_mod: Option<Box<Wave>>,
}

impl Default for Wave {
    fn default() -> Self {
        Wave {
            id: next_id(),
            amplitude: 0.5,
            wave_type: WaveType::Sine,
            freq: 220.0,
            ph0: 0.0,
            fullness: 0.5,
            center: 0.0,
            amplitude_mod: None,
            freq_mod: None,
        }
    }
}

impl Wave {
    pub fn new(wave_type: WaveType, amplitude: f64, freq: f64) -> Self {
        Wave {
            wave_type,
            amplitude,
            freq,
            ..Default::default()
        }
    }

    /// A wave that renders the constant `value` (zero amplitude, offset center).
    pub fn constant(value: f64) -> Self {
        Wave {
            amplitude: 0.0,
            center: value,
            ..Default::default()
        }
    }

    pub fn with_phase(mut self, ph0: f64) -> Self {
        self.ph0 = ph0;
        self
    }

    pub fn with_fullness(mut self, fullness: f64) -> Self {
        self.fullness = fullness;
        self
    }

    pub fn with_center(mut self, center: f64) -> Self {
        self.center = center;
        self
    }

    pub fn with_amplitude_mod(mut self, modulator: Wave) -> Self {
        self.amplitude_mod = Some(Box::new(modulator));
        self
    }

    pub fn with_freq_mod(mut self, modulator: Wave) -> Self {
        self.freq_mod = Some(Box::new(modulator));
        self
    }

    /// Deep copy with fresh ids throughout the modulator tree.
    pub fn copy(&self) -> Wave {
        Wave {
            id: next_id(),
            amplitude_mod: self.amplitude_mod.as_ref().map(|m| Box::new(m.copy())),
            freq_mod: self.freq_mod.as_ref().map(|m| Box::new(m.copy())),
            ..self.clone()
        }
    }

    /// Nesting depth of the modulator tree; a wave without modulators has depth 0.
    pub fn depth(&self) -> usize {
        let child = |m: &Option<Box<Wave>>| m.as_ref().map_or(0, |w| 1 + w.depth());
        child(&self.amplitude_mod).max(child(&self.freq_mod))
    }

    /// Check `fullness` for this wave and every modulator.
    pub fn validate(&self) -> EngineResult<()> {
        if !(0.0..=1.0).contains(&self.fullness) {
            return Err(EngineError::InvalidFullness {
                fullness: self.fullness,
            });
        }
        for modulator in [&self.amplitude_mod, &self.freq_mod].into_iter().flatten() {
            modulator.validate()?;
        }
        Ok(())
    }

    /// Render `duration` seconds at the config's sample rate.
    ///
    /// Returns `⌊sample_rate · duration⌋` samples. White noise draws from
    /// the config's seeded RNG.
    pub fn render(&self, config: &RenderConfig, duration: f64) -> EngineResult<Vec<f64>> {
        let mut rng = config.rng();
        self.render_with(config, duration, &mut rng)
    }

    /// Like [`Wave::render`], drawing noise from the caller's RNG.
    pub fn render_with<R: Rng + ?Sized>(
        &self,
        config: &RenderConfig,
        duration: f64,
        rng: &mut R,
    ) -> EngineResult<Vec<f64>> {
        if config.sample_rate == 0 {
            return Err(EngineError::InvalidSampleRate {
                rate: config.sample_rate,
            });
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(EngineError::InvalidDuration { duration });
        }
        checked_buffer_len(config.sample_rate as f64 * duration)?;
        let depth = self.depth();
        if depth > config.max_modulation_depth {
            return Err(EngineError::ModulationTooDeep {
                depth,
                limit: config.max_modulation_depth,
            });
        }
        self.validate()?;

        let buffer = self.render_tree(config.sample_rate, duration, rng);
        log::debug!(
            "rendered {:?} wave: {} samples, modulator depth {depth}",
            self.wave_type,
            buffer.len()
        );
        Ok(buffer)
    }

    /// Recursive evaluation; inputs are already validated.
    fn render_tree<R: Rng + ?Sized>(&self, sample_rate: u32, duration: f64, rng: &mut R) -> Vec<f64> {
        let len = sample_count(sample_rate, duration);
        let dt = 1.0 / sample_rate as f64;

        let mut buffer: Vec<f64> = match &self.freq_mod {
            None => (0..len)
                .map(|i| {
                    let d_ph = self.freq * dt * i as f64;
                    self.wave_type.generate(d_ph, self.ph0, self.fullness, rng)
                })
                .collect(),
            Some(freq_mod) => {
                let freqs = freq_mod.render_tree(sample_rate, duration, rng);
                // Integrate the running phase so a changing frequency never jumps.
                let mut ph_prev = self.ph0;
                freqs
                    .iter()
                    .map(|&f| {
                        let d_ph = f * dt;
                        let s = self.wave_type.generate(d_ph, ph_prev, self.fullness, rng);
                        // every shape has period 2 in ph0
                        ph_prev = (ph_prev + 2.0 * d_ph).rem_euclid(2.0);
                        s
                    })
                    .collect()
            }
        };

        for s in buffer.iter_mut() {
            *s = *s * self.amplitude + self.center;
        }

        if let Some(amplitude_mod) = &self.amplitude_mod {
            let envelope = amplitude_mod.render_tree(sample_rate, duration, rng);
            for (s, m) in buffer.iter_mut().zip(envelope) {
                *s *= m;
            }
        }

        buffer
    }
}
