//! Spectral band-pass filter — zeroes bins outside a frequency range.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::fourier::FourierResult;

fn default_allow() -> bool {
    true
}

/// Frequency band applied to a [`FourierResult`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandPassFilter {
    /// Lower edge in Hz.
    pub min_freq: f64,
    /// Upper edge in Hz.
    pub max_freq: f64,
    /// `true` keeps the band; `false` (band-reject) is not implemented.
    #[serde(default = "default_allow")]
    pub allow: bool,
}

impl BandPassFilter {
    pub fn new(min_freq: f64, max_freq: f64) -> Self {
        BandPassFilter {
            min_freq,
            max_freq,
            allow: true,
        }
    }

    pub fn band_reject(min_freq: f64, max_freq: f64) -> Self {
        BandPassFilter {
            min_freq,
            max_freq,
            allow: false,
        }
    }

    /// Inclusive bin bounds `(min_idx, max_idx)` for a transform of
    /// `transform_len` samples. Bounds may fall outside the retained bins.
    pub fn bin_bounds(&self, transform_len: usize, sample_rate: u32) -> (f64, f64) {
        let scale = transform_len as f64 / sample_rate as f64;
        (
            (self.min_freq * scale).round(),
            (self.max_freq * scale).round(),
        )
    }

    /// Return a copy of `spectrum` with every bin outside the band zeroed.
    pub fn apply(&self, spectrum: &FourierResult, sample_rate: u32) -> EngineResult<FourierResult> {
        if !self.allow {
            return Err(EngineError::not_implemented("band-reject filtering"));
        }
        if sample_rate == 0 {
            return Err(EngineError::InvalidSampleRate { rate: sample_rate });
        }

        let (min_idx, max_idx) = self.bin_bounds(spectrum.transform_len(), sample_rate);
        let mut filtered = spectrum.clone();
        let mut cleared = 0;
        for k in 0..filtered.len() {
            let idx = k as f64;
            if idx < min_idx || idx > max_idx {
                filtered.clear_bin(k);
                cleared += 1;
            }
        }
        log::debug!(
            "band-pass {}..{} Hz: kept bins {min_idx}..={max_idx}, cleared {cleared} of {}",
            self.min_freq,
            self.max_freq,
            filtered.len()
        );
        Ok(filtered)
    }
}

/// Keep bins between `min_freq` and `max_freq` (inclusive).
pub fn band_pass(
    spectrum: &FourierResult,
    sample_rate: u32,
    min_freq: f64,
    max_freq: f64,
    allow: bool,
) -> EngineResult<FourierResult> {
    BandPassFilter {
        min_freq,
        max_freq,
        allow,
    }
    .apply(spectrum, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::fourier::{dft, idft};
    use pretty_assertions::assert_eq;
    use std::f64::consts::PI;

    const RATE: u32 = 1000;

    /// 50 Hz + 200 Hz at 1 kHz over 200 samples (5 Hz bins).
    fn two_tone() -> Vec<f64> {
        (0..200)
            .map(|i| {
                let t = i as f64 / RATE as f64;
                (2.0 * PI * 50.0 * t).sin() + 0.5 * (2.0 * PI * 200.0 * t).sin()
            })
            .collect()
    }

    #[test]
    fn full_band_is_identity() {
        let spectrum = dft(&two_tone());
        let filtered = band_pass(&spectrum, RATE, 0.0, RATE as f64 / 2.0, true).unwrap();
        assert_eq!(filtered, spectrum);
    }

    #[test]
    fn empty_band_zeroes_everything() {
        let spectrum = dft(&two_tone());
        let filtered = band_pass(&spectrum, RATE, 300.0, 100.0, true).unwrap();
        assert_eq!(filtered.len(), spectrum.len());
        for values in [&filtered.amplitude, &filtered.phase, &filtered.real_parts, &filtered.imag_parts] {
            assert!(values.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn band_reject_is_not_implemented() {
        let spectrum = dft(&two_tone());
        assert_eq!(
            band_pass(&spectrum, RATE, 0.0, 100.0, false),
            Err(EngineError::NotImplemented {
                feature: "band-reject filtering"
            })
        );
        assert!(BandPassFilter::band_reject(0.0, 0.0)
            .apply(&FourierResult::default(), RATE)
            .is_err());
    }

    #[test]
    fn isolates_lower_tone() {
        let spectrum = dft(&two_tone());
        let filtered = BandPassFilter::new(20.0, 100.0).apply(&spectrum, RATE).unwrap();
        assert!((filtered.amplitude[10] - 0.5).abs() < 1e-9);
        assert_eq!(filtered.amplitude[40], 0.0);

        // the direct inverse negates sine components
        let restored = idft(&filtered).unwrap();
        for (i, s) in restored.iter().enumerate() {
            let expected = -(2.0 * PI * 50.0 * i as f64 / RATE as f64).sin();
            assert!((s - expected).abs() < 1e-9, "sample {i}");
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let spectrum = dft(&two_tone());
        // exactly on bin 40 (200 Hz)
        let filtered = BandPassFilter::new(200.0, 200.0).apply(&spectrum, RATE).unwrap();
        assert!((filtered.amplitude[40] - 0.25).abs() < 1e-9);
        assert_eq!(filtered.amplitude[10], 0.0);
        assert_eq!(BandPassFilter::new(200.0, 200.0).bin_bounds(200, RATE), (40.0, 40.0));
    }

    #[test]
    fn allow_defaults_to_true_on_the_wire() {
        let filter: BandPassFilter = serde_json::from_str(r#"{"minFreq": 10, "maxFreq": 20}"#).unwrap();
        assert!(filter.allow);
    }
}
