//! DSP Engine — oscillators, sequencing, Fourier analysis and requantization.
//!
//! Every call computes a whole buffer up front and returns it; nothing here
//! keeps state between calls. The same code backs the WASM bindings and
//! native callers.

pub mod filter;
pub mod fourier;
pub mod mixer;
pub mod note;
pub mod renderer;
pub mod requantize;
pub mod wave;
pub mod waveform;

use crate::config::MAX_BUFFER_SAMPLES;
use crate::error::{EngineError, EngineResult};

/// Number of samples covering `duration` seconds: `⌊sample_rate · duration⌋`.
pub fn sample_count(sample_rate: u32, duration: f64) -> usize {
    if duration <= 0.0 {
        return 0;
    }
    // absorb representation error, e.g. 48000 · 0.29 = 13919.999…
    (sample_rate as f64 * duration + 1e-9).floor() as usize
}

/// Convert a sample count computed in floating point to a buffer length,
/// rejecting anything past [`MAX_BUFFER_SAMPLES`].
pub fn checked_buffer_len(samples: f64) -> EngineResult<usize> {
    if samples.is_finite() && samples <= MAX_BUFFER_SAMPLES as f64 {
        Ok(samples.max(0.0) as usize)
    } else {
        Err(EngineError::BufferTooLarge {
            samples: samples as u64,
            limit: MAX_BUFFER_SAMPLES as u64,
        })
    }
}
