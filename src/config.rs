//! Render configuration threaded explicitly through every render call.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Lowest sample rate the playback sink accepts.
pub const PLAYBACK_MIN_SAMPLE_RATE: u32 = 8000;

/// Highest sample rate, and rate floor, a config may ask for.
pub const MAX_SAMPLE_RATE: u32 = 768_000;

/// Longest buffer any render or resample may produce (about 100 minutes at 44.1 kHz).
pub const MAX_BUFFER_SAMPLES: usize = 1 << 28;

/// Precision of the playback buffer; bit depths at or above this skip quantization.
pub const NATIVE_BIT_DEPTH: u32 = 32;

/// Settings shared by a render, transform or requantize request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Samples per second.
    pub sample_rate: u32,
    /// Target bit depth for requantization, in `1..=32`.
    pub bit_depth: u32,
    /// Add dither noise before quantizing.
    pub dither: bool,
    /// Buffers below this rate are upsampled before hand-off.
    pub min_sample_rate: u32,
    /// Seed for white noise and dither.
    pub seed: u64,
    /// Deepest modulator nesting a wave may have.
    pub max_modulation_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            sample_rate: 44100,
            bit_depth: NATIVE_BIT_DEPTH,
            dither: true,
            min_sample_rate: PLAYBACK_MIN_SAMPLE_RATE,
            seed: 0,
            max_modulation_depth: 16,
        }
    }
}

impl RenderConfig {
    pub fn new(sample_rate: u32) -> Self {
        RenderConfig {
            sample_rate,
            ..Default::default()
        }
    }

    pub fn with_bit_depth(mut self, bits: u32, dither: bool) -> Self {
        self.bit_depth = bits;
        self.dither = dither;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        for rate in [self.sample_rate, self.min_sample_rate] {
            if rate == 0 || rate > MAX_SAMPLE_RATE {
                return Err(EngineError::InvalidSampleRate { rate });
            }
        }
        if self.bit_depth == 0 || self.bit_depth > NATIVE_BIT_DEPTH {
            return Err(EngineError::InvalidBitDepth {
                bits: self.bit_depth,
            });
        }
        Ok(())
    }

    /// RNG for the base seed.
    pub fn rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }

    /// Independent RNG stream for the `index`-th item of a batch (e.g. a note).
    pub fn rng_for(&self, index: u64) -> Pcg32 {
        Pcg32::new(self.seed, index.wrapping_mul(2).wrapping_add(1))
    }
}
