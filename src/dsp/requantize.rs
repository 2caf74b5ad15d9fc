//! Requantizer — adapts a PCM buffer to the playback sink's rate floor and
//! a target bit depth.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{RenderConfig, NATIVE_BIT_DEPTH};
use crate::error::{EngineError, EngineResult};

use super::checked_buffer_len;

/// A finished mono buffer ready for playback, samples in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sound {
    pub sample_rate: u32,
    pub audio_data: Vec<f32>,
}

impl Sound {
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.audio_data.len() as f64 / self.sample_rate as f64
    }
}

/// Smallest integer `M` with `rate · M ≥ floor`.
pub fn upsample_multiplier(rate: u32, floor: u32) -> u32 {
    floor.div_ceil(rate.max(1)).max(1)
}

/// Sample-and-hold upsampling to reach `floor`: each sample is repeated
/// `M` times. Fails if `rate` already meets the floor.
pub fn upsample(samples: &[f64], rate: u32, floor: u32) -> EngineResult<(u32, Vec<f64>)> {
    if rate == 0 {
        return Err(EngineError::InvalidSampleRate { rate });
    }
    if rate >= floor {
        return Err(EngineError::UpsampleNotRequired { rate, floor });
    }
    let m = upsample_multiplier(rate, floor);
    let out_rate = rate
        .checked_mul(m)
        .ok_or(EngineError::InvalidSampleRate { rate: floor })?;
    checked_buffer_len(samples.len() as f64 * m as f64)?;
    log::debug!("upsampling {rate} Hz x{m} to meet the {floor} Hz floor");

    let out = samples
        .iter()
        .flat_map(|&s| std::iter::repeat(s).take(m as usize))
        .collect();
    Ok((out_rate, out))
}

/// Round every sample to `2^(bits-1)` levels per unit, optionally dithered,
/// then clamp to `[-1, 1]`.
pub fn quantize<R: Rng + ?Sized>(
    samples: &mut [f64],
    bits: u32,
    dither: bool,
    rng: &mut R,
) -> EngineResult<()> {
    if bits == 0 || bits > NATIVE_BIT_DEPTH {
        return Err(EngineError::InvalidBitDepth { bits });
    }
    let max_value = 2f64.powi(bits as i32 - 1);
    for s in samples.iter_mut() {
        let noise = if dither {
            (rng.gen_range(0.0..1.0) - 0.5) / (2.0 * max_value)
        } else {
            0.0
        };
        *s = (((*s + noise) * max_value).round() / max_value).clamp(-1.0, 1.0);
    }
    Ok(())
}

/// Prepare `samples` for the playback sink.
///
/// Upsamples when the config's rate is below `min_sample_rate`, and
/// quantizes when `bit_depth` is below native precision. Output is
/// clamped to `[-1, 1]` either way.
pub fn requantize(samples: &[f64], config: &RenderConfig) -> EngineResult<Sound> {
    config.validate()?;

    let (sample_rate, mut data) = if config.sample_rate < config.min_sample_rate {
        upsample(samples, config.sample_rate, config.min_sample_rate)?
    } else {
        (config.sample_rate, samples.to_vec())
    };

    if config.bit_depth < NATIVE_BIT_DEPTH {
        let mut rng = config.rng();
        quantize(&mut data, config.bit_depth, config.dither, &mut rng)?;
    }

    Ok(Sound {
        sample_rate,
        audio_data: data.iter().map(|&s| s.clamp(-1.0, 1.0) as f32).collect(),
    })
}
