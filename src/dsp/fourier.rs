//! Fourier analysis — forward and inverse transforms over real signals.
//!
//! Forward transforms are scaled by `1/N` and keep only the first `N/2`
//! bins, since the spectrum of a real signal is conjugate-symmetric.
//!
//! The two inverses differ in their sine term. The direct inverse sums
//! `x[n] = 2·Σ_k (re[k]·cos(2πkn/N) + im[k]·sin(2πkn/N))`, which restores
//! cosine components and negates sine components, so a forward/direct-inverse
//! round trip time-reverses a zero-mean signal. The fast inverse takes the
//! real part of the `e^{+2πikn/N}` synthesis, `2·Σ_k (re·cos − im·sin)`,
//! and restores the signal itself.
//!
//! The fast variants zero-pad to the next power of two, which changes the
//! number of bins (forward) or samples (inverse) for other lengths.

use std::f64::consts::PI;

use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Half spectrum of a real signal, indexed by bin `k = 0 .. N/2 - 1`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FourierResult {
    pub amplitude: Vec<f64>,
    pub phase: Vec<f64>,
    pub real_parts: Vec<f64>,
    pub imag_parts: Vec<f64>,
}

impl FourierResult {
    /// Build a result from real/imaginary parts, deriving amplitude and phase.
    pub fn from_parts(real_parts: Vec<f64>, imag_parts: Vec<f64>) -> EngineResult<Self> {
        if real_parts.len() != imag_parts.len() {
            return Err(EngineError::InvalidSpectrum {
                real: real_parts.len(),
                imag: imag_parts.len(),
            });
        }
        let amplitude = real_parts
            .iter()
            .zip(&imag_parts)
            .map(|(re, im)| re.hypot(*im))
            .collect();
        let phase = real_parts
            .iter()
            .zip(&imag_parts)
            .map(|(re, im)| im.atan2(*re))
            .collect();
        Ok(FourierResult {
            amplitude,
            phase,
            real_parts,
            imag_parts,
        })
    }

    fn from_bins(bins: &[Complex64]) -> Self {
        FourierResult {
            amplitude: bins.iter().map(|c| c.norm()).collect(),
            phase: bins.iter().map(|c| c.arg()).collect(),
            real_parts: bins.iter().map(|c| c.re).collect(),
            imag_parts: bins.iter().map(|c| c.im).collect(),
        }
    }

    /// Number of retained bins.
    pub fn len(&self) -> usize {
        self.real_parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real_parts.is_empty()
    }

    /// Length of the signal this half spectrum describes.
    pub fn transform_len(&self) -> usize {
        2 * self.len()
    }

    /// Center frequency of bin `k` in Hz.
    pub fn bin_frequency(&self, k: usize, sample_rate: u32) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        k as f64 * sample_rate as f64 / self.transform_len() as f64
    }

    /// Zero bin `k` in all four arrays.
    pub fn clear_bin(&mut self, k: usize) {
        self.amplitude[k] = 0.0;
        self.phase[k] = 0.0;
        self.real_parts[k] = 0.0;
        self.imag_parts[k] = 0.0;
    }

    fn check(&self) -> EngineResult<()> {
        if self.real_parts.len() != self.imag_parts.len() {
            return Err(EngineError::InvalidSpectrum {
                real: self.real_parts.len(),
                imag: self.imag_parts.len(),
            });
        }
        Ok(())
    }
}

/// Which transform implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    /// O(N²) direct evaluation; any length.
    Direct,
    /// O(N log N) radix-2; pads to a power of two.
    #[default]
    Fast,
}

impl Transform {
    pub fn forward(self, input: &[f64]) -> FourierResult {
        match self {
            Transform::Direct => dft(input),
            Transform::Fast => fft(input),
        }
    }

    pub fn inverse(self, spectrum: &FourierResult) -> EngineResult<Vec<f64>> {
        match self {
            Transform::Direct => idft(spectrum),
            Transform::Fast => ifft(spectrum),
        }
    }
}

/// Direct forward transform. Returns `⌊N/2⌋` bins.
pub fn dft(input: &[f64]) -> FourierResult {
    let n = input.len();
    let half_n = n / 2;
    if half_n == 0 {
        return FourierResult::default();
    }

    let (cos_table, sin_table): (Vec<f64>, Vec<f64>) = (0..n)
        .map(|i| {
            let angle = -2.0 * PI * i as f64 / n as f64;
            (angle.cos(), angle.sin())
        })
        .unzip();

    let scale = 1.0 / n as f64;
    let bins: Vec<Complex64> = (0..half_n)
        .map(|k| {
            let (mut re, mut im) = (0.0, 0.0);
            // (k·i) mod N, stepped to avoid overflowing the product
            let mut idx = 0;
            for &x in input {
                re += x * cos_table[idx];
                im += x * sin_table[idx];
                idx = (idx + k) % n;
            }
            Complex64::new(re * scale, im * scale)
        })
        .collect();

    FourierResult::from_bins(&bins)
}

/// Fast forward transform. Input is zero-padded to the next power of two
/// `P`, and `P/2` bins are returned.
pub fn fft(input: &[f64]) -> FourierResult {
    if input.is_empty() {
        return FourierResult::default();
    }
    let padded = input.len().next_power_of_two();
    if padded != input.len() {
        log::debug!("fft: zero-padding {} samples to {padded}", input.len());
    }

    let mut data: Vec<Complex64> = input
        .iter()
        .map(|&x| Complex64::new(x, 0.0))
        .chain(std::iter::repeat(Complex64::new(0.0, 0.0)))
        .take(padded)
        .collect();
    radix2(&mut data, false);

    let scale = 1.0 / padded as f64;
    let bins: Vec<Complex64> = data[..padded / 2].iter().map(|c| *c * scale).collect();
    FourierResult::from_bins(&bins)
}

/// Direct inverse transform, `2·Σ (re·cos + im·sin)`. Returns `2·len` samples.
pub fn idft(spectrum: &FourierResult) -> EngineResult<Vec<f64>> {
    spectrum.check()?;
    let n = spectrum.transform_len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let (cos_table, sin_table): (Vec<f64>, Vec<f64>) = (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            (angle.cos(), angle.sin())
        })
        .unzip();

    let out = (0..n)
        .map(|i| {
            let mut sum = 0.0;
            let mut idx = 0;
            for (re, im) in spectrum.real_parts.iter().zip(&spectrum.imag_parts) {
                sum += re * cos_table[idx] + im * sin_table[idx];
                idx = (idx + i) % n;
            }
            2.0 * sum
        })
        .collect();
    Ok(out)
}

/// Fast inverse transform. The `2·len`-sample frame is padded to the next
/// power of two `P`, with the upper bins left at zero, and `P` samples are
/// returned.
pub fn ifft(spectrum: &FourierResult) -> EngineResult<Vec<f64>> {
    spectrum.check()?;
    let n = spectrum.transform_len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let padded = n.next_power_of_two();
    if padded != n {
        log::debug!("ifft: zero-padding {n}-sample frame to {padded}");
    }

    let mut data = vec![Complex64::new(0.0, 0.0); padded];
    for (slot, (re, im)) in data
        .iter_mut()
        .zip(spectrum.real_parts.iter().zip(&spectrum.imag_parts))
    {
        *slot = Complex64::new(*re, *im);
    }
    radix2(&mut data, true);

    Ok(data.iter().map(|c| 2.0 * c.re).collect())
}

/// In-place iterative radix-2 decimation-in-time transform, unscaled.
/// `data.len()` must be a power of two. Forward uses `e^{-2πik/n}`
/// twiddles, inverse `e^{+2πik/n}`.
fn radix2(data: &mut [Complex64], inverse: bool) {
    let n = data.len();
    debug_assert!(n.is_power_of_two());
    if n < 2 {
        return;
    }

    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            data.swap(i, j);
        }
    }

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = sign * 2.0 * PI / len as f64;
        let twiddles: Vec<Complex64> = (0..half)
            .map(|k| Complex64::from_polar(1.0, step * k as f64))
            .collect();
        for chunk in data.chunks_exact_mut(len) {
            let (evens, odds) = chunk.split_at_mut(half);
            for ((even, odd), w) in evens.iter_mut().zip(odds.iter_mut()).zip(&twiddles) {
                let t = *odd * *w;
                *odd = *even - t;
                *even += t;
            }
        }
        len <<= 1;
    }
}
