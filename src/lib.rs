pub mod config;
pub mod dsp;
pub mod error;

use crate::config::RenderConfig;
use crate::dsp::filter::BandPassFilter;
use crate::dsp::fourier::{FourierResult, Transform};
use crate::dsp::note::Note;
use crate::dsp::wave::Wave;
use wasm_bindgen::prelude::*;

pub use crate::error::{EngineError, EngineResult};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the wavelab-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

/// An absent or `undefined` config means defaults.
fn parse_config(config: JsValue) -> Result<RenderConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(RenderConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(to_js)
}

fn parse_transform(fast: bool) -> Transform {
    if fast { Transform::Fast } else { Transform::Direct }
}

/// WASM-exposed: render a single wave for `duration` seconds.
/// Returns mono f32 samples.
#[wasm_bindgen]
pub fn render_wave_samples(wave: JsValue, config: JsValue, duration: f64) -> Result<Vec<f32>, JsValue> {
    let wave: Wave = serde_wasm_bindgen::from_value(wave).map_err(to_js)?;
    let config = parse_config(config)?;
    let samples = wave.render(&config, duration).map_err(to_js)?;
    Ok(samples.iter().map(|&s| s as f32).collect())
}

/// WASM-exposed: mix a note list and requantize it for playback.
/// Returns `{ sampleRate, audioData }`.
#[wasm_bindgen]
pub fn render_sequence(notes: JsValue, config: JsValue) -> Result<JsValue, JsValue> {
    let notes: Vec<Note> = serde_wasm_bindgen::from_value(notes).map_err(to_js)?;
    let config = parse_config(config)?;
    let sound = dsp::renderer::render_sequence(&notes, &config).map_err(to_js)?;
    serde_wasm_bindgen::to_value(&sound).map_err(to_js)
}

/// WASM-exposed: mix a note list and encode it as a WAV byte array.
#[wasm_bindgen]
pub fn render_sequence_wav(notes: JsValue, config: JsValue) -> Result<Vec<u8>, JsValue> {
    let notes: Vec<Note> = serde_wasm_bindgen::from_value(notes).map_err(to_js)?;
    let config = parse_config(config)?;
    dsp::renderer::render_wav(&notes, &config).map_err(to_js)
}

/// WASM-exposed: forward transform of a sample buffer.
/// Returns `{ amplitude, phase, realParts, imagParts }`.
#[wasm_bindgen]
pub fn fourier_transform(samples: Vec<f64>, fast: bool) -> Result<JsValue, JsValue> {
    let spectrum = parse_transform(fast).forward(&samples);
    serde_wasm_bindgen::to_value(&spectrum).map_err(to_js)
}

/// WASM-exposed: inverse transform of a half spectrum.
#[wasm_bindgen]
pub fn inverse_fourier_transform(spectrum: JsValue, fast: bool) -> Result<Vec<f64>, JsValue> {
    let spectrum: FourierResult = serde_wasm_bindgen::from_value(spectrum).map_err(to_js)?;
    parse_transform(fast).inverse(&spectrum).map_err(to_js)
}

/// WASM-exposed: zero every bin outside `[min_freq, max_freq]`.
/// `allow = false` (band-reject) fails with a not-implemented error.
#[wasm_bindgen]
pub fn band_pass_filter(
    spectrum: JsValue,
    sample_rate: u32,
    min_freq: f64,
    max_freq: f64,
    allow: bool,
) -> Result<JsValue, JsValue> {
    let spectrum: FourierResult = serde_wasm_bindgen::from_value(spectrum).map_err(to_js)?;
    let filtered = dsp::filter::band_pass(&spectrum, sample_rate, min_freq, max_freq, allow)
        .map_err(to_js)?;
    serde_wasm_bindgen::to_value(&filtered).map_err(to_js)
}

/// WASM-exposed: transform, band-pass and transform back in one call.
#[wasm_bindgen]
pub fn filter_samples(
    samples: Vec<f64>,
    sample_rate: u32,
    filter: JsValue,
    fast: bool,
) -> Result<Vec<f64>, JsValue> {
    let filter: BandPassFilter = serde_wasm_bindgen::from_value(filter).map_err(to_js)?;
    dsp::renderer::filter_samples(&samples, sample_rate, &filter, parse_transform(fast))
        .map_err(to_js)
}

/// WASM-exposed: upsample and quantize a buffer for the playback sink.
/// Returns `{ sampleRate, audioData }`.
#[wasm_bindgen]
pub fn requantize_samples(samples: Vec<f64>, config: JsValue) -> Result<JsValue, JsValue> {
    let config = parse_config(config)?;
    let sound = dsp::requantize::requantize(&samples, &config).map_err(to_js)?;
    serde_wasm_bindgen::to_value(&sound).map_err(to_js)
}
