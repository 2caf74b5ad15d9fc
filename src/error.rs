//! Error types for the synthesis and analysis engine.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by rendering, transforms and requantization.
///
/// Every operation either returns a fully computed buffer or fails before
/// producing any output; there are no partial results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Square-wave fullness outside `[0, 1]`.
    #[error("invalid fullness {fullness}: must lie in [0, 1]")]
    InvalidFullness { fullness: f64 },

    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate { rate: u32 },

    #[error("invalid duration: {duration} seconds")]
    InvalidDuration { duration: f64 },

    #[error("invalid start time: {start_time} seconds")]
    InvalidStartTime { start_time: f64 },

    /// Bit depth must be in `1..=32`.
    #[error("invalid bit depth: {bits}")]
    InvalidBitDepth { bits: u32 },

    /// The modulator tree nests deeper than the configured limit.
    #[error("modulator chain depth {depth} exceeds the limit of {limit}")]
    ModulationTooDeep { depth: usize, limit: usize },

    /// A render, mix or resample would exceed the buffer limit.
    #[error("buffer of {samples} samples exceeds the {limit}-sample limit")]
    BufferTooLarge { samples: u64, limit: u64 },

    /// A mode that exists in the interface but has no implementation.
    #[error("not implemented: {feature}")]
    NotImplemented { feature: &'static str },

    /// Upsampling was requested for a rate that already meets the floor.
    #[error("sample rate {rate} Hz already meets the {floor} Hz floor")]
    UpsampleNotRequired { rate: u32, floor: u32 },

    /// Half-spectrum arrays of different lengths.
    #[error("spectrum arrays differ in length: {real} real vs {imag} imaginary")]
    InvalidSpectrum { real: usize, imag: usize },
}

impl EngineError {
    /// Creates a not-implemented error for the named feature.
    pub fn not_implemented(feature: &'static str) -> Self {
        Self::NotImplemented { feature }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = EngineError::InvalidFullness { fullness: 1.5 };
        assert_eq!(err.to_string(), "invalid fullness 1.5: must lie in [0, 1]");

        let err = EngineError::UpsampleNotRequired {
            rate: 44100,
            floor: 8000,
        };
        assert!(err.to_string().contains("44100"));
    }

    #[test]
    fn not_implemented_helper() {
        let err = EngineError::not_implemented("band-reject filtering");
        assert_eq!(err.to_string(), "not implemented: band-reject filtering");
    }
}
