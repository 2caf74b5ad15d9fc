//! Renderer — end-to-end pipelines from notes to a playable [`Sound`], and
//! the WAV encoding used to hand a finished buffer to an external sink.

use crate::config::RenderConfig;
use crate::error::{EngineError, EngineResult};

use super::filter::BandPassFilter;
use super::fourier::Transform;
use super::mixer::mix_sequence;
use super::note::Note;
use super::requantize::{requantize, Sound};

/// Mix a note sequence and prepare it for playback.
pub fn render_sequence(notes: &[Note], config: &RenderConfig) -> EngineResult<Sound> {
    let mixed = mix_sequence(notes, config)?;
    requantize(&mixed, config)
}

/// Mix a note sequence and encode it as a 16-bit mono WAV file.
pub fn render_wav(notes: &[Note], config: &RenderConfig) -> EngineResult<Vec<u8>> {
    Ok(encode_wav(&render_sequence(notes, config)?))
}

/// Transform, band-pass and transform back.
///
/// With [`Transform::Fast`] the output is padded to a power of two.
pub fn filter_samples(
    samples: &[f64],
    sample_rate: u32,
    filter: &BandPassFilter,
    transform: Transform,
) -> EngineResult<Vec<f64>> {
    if sample_rate == 0 {
        return Err(EngineError::InvalidSampleRate { rate: sample_rate });
    }
    let spectrum = transform.forward(samples);
    let filtered = filter.apply(&spectrum, sample_rate)?;
    transform.inverse(&filtered)
}

/// Bytes per 16-bit mono frame.
const FRAME_BYTES: u16 = 2;

/// Encode a sound as a 16-bit mono PCM WAV file.
pub fn encode_wav(sound: &Sound) -> Vec<u8> {
    let data_len = sound.audio_data.len() as u32 * FRAME_BYTES as u32;
    let mut wav = Vec::with_capacity(44 + data_len as usize);

    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // format: PCM, 1 channel, 16 bits
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&sound.sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sound.sample_rate * FRAME_BYTES as u32).to_le_bytes());
    wav.extend_from_slice(&FRAME_BYTES.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());

    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    for &s in &sound.audio_data {
        let pcm = (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        wav.extend_from_slice(&pcm.to_le_bytes());
    }

    wav
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::wave::Wave;
    use crate::dsp::waveform::WaveType;
    use std::f64::consts::PI;

    fn two_note_sequence() -> Vec<Note> {
        vec![
            Note::new(0.0, 1.0, Wave::new(WaveType::Sine, 0.5, 440.0)).unwrap(),
            Note::new(0.5, 1.0, Wave::new(WaveType::Sine, 0.5, 880.0)).unwrap(),
        ]
    }

    #[test]
    fn two_overlapping_notes() {
        let config = RenderConfig::new(1000);
        let notes = two_note_sequence();
        let mixed = mix_sequence(&notes, &config).unwrap();
        assert_eq!(mixed.len(), 1500);

        let a = notes[0].render(&config).unwrap();
        let b = notes[1].render(&config).unwrap();
        for i in 0..500 {
            assert_eq!(mixed[i], a[i], "sample {i} should be note A only");
        }
        for i in 500..1000 {
            assert_eq!(mixed[i], a[i] + b[i - 500], "sample {i} should sum both notes");
        }
        for i in 1000..1500 {
            assert_eq!(mixed[i], b[i - 500], "sample {i} should be note B only");
        }
    }

    #[test]
    fn sequence_to_sound() {
        let sound = render_sequence(&two_note_sequence(), &RenderConfig::new(1000)).unwrap();
        // 1000 Hz is below the 8 kHz floor: x8 sample-and-hold
        assert_eq!(sound.sample_rate, 8000);
        assert_eq!(sound.audio_data.len(), 12000);
        assert!(sound.audio_data.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn empty_sequence_gives_silent_sound() {
        let sound = render_sequence(&[], &RenderConfig::new(44100)).unwrap();
        assert!(sound.audio_data.is_empty());
        assert_eq!(sound.sample_rate, 44100);
    }

    #[test]
    fn wav_header_valid() {
        let wav = render_wav(&two_note_sequence(), &RenderConfig::new(22050)).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 22050);
        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 1);

        // 1.5 s at 22050 Hz, 2 bytes per sample
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size, 33075 * 2);
        assert_eq!(wav.len(), 44 + 33075 * 2);
    }

    #[test]
    fn wav_encodes_mono_frames() {
        let sound = Sound {
            sample_rate: 8000,
            audio_data: vec![0.0, 1.0, -1.0, 0.5, 2.0],
        };
        let wav = encode_wav(&sound);
        assert_eq!(wav.len(), 44 + 10);
        let byte_rate = u32::from_le_bytes([wav[28], wav[29], wav[30], wav[31]]);
        assert_eq!(byte_rate, 16000);
        assert_eq!(u16::from_le_bytes([wav[32], wav[33]]), 2);
        assert_eq!(u16::from_le_bytes([wav[34], wav[35]]), 16);

        let pcm: Vec<i16> = wav[44..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(pcm, vec![0, i16::MAX, -i16::MAX, 16384, i16::MAX]);
    }

    #[test]
    fn wav_contains_audio() {
        let wav = render_wav(&two_note_sequence(), &RenderConfig::new(8000)).unwrap();
        let has_nonzero = wav[44..]
            .chunks_exact(2)
            .any(|b| i16::from_le_bytes([b[0], b[1]]) != 0);
        assert!(has_nonzero, "Rendered WAV should contain non-silent audio");
    }

    #[test]
    fn filter_pipeline_removes_upper_tone() {
        let rate = 1024;
        let samples: Vec<f64> = (0..1024)
            .map(|i| {
                let t = i as f64 / rate as f64;
                (2.0 * PI * 16.0 * t).sin() + 0.5 * (2.0 * PI * 256.0 * t).sin()
            })
            .collect();
        let low_pass = BandPassFilter::new(1.0, 100.0);
        for transform in [Transform::Direct, Transform::Fast] {
            let out = filter_samples(&samples, rate, &low_pass, transform).unwrap();
            assert_eq!(out.len(), 1024);
            // direct inverse negates sine components, fast inverse restores them
            let sign = if transform == Transform::Direct { -1.0 } else { 1.0 };
            for (i, s) in out.iter().enumerate() {
                let expected = sign * (2.0 * PI * 16.0 * i as f64 / rate as f64).sin();
                assert!((s - expected).abs() < 1e-8, "{transform:?} sample {i}");
            }
        }
    }

    #[test]
    fn filter_pipeline_propagates_band_reject_error() {
        let err = filter_samples(&[0.0; 8], 8, &BandPassFilter::band_reject(0.0, 1.0), Transform::Fast);
        assert!(matches!(err, Err(EngineError::NotImplemented { .. })));
    }
}
