//! Mixer — sums rendered notes into one PCM buffer at their start offsets.

use crate::config::RenderConfig;
use crate::error::EngineResult;

use super::note::Note;
use super::{checked_buffer_len, sample_count};

/// A summing buffer that notes are accumulated into.
#[derive(Debug, Clone, Default)]
pub struct Mixer {
    buffer: Vec<f64>,
}

impl Mixer {
    pub fn new() -> Self {
        Mixer::default()
    }

    /// Prepare a buffer of `num_samples` filled with zeros.
    pub fn clear(&mut self, num_samples: usize) {
        self.buffer.clear();
        self.buffer.resize(num_samples, 0.0);
    }

    /// Add `samples` starting at `offset`. The buffer grows if the
    /// samples run past its end.
    pub fn add(&mut self, offset: usize, samples: &[f64]) {
        let end = offset + samples.len();
        if end > self.buffer.len() {
            self.buffer.resize(end, 0.0);
        }
        for (dst, src) in self.buffer[offset..end].iter_mut().zip(samples) {
            *dst += src;
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn output(&self) -> &[f64] {
        &self.buffer
    }

    pub fn into_output(self) -> Vec<f64> {
        self.buffer
    }
}

/// First sample of a note on the timeline.
pub fn start_offset(note: &Note, sample_rate: u32) -> usize {
    (note.start_time() * sample_rate as f64).round() as usize
}

/// Render every note and sum them into a single buffer.
///
/// The buffer spans the latest note end. An empty sequence is reported and
/// yields an empty buffer. Every note is validated before anything is
/// rendered, so a bad note fails the whole mix.
pub fn mix_sequence(notes: &[Note], config: &RenderConfig) -> EngineResult<Vec<f64>> {
    if notes.is_empty() {
        log::warn!("No notes to mix");
        return Ok(Vec::new());
    }
    config.validate()?;
    for note in notes {
        note.validate()?;
        note.wave.validate()?;
    }

    let rate = config.sample_rate;
    // size from the true maximum before any addition
    let mut total = 0;
    for note in notes {
        // bound the span in floating point so the integer sum below cannot overflow
        checked_buffer_len((note.start_time() * rate as f64).round() + note.duration() * rate as f64)?;
        total = total
            .max(sample_count(rate, note.end_time()))
            .max(start_offset(note, rate) + sample_count(rate, note.duration()));
    }

    let mut mixer = Mixer::new();
    mixer.clear(total);
    for (index, note) in notes.iter().enumerate() {
        let mut rng = config.rng_for(index as u64);
        let buffer = note.render_with(config, &mut rng)?;
        mixer.add(start_offset(note, rate), &buffer);
    }

    log::debug!("mixed {} notes into {} samples", notes.len(), mixer.len());
    Ok(mixer.into_output())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::wave::Wave;
    use crate::dsp::waveform::WaveType;
    use crate::error::EngineError;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_buffer() {
        let mut m = Mixer::new();
        m.clear(128);
        assert_eq!(m.len(), 128);
        assert!(m.output().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn accumulates_samples() {
        let mut m = Mixer::new();
        m.clear(4);
        m.add(0, &[0.5, 1.0]);
        m.add(0, &[0.25]);
        m.add(3, &[0.125]);
        assert_eq!(m.into_output(), vec![0.75, 1.0, 0.0, 0.125]);
    }

    #[test]
    fn add_past_end_grows() {
        let mut m = Mixer::new();
        m.clear(2);
        m.add(1, &[1.0, 1.0, 1.0]);
        assert_eq!(m.into_output(), vec![0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn empty_sequence_is_not_an_error() {
        let out = mix_sequence(&[], &RenderConfig::new(1000)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn offsets_round_to_nearest_sample() {
        let note = Note::new(0.0126, 0.01, Wave::constant(1.0)).unwrap();
        assert_eq!(start_offset(&note, 1000), 13);
        let out = mix_sequence(&[note], &RenderConfig::new(1000)).unwrap();
        assert_eq!(out.len(), 23);
        assert!(out[..13].iter().all(|&s| s == 0.0));
        assert!(out[13..].iter().all(|&s| s == 1.0));
    }

    #[test]
    fn overlapping_notes_sum() {
        let notes = vec![
            Note::new(0.0, 1.0, Wave::constant(0.25)).unwrap(),
            Note::new(0.5, 1.0, Wave::constant(0.5)).unwrap(),
        ];
        let out = mix_sequence(&notes, &RenderConfig::new(100)).unwrap();
        assert_eq!(out.len(), 150);
        assert_eq!(out[10], 0.25);
        assert_eq!(out[60], 0.75);
        assert_eq!(out[120], 0.5);
    }

    #[test]
    fn far_future_note_is_rejected() {
        let notes = vec![
            Note::new(0.0, 1.0, Wave::default()).unwrap(),
            Note::new(1e20, 1.0, Wave::default()).unwrap(),
        ];
        assert!(matches!(
            mix_sequence(&notes, &RenderConfig::new(44100)),
            Err(EngineError::BufferTooLarge { .. })
        ));
    }

    #[test]
    fn bad_note_fails_whole_mix() {
        let notes = vec![
            Note::new(0.0, 1.0, Wave::default()).unwrap(),
            Note::new(0.0, 1.0, Wave::new(WaveType::Square, 1.0, 5.0).with_fullness(2.0)).unwrap(),
        ];
        assert_eq!(
            mix_sequence(&notes, &RenderConfig::new(100)),
            Err(EngineError::InvalidFullness { fullness: 2.0 })
        );
    }
}
