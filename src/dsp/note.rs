//! Note — a wave placed on the timeline.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::error::{EngineError, EngineResult};

use super::wave::{next_id, Wave};

/// A timed placement of a [`Wave`]. `end_time` is always derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default = "next_id")]
    pub id: String,
    start_time: f64,
    duration: f64,
    #[serde(default)]
    pub wave: Wave,
}

/// An ordered collection of notes. Order only affects iteration.
pub type NoteSequence = Vec<Note>;

impl Note {
    pub fn new(start_time: f64, duration: f64, wave: Wave) -> EngineResult<Self> {
        let note = Note {
            id: next_id(),
            start_time,
            duration,
            wave,
        };
        note.validate()?;
        Ok(note)
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn set_start_time(&mut self, start_time: f64) -> EngineResult<()> {
        check_start_time(start_time)?;
        self.start_time = start_time;
        Ok(())
    }

    pub fn set_duration(&mut self, duration: f64) -> EngineResult<()> {
        check_duration(duration)?;
        self.duration = duration;
        Ok(())
    }

    /// Timing checks. Notes arriving through serde are only checked here.
    pub fn validate(&self) -> EngineResult<()> {
        check_start_time(self.start_time)?;
        check_duration(self.duration)
    }

    /// Deep copy with a fresh id and an independent wave tree.
    pub fn copy(&self) -> Note {
        Note {
            id: next_id(),
            start_time: self.start_time,
            duration: self.duration,
            wave: self.wave.copy(),
        }
    }

    /// Render the note's wave for its duration.
    pub fn render(&self, config: &RenderConfig) -> EngineResult<Vec<f64>> {
        self.validate()?;
        self.wave.render(config, self.duration)
    }

    pub fn render_with<R: Rng + ?Sized>(&self, config: &RenderConfig, rng: &mut R) -> EngineResult<Vec<f64>> {
        self.validate()?;
        self.wave.render_with(config, self.duration, rng)
    }
}

fn check_start_time(start_time: f64) -> EngineResult<()> {
    if start_time.is_finite() && start_time >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidStartTime { start_time })
    }
}

fn check_duration(duration: f64) -> EngineResult<()> {
    if duration.is_finite() && duration > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidDuration { duration })
    }
}
