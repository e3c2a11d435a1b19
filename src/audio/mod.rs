//! Tone generator seam.
//!
//! The core only needs something that can `play(frequency, duration,
//! start, amplitude)`. Generators are created per playback session from a
//! [`Voice`] and disposed when playback stops; a stopped session never
//! reuses a disposed generator.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;

use crate::engine::types::ToneError;

pub mod log_synth;
pub mod score;

pub use log_synth::LogSynth;
pub use score::ScoreRecorder;

/// Monotonic seconds since the generator was started.
#[derive(Debug, Clone, Copy)]
pub struct AudioClock {
    origin: Instant,
}

impl AudioClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    pub fn instant_at(&self, seconds: f64) -> Instant {
        self.origin + Duration::from_secs_f64(seconds.max(0.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OscillatorShape {
    #[default]
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl OscillatorShape {
    pub fn as_str(self) -> &'static str {
        match self {
            OscillatorShape::Sine => "sine",
            OscillatorShape::Triangle => "triangle",
            OscillatorShape::Square => "square",
            OscillatorShape::Sawtooth => "sawtooth",
        }
    }
}

/// Parameters a generator is created with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub envelope: Envelope,
    pub shape: OscillatorShape,
    pub base_volume_db: f64,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            envelope: Envelope {
                attack: 0.005,
                decay: 0.1,
                sustain: 0.3,
                release: 0.1,
            },
            shape: OscillatorShape::Sine,
            base_volume_db: -6.0,
        }
    }
}

pub trait ToneGenerator: Send {
    fn play(
        &mut self,
        frequency: f64,
        duration: f64,
        start_time: f64,
        amplitude: f64,
    ) -> Result<(), ToneError>;

    /// Release the underlying resource. Later `play` calls fail.
    fn dispose(&mut self);
}

pub trait ToneGeneratorFactory: Send {
    fn create(&self, voice: &Voice) -> Result<Box<dyn ToneGenerator>, ToneError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthKind {
    #[default]
    Log,
    Score,
}

/// Builds the generators shipped with the crate.
#[derive(Debug, Clone)]
pub struct BuiltinSynthFactory {
    pub kind: SynthKind,
    pub score_path: PathBuf,
}

impl ToneGeneratorFactory for BuiltinSynthFactory {
    fn create(&self, voice: &Voice) -> Result<Box<dyn ToneGenerator>, ToneError> {
        let generator: Box<dyn ToneGenerator> = match self.kind {
            SynthKind::Log => Box::new(LogSynth::new(*voice)),
            SynthKind::Score => Box::new(ScoreRecorder::create(&self.score_path, *voice)?),
        };
        Ok(generator)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedNote {
    pub frequency: f64,
    pub duration: f64,
    pub start_time: f64,
    pub amplitude: f64,
}

/// In-memory generator that keeps every note it is asked to play.
#[derive(Debug, Default)]
pub struct RecordingSynth {
    pub notes: Vec<RecordedNote>,
    pub disposed: bool,
}

impl ToneGenerator for RecordingSynth {
    fn play(
        &mut self,
        frequency: f64,
        duration: f64,
        start_time: f64,
        amplitude: f64,
    ) -> Result<(), ToneError> {
        if self.disposed {
            return Err(ToneError::Disposed);
        }
        self.notes.push(RecordedNote {
            frequency,
            duration,
            start_time,
            amplitude,
        });
        Ok(())
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }
}
