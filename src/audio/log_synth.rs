use tracing::info;

use crate::audio::{ToneGenerator, Voice};
use crate::engine::types::ToneError;

/// Emits every note as a tracing event instead of driving a sound device.
#[derive(Debug)]
pub struct LogSynth {
    voice: Voice,
    disposed: bool,
    played: u64,
}

impl LogSynth {
    pub fn new(voice: Voice) -> Self {
        info!(
            shape = voice.shape.as_str(),
            base_volume_db = voice.base_volume_db,
            "log synth created"
        );
        Self {
            voice,
            disposed: false,
            played: 0,
        }
    }

    pub fn played(&self) -> u64 {
        self.played
    }
}

impl ToneGenerator for LogSynth {
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
        self.played += 1;
        let gain_db = 20.0 * amplitude.log10() + self.voice.base_volume_db;
        info!(frequency, duration, start_time, gain_db = %format!("{gain_db:.1}"), "♫");
        Ok(())
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            info!(notes = self.played, "log synth disposed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disposed_synth_refuses_notes() {
        let mut synth = LogSynth::new(Voice::default());
        synth.play(440.0, 0.15, 0.0, 0.25).unwrap();
        synth.dispose();
        let refused = synth.play(440.0, 0.15, 1.0, 0.25);
        assert!(matches!(refused, Err(ToneError::Disposed)));
        assert_eq!(synth.played(), 1);
    }
}
