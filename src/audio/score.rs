use std::fs::{File, OpenOptions};
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::audio::{ToneGenerator, Voice};
use crate::engine::types::ToneError;

#[derive(Debug, Serialize)]
struct ScoreRow {
    start_time: f64,
    frequency: f64,
    duration: f64,
    amplitude: f64,
    base_volume_db: f64,
}

/// Writes each note to a CSV score that can be rendered offline.
pub struct ScoreRecorder {
    writer: Option<csv::Writer<File>>,
    voice: Voice,
}

impl ScoreRecorder {
    /// Appends to the score at `path`, writing the header row only when the
    /// file is new or empty. Earlier sessions are kept.
    pub fn create(path: &Path, voice: Voice) -> Result<Self, ToneError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let empty = file.metadata()?.len() == 0;
        let writer = csv::WriterBuilder::new()
            .has_headers(empty)
            .from_writer(file);
        info!(path = %path.display(), append = !empty, "recording score");
        Ok(Self {
            writer: Some(writer),
            voice,
        })
    }
}

impl ToneGenerator for ScoreRecorder {
    fn play(
        &mut self,
        frequency: f64,
        duration: f64,
        start_time: f64,
        amplitude: f64,
    ) -> Result<(), ToneError> {
        let writer = self.writer.as_mut().ok_or(ToneError::Disposed)?;
        writer.serialize(ScoreRow {
            start_time,
            frequency,
            duration,
            amplitude,
            base_volume_db: self.voice.base_volume_db,
        })?;
        Ok(())
    }

    fn dispose(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                warn!(error = %e, "failed to flush score");
            }
        }
    }
}

impl Drop for ScoreRecorder {
    fn drop(&mut self) {
        self.dispose();
    }
}
