//! Timed audio assembly.
//!
//! Each segment is synthesized into a per-request scratch directory, measured
//! after the fact, and stitched together with the requested silences. The
//! timeline records where each segment's speech sits in the final track;
//! inserted silence belongs to no entry.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::audio::{AudioClip, AudioFormat};
use crate::error::{NarrationError, Result};
use crate::segmenter::Segment;
use crate::synth::SpeechSynthesizer;

/// Position of one segment's speech in the assembled track.
///
/// Both bounds are the exact sample offset rounded to the nearest
/// millisecond, so they are within 0.5 ms of the audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub text: String,
    #[serde(rename = "start_time")]
    pub start_time_ms: u64,
    #[serde(rename = "end_time")]
    pub end_time_ms: u64,
}

impl TimelineEntry {
    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms - self.start_time_ms
    }

    pub fn contains(&self, position_ms: u64) -> bool {
        (self.start_time_ms..self.end_time_ms).contains(&position_ms)
    }
}

/// The finished narration: one continuous track and its timeline.
#[derive(Debug, Clone)]
pub struct Narration {
    pub track: AudioClip,
    pub timeline: Vec<TimelineEntry>,
}

impl Narration {
    pub fn empty(format: AudioFormat) -> Self {
        Self {
            track: AudioClip::empty(format),
            timeline: Vec::new(),
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.track.duration_ms()
    }

    /// The entry being spoken at `position_ms`, if any. Silence maps to `None`.
    pub fn entry_at(&self, position_ms: u64) -> Option<&TimelineEntry> {
        let idx = self
            .timeline
            .partition_point(|e| e.end_time_ms <= position_ms);
        self.timeline.get(idx).filter(|e| e.contains(position_ms))
    }

    pub fn wav_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.track.to_wav_bytes()?)
    }

    pub fn write_wav(&self, path: &Path) -> Result<()> {
        self.track.write_wav(path)?;
        info!("Saved narration to {}", path.display());
        Ok(())
    }
}

pub struct AudioAssembler {
    format: AudioFormat,
    scratch_root: Option<PathBuf>,
}

impl AudioAssembler {
    pub fn new(format: AudioFormat, scratch_root: Option<PathBuf>) -> Self {
        Self {
            format,
            scratch_root,
        }
    }

    fn scratch_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("narration-");
        let dir = match &self.scratch_root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        debug!("Scratch directory: {}", dir.path().display());
        Ok(dir)
    }

    /// Synthesize and stitch `segments` in order.
    ///
    /// Any synthesis failure aborts the request. The scratch directory and
    /// every clip written so far are dropped on all exit paths.
    pub fn assemble(
        &self,
        synthesizer: &dyn SpeechSynthesizer,
        segments: &[Segment],
    ) -> Result<Narration> {
        if segments.is_empty() {
            return Ok(Narration::empty(self.format));
        }

        let scratch = self.scratch_dir()?;
        let mut clips = Vec::with_capacity(segments.len() * 2);
        let mut timeline = Vec::with_capacity(segments.len());
        // Kept in frames so rounding to milliseconds never accumulates
        let mut elapsed_frames: u64 = 0;

        for (index, segment) in segments.iter().enumerate() {
            if segment.text.trim().is_empty() {
                debug!("Skipping empty segment {index}");
                continue;
            }
            let props = &segment.properties;

            if props.pause_before > 0 {
                let silence = AudioClip::silence(self.format, props.pause_before);
                elapsed_frames += silence.frames() as u64;
                clips.push(silence);
            }

            let path = scratch.path().join(format!("segment_{index}.wav"));
            synthesizer
                .synthesize(&segment.text, props, &path)
                .map_err(|source| NarrationError::Synthesis {
                    index,
                    text: segment.text.clone(),
                    source,
                })?;

            let clip = AudioClip::read_wav(&path)?.conform(self.format)?;
            let start_time_ms = self.format.frames_to_ms(elapsed_frames);
            elapsed_frames += clip.frames() as u64;
            let end_time_ms = self.format.frames_to_ms(elapsed_frames);
            debug!(
                "Segment {}/{}: {}ms at {start_time_ms}ms (rate={}, volume={:.2}, pitch={})",
                index + 1,
                segments.len(),
                clip.duration_ms(),
                props.rate,
                props.volume,
                props.pitch
            );

            timeline.push(TimelineEntry {
                text: segment.text.clone(),
                start_time_ms,
                end_time_ms,
            });
            clips.push(clip);

            if props.pause_after > 0 {
                let silence = AudioClip::silence(self.format, props.pause_after);
                elapsed_frames += silence.frames() as u64;
                clips.push(silence);
            }
        }

        let track = AudioClip::concat(self.format, clips)?;
        info!(
            "Assembled {} segments into {:.1}s of audio",
            timeline.len(),
            track.duration_ms() as f64 / 1000.0
        );

        Ok(Narration { track, timeline })
    }
}
