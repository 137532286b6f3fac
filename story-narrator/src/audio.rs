//! In-memory audio clips and WAV I/O with hound.
//!
//! Samples are interleaved f32 in [-1, 1]. Clips from different sources are
//! conformed to the track format before concatenation.

use std::io::Cursor;
use std::path::Path;

use rubato::{FftFixedIn, Resampler};
use serde::{Deserialize, Serialize};

use crate::error;

// Resampler block size, as in the FFT resamplers elsewhere in the stack
const CHUNK: usize = 1024;
const SUB_CHUNKS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            channels: 1,
        }
    }
}

impl AudioFormat {
    /// Length of `frames` at this rate, rounded to the nearest millisecond.
    pub fn frames_to_ms(&self, frames: u64) -> u64 {
        let rate = u64::from(self.sample_rate.max(1));
        (frames * 1000 + rate / 2) / rate
    }

    fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    format: AudioFormat,
    samples: Vec<f32>,
}

impl AudioClip {
    pub fn new(format: AudioFormat, samples: Vec<f32>) -> Self {
        Self { format, samples }
    }

    pub fn empty(format: AudioFormat) -> Self {
        Self::new(format, Vec::new())
    }

    /// Zero-amplitude clip of the given length.
    pub fn silence(format: AudioFormat, duration_ms: u32) -> Self {
        let frames = u64::from(duration_ms) * u64::from(format.sample_rate) / 1000;
        let len = frames as usize * usize::from(format.channels.max(1));
        Self::new(format, vec![0.0; len])
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.format.channels.max(1))
    }

    /// Playback length, rounded to the nearest millisecond.
    pub fn duration_ms(&self) -> u64 {
        self.format.frames_to_ms(self.frames() as u64)
    }

    /// Append another clip, converting it to this clip's format first.
    pub fn append(&mut self, other: AudioClip) -> error::Result<()> {
        let other = other.conform(self.format)?;
        self.samples.extend(other.samples);
        Ok(())
    }

    /// Concatenate clips in order into one clip of the given format.
    pub fn concat(format: AudioFormat, clips: impl IntoIterator<Item = AudioClip>) -> error::Result<Self> {
        let mut track = Self::empty(format);
        for clip in clips {
            track.append(clip)?;
        }
        Ok(track)
    }

    /// Convert channel layout and sample rate to `target`.
    ///
    /// The resampled clip always has `round(frames * to / from)` frames so
    /// measured durations survive the conversion.
    pub fn conform(self, target: AudioFormat) -> error::Result<Self> {
        if self.format == target {
            return Ok(self);
        }
        let remixed = remix(&self.samples, self.format.channels, target.channels);
        let resampled = resample(
            &remixed,
            target.channels,
            self.format.sample_rate,
            target.sample_rate,
        )?;
        Ok(Self::new(target, resampled))
    }

    /// Decode a WAV file. Integer samples of any width and 32-bit float are accepted.
    pub fn read_wav(path: &Path) -> Result<Self, hound::Error> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let format = AudioFormat {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        };
        Ok(Self::new(format, samples))
    }

    /// Write as 16-bit PCM WAV.
    pub fn write_wav(&self, path: &Path) -> Result<(), hound::Error> {
        let mut writer = hound::WavWriter::create(path, self.format.wav_spec())?;
        for &sample in &self.samples {
            writer.write_sample(to_i16(sample))?;
        }
        writer.finalize()
    }

    /// Encode as an in-memory 16-bit PCM WAV byte stream.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, hound::Error> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, self.format.wav_spec())?;
            for &sample in &self.samples {
                writer.write_sample(to_i16(sample))?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

// f32 [-1, 1] → i16
fn to_i16(sample: f32) -> i16 {
    (sample * 32767.0).clamp(-32768.0, 32767.0) as i16
}

fn remix(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    let from = usize::from(from.max(1));
    let to = usize::from(to.max(1));
    if from == to {
        return samples.to_vec();
    }

    samples
        .chunks(from)
        .flat_map(|frame| {
            let mono = frame.iter().sum::<f32>() / frame.len() as f32;
            std::iter::repeat(mono).take(to)
        })
        .collect()
}

/// Band-limited resampling of interleaved frames with rubato's FFT resampler.
///
/// The input is fed in zero-padded blocks until the resampler's output delay
/// plus the expected length has been produced, then the delay is cut off.
fn resample(samples: &[f32], channels: u16, from_rate: u32, to_rate: u32) -> error::Result<Vec<f32>> {
    let channels = usize::from(channels.max(1));
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 {
        return Ok(samples.to_vec());
    }

    let in_frames = samples.len() / channels;
    if in_frames == 0 {
        return Ok(Vec::new());
    }
    let expected = ((in_frames as u64 * u64::from(to_rate) + u64::from(from_rate) / 2)
        / u64::from(from_rate)) as usize;

    let planar: Vec<Vec<f32>> = (0..channels)
        .map(|ch| samples.iter().skip(ch).step_by(channels).copied().collect())
        .collect();

    let mut resampler = FftFixedIn::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK,
        SUB_CHUNKS,
        channels,
    )?;
    let delay = resampler.output_delay();

    let mut out: Vec<Vec<f32>> = vec![Vec::with_capacity(expected + delay + CHUNK); channels];
    let mut pos = 0;
    while out[0].len() < delay + expected {
        let block_len = resampler.input_frames_next();
        let mut block = vec![vec![0.0; block_len]; channels];
        if pos < in_frames {
            let end = (pos + block_len).min(in_frames);
            for (dst, src) in block.iter_mut().zip(&planar) {
                dst[..end - pos].copy_from_slice(&src[pos..end]);
            }
        }
        pos += block_len;

        let frames = resampler.process(&block, None)?;
        for (dst, src) in out.iter_mut().zip(frames) {
            dst.extend_from_slice(&src);
        }
    }

    let mut interleaved = Vec::with_capacity(expected * channels);
    for i in delay..delay + expected {
        for channel in &out {
            interleaved.push(channel[i]);
        }
    }
    Ok(interleaved)
}
