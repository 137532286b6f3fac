//! Shared test synthesizer.

use std::path::Path;
use std::sync::Mutex;

use story_narrator::{AudioClip, AudioFormat, ProsodyProperties, SpeechSynthesizer, SynthesisError};

pub const MONO_1K: AudioFormat = AudioFormat {
    sample_rate: 1000,
    channels: 1,
};

pub const WORD_MS: u64 = 100;

/// Writes a constant tone of `WORD_MS` per word, optionally failing on one call.
pub struct FakeSynthesizer {
    pub format: AudioFormat,
    pub fail_on_call: Option<usize>,
    pub calls: Mutex<Vec<(String, ProsodyProperties)>>,
}

impl FakeSynthesizer {
    pub fn new() -> Self {
        Self {
            format: MONO_1K,
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new()
        }
    }

    pub fn with_format(format: AudioFormat) -> Self {
        Self {
            format,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<(String, ProsodyProperties)> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn speech_ms(text: &str) -> u64 {
    text.split_whitespace().count() as u64 * WORD_MS
}

impl SpeechSynthesizer for FakeSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        props: &ProsodyProperties,
        dest: &Path,
    ) -> Result<(), SynthesisError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((text.to_string(), *props));
            calls.len() - 1
        };
        if self.fail_on_call == Some(call) {
            return Err(SynthesisError::Unsupported(text.to_string()));
        }

        let frames = speech_ms(text) * u64::from(self.format.sample_rate) / 1000;
        let samples = vec![0.25; frames as usize * usize::from(self.format.channels)];
        AudioClip::new(self.format, samples)
            .write_wav(dest)
            .map_err(|e| SynthesisError::Unsupported(e.to_string()))
    }
}
