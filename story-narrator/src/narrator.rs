//! One narration request: segment the annotated text, then assemble audio.

use std::sync::Arc;

use tracing::info;

use crate::assembler::{AudioAssembler, Narration};
use crate::config::Config;
use crate::error::{NarrationError, Result};
use crate::segmenter::parse_segments;
use crate::synth::{CommandSynthesizer, SpeechSynthesizer};

/// Narrates annotated stories. Requests share no mutable state, so one
/// narrator may serve concurrent callers.
pub struct Narrator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    assembler: AudioAssembler,
}

impl Narrator {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, assembler: AudioAssembler) -> Self {
        Self {
            synthesizer,
            assembler,
        }
    }

    /// Narrator backed by the configured command line synthesizer.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(CommandSynthesizer::new(&config.synthesizer)),
            AudioAssembler::new(config.output.format(), config.output.scratch_dir.clone()),
        )
    }

    /// Narrate `text` synchronously. Blocks for the full synthesis run.
    pub fn narrate(&self, text: &str) -> Result<Narration> {
        let segments = parse_segments(text);
        info!("Narrating {} segments", segments.len());
        self.assembler.assemble(self.synthesizer.as_ref(), &segments)
    }

    /// Narrate on a blocking worker so the async runtime stays responsive.
    pub async fn narrate_async(self: Arc<Self>, text: String) -> Result<Narration> {
        tokio::task::spawn_blocking(move || self.narrate(&text))
            .await
            .map_err(|e| NarrationError::Worker(e.to_string()))?
    }
}
