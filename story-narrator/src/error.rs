//! Error types for synthesis and narration.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a speech synthesis backend.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("failed to start synthesizer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("synthesizer I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("synthesizer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("synthesizer produced no audio at {}", path.display())]
    MissingOutput { path: PathBuf },

    #[error("unsupported input: {0}")]
    Unsupported(String),
}

/// Failure of a whole narration request. No partial output accompanies it.
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("synthesis failed for segment {index} ({text:?}): {source}")]
    Synthesis {
        index: usize,
        text: String,
        #[source]
        source: SynthesisError,
    },

    #[error("audio error: {0}")]
    Audio(#[from] hound::Error),

    #[error("failed to create resampler: {0}")]
    ResamplerSetup(#[from] rubato::ResamplerConstructionError),

    #[error("resampling failed: {0}")]
    Resample(#[from] rubato::ResampleError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker task failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, NarrationError>;
