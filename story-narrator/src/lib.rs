//! story-narrator: cue-driven narration of annotated stories.
//!
//! Text carrying bracketed modulation cues such as `[SOFT TONE]` or
//! `[SCENE CHANGE]` is split into segments with resolved prosody, each
//! segment is synthesized by an external engine, and the clips are stitched
//! into one WAV track with a timeline of where every segment is spoken.

pub mod assembler;
pub mod audio;
pub mod config;
pub mod error;
pub mod narrator;
pub mod prosody;
pub mod segmenter;
pub mod synth;

pub use assembler::{AudioAssembler, Narration, TimelineEntry};
pub use audio::{AudioClip, AudioFormat};
pub use config::Config;
pub use error::{NarrationError, SynthesisError};
pub use narrator::Narrator;
pub use prosody::{Cue, ProsodyProperties};
pub use segmenter::{parse_segments, strip_cues, Segment};
pub use synth::{CommandSynthesizer, SpeechSynthesizer};
