//! Prosody properties and the fixed cue vocabulary.
//!
//! A cue is looked up once by name and then applied to the running
//! properties while the segmenter scans the text.

use serde::{Deserialize, Serialize};

pub const BASELINE_RATE: u32 = 175;
pub const BASELINE_VOLUME: f32 = 0.8;
pub const BASELINE_PITCH: u32 = 100;

/// Silence inserted before the first segment of a new scene.
pub const SCENE_TRANSITION_MS: u32 = 1000;

/// Speech properties requested from the synthesizer for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProsodyProperties {
    pub rate: u32,
    pub volume: f32,
    pub pitch: u32,
    pub pause_before: u32,
    pub pause_after: u32,
}

impl Default for ProsodyProperties {
    fn default() -> Self {
        Self {
            rate: BASELINE_RATE,
            volume: BASELINE_VOLUME,
            pitch: BASELINE_PITCH,
            pause_before: 0,
            pause_after: 0,
        }
    }
}

impl ProsodyProperties {
    /// Baseline properties opening a new scene.
    pub fn scene_start() -> Self {
        Self {
            pause_before: SCENE_TRANSITION_MS,
            ..Self::default()
        }
    }

    /// Same voice settings with both pauses cleared.
    pub fn without_pauses(self) -> Self {
        Self {
            pause_before: 0,
            pause_after: 0,
            ..self
        }
    }

    /// Total silence requested around the segment, in milliseconds.
    pub fn pause_total(&self) -> u64 {
        u64::from(self.pause_before) + u64::from(self.pause_after)
    }
}

fn rate_offset(delta: i32) -> u32 {
    BASELINE_RATE.saturating_add_signed(delta)
}

/// A recognised modulation cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    SoftTone,
    SlowerPace,
    FasterPace,
    EnergeticTone,
    IncreasedVolume,
    Emphasis,
    Pause,
    PauseBriefly,
    PauseLonger,
    RisingIntonation,
    TenseTremblingTone,
    BrightUpliftedTone,
    SomberHeavyTone,
    SharpIntenseTone,
    DialogueVoice,
    Emotive,
    Natural,
    Thrilling,
    SceneChange,
}

/// What the segmenter has to do with the pending text when a cue arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    /// Closes the scene and resets to baseline.
    Boundary,
    /// Ends the pending segment with silence after it.
    TrailingPause,
    /// Changes how the following text is spoken.
    Voice,
}

impl Cue {
    /// Look up a raw bracket token. Matching is case-insensitive after trimming;
    /// unknown tokens return `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let cue = match token.trim().to_uppercase().as_str() {
            "SOFT TONE" | "SOFT REFLECTIVE TONE" => Self::SoftTone,
            "SLOWER PACE" => Self::SlowerPace,
            "FASTER PACE" | "INCREASE PACE" => Self::FasterPace,
            "ENERGETIC TONE" => Self::EnergeticTone,
            "INCREASED VOLUME" | "INCREASE VOLUME" => Self::IncreasedVolume,
            "EMPHASIS" => Self::Emphasis,
            "BRIEF PAUSE" | "PAUSE" => Self::Pause,
            "PAUSE BRIEFLY" => Self::PauseBriefly,
            "PAUSE LONGER" => Self::PauseLonger,
            "RISING INTONATION" => Self::RisingIntonation,
            "TENSE TREMBLING TONE" => Self::TenseTremblingTone,
            "BRIGHT UPLIFTED TONE" => Self::BrightUpliftedTone,
            "SOMBER HEAVY TONE" => Self::SomberHeavyTone,
            "SHARP INTENSE TONE" => Self::SharpIntenseTone,
            "DIALOGUE VOICE" | "CONVERSATIONAL TONE" => Self::DialogueVoice,
            "EMOTIVE" => Self::Emotive,
            "NATURAL" => Self::Natural,
            "THRILLING" => Self::Thrilling,
            "SCENE CHANGE" | "SHIFT TONE" => Self::SceneChange,
            _ => return None,
        };
        Some(cue)
    }

    pub fn kind(self) -> CueKind {
        match self {
            Self::SceneChange => CueKind::Boundary,
            Self::Pause | Self::PauseLonger => CueKind::TrailingPause,
            _ => CueKind::Voice,
        }
    }

    /// Apply this cue to the running properties.
    ///
    /// `Emotive` and `Thrilling` raise pitch relative to the current value and
    /// pitch is never clamped, so repeated use drifts upward until a
    /// scene change resets it.
    pub fn apply(self, props: &mut ProsodyProperties) {
        match self {
            Self::SoftTone => {
                props.volume = 0.7;
                props.rate = rate_offset(-20);
            }
            Self::SlowerPace => props.rate = rate_offset(-30),
            Self::FasterPace => props.rate = rate_offset(30),
            Self::EnergeticTone => {
                props.volume = 0.9;
                props.pitch = 110;
            }
            Self::IncreasedVolume => props.volume = 0.95,
            Self::Emphasis => props.pitch = 110,
            Self::Pause => props.pause_after = 500,
            Self::PauseBriefly => props.pause_before = 300,
            Self::PauseLonger => props.pause_after = 1000,
            Self::RisingIntonation => props.pitch = 115,
            Self::TenseTremblingTone => {
                props.rate = rate_offset(-10);
                props.pitch = 105;
            }
            Self::BrightUpliftedTone => {
                props.rate = rate_offset(10);
                props.pitch = 110;
                props.volume = 0.85;
            }
            Self::SomberHeavyTone => {
                props.rate = rate_offset(-20);
                props.pitch = 90;
                props.volume = 0.75;
            }
            Self::SharpIntenseTone => {
                props.rate = rate_offset(15);
                props.pitch = 105;
                props.volume = 0.9;
            }
            Self::DialogueVoice => {
                props.pitch = 105;
                props.rate = rate_offset(5);
            }
            Self::Emotive => {
                props.volume = (props.volume + 0.1).min(1.0);
                props.pitch = props.pitch.saturating_add(5);
            }
            Self::Natural => props.rate = BASELINE_RATE,
            Self::Thrilling => {
                props.volume = 0.95;
                props.pitch = props.pitch.saturating_add(10);
            }
            Self::SceneChange => *props = ProsodyProperties::scene_start(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(cues: &[Cue]) -> ProsodyProperties {
        let mut props = ProsodyProperties::default();
        for cue in cues {
            cue.apply(&mut props);
        }
        props
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(Cue::parse("  soft reflective tone "), Some(Cue::SoftTone));
        assert_eq!(Cue::parse("Shift Tone"), Some(Cue::SceneChange));
        assert_eq!(Cue::parse("increase pace"), Some(Cue::FasterPace));
    }

    #[test]
    fn unknown_tokens_are_not_cues() {
        assert_eq!(Cue::parse("WHISPERED"), None);
        assert_eq!(Cue::parse("TONE: DARK"), None);
        assert_eq!(Cue::parse(""), None);
    }

    #[test]
    fn soft_tone_lowers_rate_and_volume() {
        let props = applied(&[Cue::SoftTone]);
        assert_eq!(props.rate, 155);
        assert_eq!(props.volume, 0.7);
        assert_eq!(props.pitch, BASELINE_PITCH);
    }

    #[test]
    fn later_pace_cue_wins() {
        let props = applied(&[Cue::SlowerPace, Cue::FasterPace]);
        assert_eq!(props.rate, 205);
    }

    #[test]
    fn rate_cues_are_relative_to_baseline_not_current() {
        let props = applied(&[Cue::FasterPace, Cue::SomberHeavyTone]);
        assert_eq!(props.rate, 155);
        assert_eq!(props.pitch, 90);
        assert_eq!(props.volume, 0.75);
    }

    #[test]
    fn emotive_twice_clamps_volume() {
        let props = applied(&[Cue::IncreasedVolume, Cue::Emotive, Cue::Emotive]);
        assert_eq!(props.volume, 1.0);
        assert_eq!(props.pitch, 110);
    }

    #[test]
    fn relative_pitch_cues_drift_without_clamp() {
        // Pitch is deliberately left unclamped; this records the drift.
        let mut cues = vec![Cue::Emotive; 20];
        cues.extend([Cue::Thrilling; 5]);
        let props = applied(&cues);
        assert_eq!(props.pitch, 100 + 20 * 5 + 5 * 10);
        assert!(props.volume <= 1.0);
    }

    #[test]
    fn natural_only_resets_rate() {
        let props = applied(&[Cue::SharpIntenseTone, Cue::Natural]);
        assert_eq!(props.rate, BASELINE_RATE);
        assert_eq!(props.pitch, 105);
        assert_eq!(props.volume, 0.9);
    }

    #[test]
    fn scene_change_resets_with_transition_pause() {
        let props = applied(&[Cue::Thrilling, Cue::Pause, Cue::SceneChange]);
        assert_eq!(props, ProsodyProperties::scene_start());
        assert_eq!(props.pause_before, SCENE_TRANSITION_MS);
        assert_eq!(props.pause_after, 0);
    }

    #[test]
    fn pause_cues_classify() {
        assert_eq!(Cue::Pause.kind(), CueKind::TrailingPause);
        assert_eq!(Cue::PauseLonger.kind(), CueKind::TrailingPause);
        assert_eq!(Cue::PauseBriefly.kind(), CueKind::Voice);
        assert_eq!(Cue::SceneChange.kind(), CueKind::Boundary);
    }
}
