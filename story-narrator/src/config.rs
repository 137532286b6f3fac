//! Configuration management for story-narrator.
//!
//! Loads config from YAML files in standard locations. Prosody baselines are
//! fixed constants and deliberately absent here.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::audio::AudioFormat;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    pub program: String,
    pub voice: Option<String>,
    pub extra_args: Vec<String>,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".into(),
            voice: None,
            extra_args: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Root for per-request scratch directories. System temp dir when unset.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let format = AudioFormat::default();
        Self {
            sample_rate: format.sample_rate,
            channels: format.channels,
            scratch_dir: None,
        }
    }
}

impl OutputConfig {
    pub fn format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate: self.sample_rate.max(1),
            channels: self.channels.max(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub synthesizer: SynthesizerConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./narrator.yaml
    /// 2. ~/.config/story-narrator/config.yaml
    /// 3. /etc/story-narrator/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("narrator.yaml")),
                dirs::home_dir().map(|h| h.join(".config/story-narrator/config.yaml")),
                Some(PathBuf::from("/etc/story-narrator/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match Self::from_yaml(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("synthesizer:\n  voice: en-gb\n").unwrap();
        assert_eq!(config.synthesizer.program, "espeak-ng");
        assert_eq!(config.synthesizer.voice.as_deref(), Some("en-gb"));
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn full_yaml() {
        let yaml = r#"
synthesizer:
  program: /usr/bin/espeak
  extra_args: ["-g", "3"]
output:
  sample_rate: 16000
  channels: 2
  scratch_dir: /var/tmp/narration
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.synthesizer.program, "/usr/bin/espeak");
        assert_eq!(config.synthesizer.extra_args, vec!["-g", "3"]);
        assert_eq!(
            config.output.format(),
            AudioFormat {
                sample_rate: 16000,
                channels: 2
            }
        );
        assert_eq!(
            config.output.scratch_dir,
            Some(PathBuf::from("/var/tmp/narration"))
        );
    }

    #[test]
    fn unreadable_path_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("missing.yaml")));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn invalid_yaml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "output: [not, a, map]").unwrap();
        assert_eq!(Config::load(Some(&path)), Config::default());
    }

    #[test]
    fn zero_format_values_are_clamped() {
        let output = OutputConfig {
            sample_rate: 0,
            channels: 0,
            scratch_dir: None,
        };
        assert_eq!(output.format().sample_rate, 1);
        assert_eq!(output.format().channels, 1);
    }
}
