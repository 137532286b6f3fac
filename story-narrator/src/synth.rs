//! Speech synthesis backends.
//!
//! A synthesizer renders one segment to a WAV file at a path chosen by the
//! caller. Prosody is passed explicitly on every call; backends hold no
//! per-segment state.

use std::io::{self, ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::config::SynthesizerConfig;
use crate::error::SynthesisError;
use crate::prosody::ProsodyProperties;

pub trait SpeechSynthesizer: Send + Sync {
    /// Render `text` with `props` as a WAV file at `dest`.
    fn synthesize(
        &self,
        text: &str,
        props: &ProsodyProperties,
        dest: &Path,
    ) -> Result<(), SynthesisError>;
}

/// Drives an espeak-ng compatible command line synthesizer.
///
/// Rate maps to `-s` (words per minute), volume to `-a` amplitude on a
/// 0-100 scale and pitch to `-p` on espeak's 0-99 scale, where the baseline
/// pitch of 100 lands on espeak's default of 50. The engine treats all of
/// them as hints.
pub struct CommandSynthesizer {
    program: String,
    voice: Option<String>,
    extra_args: Vec<String>,
}

impl CommandSynthesizer {
    pub fn new(config: &SynthesizerConfig) -> Self {
        Self {
            program: config.program.clone(),
            voice: config.voice.clone().filter(|v| !v.is_empty()),
            extra_args: config.extra_args.clone(),
        }
    }

    fn prosody_args(&self, props: &ProsodyProperties) -> Vec<String> {
        let amplitude = (props.volume.clamp(0.0, 1.0) * 100.0).round() as u32;
        let pitch = (props.pitch / 2).min(99);

        let mut args = vec![
            "-s".to_string(),
            props.rate.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
            "-p".to_string(),
            pitch.to_string(),
        ];
        if let Some(voice) = &self.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn synthesize(
        &self,
        text: &str,
        props: &ProsodyProperties,
        dest: &Path,
    ) -> Result<(), SynthesisError> {
        let args = self.prosody_args(props);
        debug!("Running {} {} -w {}", self.program, args.join(" "), dest.display());

        let mut child = Command::new(&self.program)
            .args(&args)
            .arg("-w")
            .arg(dest)
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SynthesisError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // stdin is fed from its own thread while stderr drains here, so an
        // engine that fills its stderr pipe before reading input can't stall.
        // Dropping stdin closes the pipe so the engine sees end of input.
        // A broken pipe means the engine already exited; its status says why.
        let stdin = child.stdin.take();
        let output = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => match stdin.write_all(text.as_bytes()) {
                    Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                    written => written,
                },
                None => Ok(()),
            });
            let output = child.wait_with_output();
            writer
                .join()
                .map_err(|_| io::Error::other("stdin writer panicked"))??;
            output
        })?;
        if !output.status.success() {
            return Err(SynthesisError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !dest.exists() {
            return Err(SynthesisError::MissingOutput {
                path: dest.to_path_buf(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prosody::Cue;

    fn synth(program: &str, voice: Option<&str>) -> CommandSynthesizer {
        CommandSynthesizer::new(&SynthesizerConfig {
            program: program.into(),
            voice: voice.map(String::from),
            extra_args: vec![],
        })
    }

    #[test]
    fn baseline_maps_to_espeak_defaults() {
        let args = synth("espeak-ng", None).prosody_args(&ProsodyProperties::default());
        assert_eq!(args, vec!["-s", "175", "-a", "80", "-p", "50"]);
    }

    #[test]
    fn voice_and_extra_args_are_appended() {
        let mut s = synth("espeak-ng", Some("en-us"));
        s.extra_args = vec!["-g".into(), "2".into()];
        let mut props = ProsodyProperties::default();
        Cue::SharpIntenseTone.apply(&mut props);

        let args = s.prosody_args(&props);
        assert_eq!(
            args,
            vec!["-s", "190", "-a", "90", "-p", "52", "-v", "en-us", "-g", "2"]
        );
    }

    #[test]
    fn empty_voice_is_ignored() {
        let args = synth("espeak-ng", Some("")).prosody_args(&ProsodyProperties::default());
        assert!(!args.contains(&"-v".to_string()));
    }

    #[test]
    fn drifted_pitch_saturates_at_espeak_maximum() {
        let props = ProsodyProperties {
            pitch: 400,
            ..Default::default()
        };
        let args = synth("espeak-ng", None).prosody_args(&props);
        assert_eq!(args[5], "99");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = synth("definitely-not-a-real-tts-binary", None)
            .synthesize("Hello.", &ProsodyProperties::default(), &dir.path().join("a.wav"))
            .unwrap_err();
        assert!(matches!(err, SynthesisError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = synth("false", None)
            .synthesize("Hello.", &ProsodyProperties::default(), &dir.path().join("a.wav"))
            .unwrap_err();
        assert!(matches!(err, SynthesisError::Failed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn chatty_engine_with_long_input_does_not_stall() {
        use std::os::unix::fs::PermissionsExt;

        // Fills stderr well past a pipe buffer before it reads any input
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("chatty-tts");
        std::fs::write(
            &script,
            "#!/bin/sh\nhead -c 200000 /dev/zero >&2\ncat >/dev/null\nexit 3\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let text = "word ".repeat(40_000);
        let err = synth(script.to_str().unwrap(), None)
            .synthesize(&text, &ProsodyProperties::default(), &dir.path().join("a.wav"))
            .unwrap_err();
        match err {
            SynthesisError::Failed { status, .. } => assert!(status.contains('3')),
            other => panic!("expected failed status, got {other:?}"),
        }
    }
}
