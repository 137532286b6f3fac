//! Cue parsing and segmentation.
//!
//! The input is split on `[...]` tokens into literal runs and cues, then
//! folded into an ordered list of segments. A segment closes at a scene
//! change, at a trailing pause, or when a voice cue arrives after text has
//! been accumulated. Segments never carry empty text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prosody::{Cue, CueKind, ProsodyProperties};

static CUE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("cue pattern is valid"));

static ANY_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("bracket pattern is valid"));

/// A run of narration text and the prosody it should be spoken with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub properties: ProsodyProperties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Cue(&'a str),
}

/// Split text into alternating literal and cue tokens. Unterminated or empty
/// brackets never match and stay in the literal text.
fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in CUE_PATTERN.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(Token::Text(&text[last..whole.start()]));
        }
        tokens.push(Token::Cue(inner.as_str()));
        last = whole.end();
    }

    if last < text.len() {
        tokens.push(Token::Text(&text[last..]));
    }

    tokens
}

#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<Segment>,
    pending: String,
    props: ProsodyProperties,
}

impl SegmentBuilder {
    fn push(mut self, token: Token<'_>) -> Self {
        match token {
            Token::Text(run) => self.pending.push_str(run),
            Token::Cue(raw) => match Cue::parse(raw) {
                Some(cue) => self.apply(cue),
                None => debug!("Ignoring unrecognized cue [{raw}]"),
            },
        }
        self
    }

    fn apply(&mut self, cue: Cue) {
        match cue.kind() {
            CueKind::Boundary => {
                self.flush();
                cue.apply(&mut self.props);
            }
            CueKind::TrailingPause => {
                cue.apply(&mut self.props);
                if self.has_pending_text() {
                    self.flush();
                    self.props = self.props.without_pauses();
                }
            }
            CueKind::Voice => {
                if self.has_pending_text() {
                    self.flush();
                    self.props = self.props.without_pauses();
                }
                cue.apply(&mut self.props);
            }
        }
    }

    fn has_pending_text(&self) -> bool {
        !self.pending.trim().is_empty()
    }

    fn flush(&mut self) {
        let text = self.pending.trim();
        if !text.is_empty() {
            self.segments.push(Segment {
                text: text.to_string(),
                properties: self.props,
            });
        }
        self.pending.clear();
    }

    fn finish(mut self) -> Vec<Segment> {
        self.flush();
        self.segments
    }
}

/// Parse annotated narration text into segments. Total over all inputs.
pub fn parse_segments(text: &str) -> Vec<Segment> {
    let segments = tokenize(text)
        .into_iter()
        .fold(SegmentBuilder::default(), SegmentBuilder::push)
        .finish();
    debug!("Parsed {} segments from {} chars", segments.len(), text.len());
    segments
}

/// Text for display: every bracketed token removed, including ones the
/// narrator does not act on.
pub fn strip_cues(text: &str) -> String {
    ANY_BRACKET.replace_all(text, "").into_owned()
}
