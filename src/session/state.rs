//! Session phase and transcript buffer.
//!
//! [`SessionPhase`] is the application's listening intent as a tagged state,
//! so "listening while processing" is unrepresentable. The engine's physical
//! capture state is tracked separately by the controller because capture can
//! outlive listening intent (the warm-microphone auto-restart).
//!
//! [`TranscriptBuffer`] accumulates finalized recognition segments for the
//! current utterance and holds the single replace-in-place interim string.

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// The application's intent toward incoming speech.
///
/// ```text
/// Idle ──start listening──▶ Listening
/// Listening ──silence / stop──▶ Idle
/// Idle ──fetch dispatched──▶ Processing ──fetch concluded──▶ Idle
/// ```
///
/// `Listening` accepts transcript events; `Processing` means an utterance has
/// been handed off and no new input is accepted for it; `Idle` is neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Listening,
    Processing,
}

impl SessionPhase {
    /// Returns `true` while transcript events are accepted.
    pub fn is_listening(&self) -> bool {
        matches!(self, SessionPhase::Listening)
    }

    /// Returns `true` while an utterance is being processed downstream.
    pub fn is_processing(&self) -> bool {
        matches!(self, SessionPhase::Processing)
    }

    /// A short human-readable label suitable for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Listening => "listening",
            SessionPhase::Processing => "processing",
        }
    }
}

// ---------------------------------------------------------------------------
// TranscriptBuffer
// ---------------------------------------------------------------------------

/// Accumulated transcription for the current utterance.
///
/// Finalized segments are appended in arrival order, each followed by a
/// space, so the final text reads as the engine produced it. The interim
/// string is replaced wholesale on every accepted result and discarded when
/// capture ends or the buffer is reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptBuffer {
    final_text: String,
    interim: String,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finalized segment.
    pub fn push_final(&mut self, segment: &str) {
        self.final_text.push_str(segment);
        self.final_text.push(' ');
    }

    /// Replace the interim text wholesale.
    pub fn set_interim(&mut self, text: impl Into<String>) {
        self.interim = text.into();
    }

    /// Discard the interim text only (capture ended mid-utterance).
    pub fn clear_interim(&mut self) {
        self.interim.clear();
    }

    /// Discard both buffers.
    pub fn clear(&mut self) {
        self.final_text.clear();
        self.interim.clear();
    }

    /// The accumulated finalized text, including trailing separators.
    pub fn final_text(&self) -> &str {
        &self.final_text
    }

    /// The finalized text with surrounding whitespace trimmed — what gets
    /// sent to the recommendation service.
    pub fn trimmed(&self) -> &str {
        self.final_text.trim()
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }

    /// Returns `true` when no finalized text has accumulated.
    pub fn is_empty(&self) -> bool {
        self.trimmed().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
