//! Voice session controller.
//!
//! Ties the speech capture adapter, the silence-based utterance segmenter and
//! the command detector together into one state machine. The orchestrator
//! drives it with [`SessionCommand`]s and reacts to [`SessionEvent`]s; the
//! engine feeds it [`crate::speech::RecognizerEvent`]s.

pub mod controller;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{SessionCommand, SessionEvent, VoiceSessionController};
pub use state::{SessionPhase, TranscriptBuffer};
