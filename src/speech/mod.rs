//! Speech capture adapter.
//!
//! Wraps a continuous, interim-enabled speech-recognition engine behind the
//! object-safe [`SpeechRecognizer`] trait. Implementations deliver
//! [`RecognizerEvent`]s over a `tokio::sync::mpsc` channel handed to them at
//! construction, so the session controller can consume engine callbacks,
//! timer deadlines and commands from a single `select!` loop.
//!
//! [`ScriptedRecognizer`] is the engine used by the demo binary and
//! integration-style tests: it turns lines from any text source into
//! recognition events (one interim preview, then the finalized segment),
//! standing in for a platform ASR engine on headless builds.

pub mod recognizer;
pub mod scripted;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use recognizer::{RecognizedSegment, RecognizerError, RecognizerEvent, SpeechRecognizer};
pub use scripted::ScriptedRecognizer;

#[cfg(test)]
pub use recognizer::MockRecognizer;
