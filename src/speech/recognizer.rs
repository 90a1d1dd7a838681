//! Core speech-recognition trait, events and errors.
//!
//! # Overview
//!
//! [`SpeechRecognizer`] is the narrow interface the session controller uses
//! to control capture. It is object-safe and `Send + Sync` so it can be held
//! behind an `Arc<dyn SpeechRecognizer>`.
//!
//! Engines report everything else — capture lifecycle, transcription
//! results, errors — as [`RecognizerEvent`]s pushed into the mpsc channel
//! they were constructed with. At most one capture session is active per
//! engine; a second `start()` while one is active fails with
//! [`RecognizerError::AlreadyActive`] instead of corrupting state.
//!
//! [`MockRecognizer`] (available under `#[cfg(test)]`) records start/stop
//! calls and lets tests script engine behavior without any real capture.

use thiserror::Error;

// ---------------------------------------------------------------------------
// RecognizerError
// ---------------------------------------------------------------------------

/// All errors the speech engine can surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecognizerError {
    /// The platform provides no speech-recognition facility. Fatal: voice
    /// features stay disabled for the whole session.
    #[error("Speech recognition is not supported: {0}")]
    NotSupported(String),

    /// Microphone access was denied. Fatal: capture must not auto-restart;
    /// the user has to re-grant permission outside the session.
    #[error("Microphone access denied. Please allow microphone permissions.")]
    PermissionDenied,

    /// `start()` was called while a capture session was already active.
    #[error("A recognition session is already active")]
    AlreadyActive,

    /// A transient engine failure; the engine's own restart may recover.
    #[error("Recognition error: {0}")]
    Engine(String),
}

impl RecognizerError {
    /// Returns `true` for errors that must suppress the capture auto-restart.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RecognizerError::NotSupported(_) | RecognizerError::PermissionDenied
        )
    }
}

// ---------------------------------------------------------------------------
// RecognizedSegment / RecognizerEvent
// ---------------------------------------------------------------------------

/// One piece of transcription inside a result event.
///
/// A final segment will not be revised further; an interim segment is a
/// provisional partial that is replaced in place on the next update.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedSegment {
    pub text: String,
    pub is_final: bool,
}

impl RecognizedSegment {
    /// A segment the engine will not revise further.
    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    /// A provisional segment, replaced in place on the next update.
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }
}

/// Events emitted by a speech engine, in strict arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognizerEvent {
    /// Physical capture has begun.
    Started,
    /// A batch of segments. `result_index` is a monotonically increasing
    /// cursor: segments in this event start at that position, and finalized
    /// segments never reappear at an earlier index.
    Result {
        result_index: u64,
        segments: Vec<RecognizedSegment>,
    },
    /// Physical capture has stopped — explicit `stop()`, the engine's own
    /// silence heuristics, or an error.
    Ended,
    /// The engine reported an error. A fatal error is usually followed by
    /// `Ended`.
    Error(RecognizerError),
}

// ---------------------------------------------------------------------------
// SpeechRecognizer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe control interface for speech engines.
///
/// # Contract
///
/// - `start()` requests that capture begin; `RecognizerEvent::Started`
///   confirms it asynchronously. Duplicate starts return
///   [`RecognizerError::AlreadyActive`].
/// - `stop()` requests graceful termination; `RecognizerEvent::Ended`
///   confirms it. Calling `stop()` while inactive is a no-op.
/// - Events are delivered over the engine's channel in arrival order.
pub trait SpeechRecognizer: Send + Sync {
    fn start(&self) -> Result<(), RecognizerError>;
    fn stop(&self);
}

// ---------------------------------------------------------------------------
// MockRecognizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that records control calls and emits lifecycle events
/// without any real capture.
///
/// Tests drive transcription by sending [`RecognizerEvent::Result`] into the
/// engine channel themselves; the mock only models `start()`/`stop()` and the
/// single-active-session rule.
#[cfg(test)]
pub struct MockRecognizer {
    events: tokio::sync::mpsc::Sender<RecognizerEvent>,
    active: std::sync::atomic::AtomicBool,
    start_calls: std::sync::atomic::AtomicUsize,
    stop_calls: std::sync::atomic::AtomicUsize,
    fail_next_start: std::sync::Mutex<Option<RecognizerError>>,
}

#[cfg(test)]
impl MockRecognizer {
    pub fn new(events: tokio::sync::mpsc::Sender<RecognizerEvent>) -> Self {
        Self {
            events,
            active: std::sync::atomic::AtomicBool::new(false),
            start_calls: std::sync::atomic::AtomicUsize::new(0),
            stop_calls: std::sync::atomic::AtomicUsize::new(0),
            fail_next_start: std::sync::Mutex::new(None),
        }
    }

    /// Make the next `start()` call fail with `error`.
    pub fn fail_next_start(&self, error: RecognizerError) {
        *self.fail_next_start.lock().unwrap() = Some(error);
    }

    /// Simulate the engine ending capture on its own (silence heuristics).
    pub fn end(&self) {
        if self.active.swap(false, std::sync::atomic::Ordering::SeqCst) {
            let _ = self.events.try_send(RecognizerEvent::Ended);
        }
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl SpeechRecognizer for MockRecognizer {
    fn start(&self) -> Result<(), RecognizerError> {
        self.start_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if let Some(error) = self.fail_next_start.lock().unwrap().take() {
            return Err(error);
        }
        if self.active.swap(true, std::sync::atomic::Ordering::SeqCst) {
            return Err(RecognizerError::AlreadyActive);
        }
        let _ = self.events.try_send(RecognizerEvent::Started);
        Ok(())
    }

    fn stop(&self) {
        self.stop_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.active.swap(false, std::sync::atomic::Ordering::SeqCst) {
            let _ = self.events.try_send(RecognizerEvent::Ended);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ---- RecognizerError ---

    #[test]
    fn permission_denied_is_fatal() {
        assert!(RecognizerError::PermissionDenied.is_fatal());
        assert!(RecognizerError::NotSupported("headless".into()).is_fatal());
    }

    #[test]
    fn transient_errors_are_recoverable() {
        assert!(!RecognizerError::AlreadyActive.is_fatal());
        assert!(!RecognizerError::Engine("network".into()).is_fatal());
    }

    #[test]
    fn error_display_mentions_cause() {
        let e = RecognizerError::Engine("aborted".into());
        assert!(e.to_string().contains("aborted"));
    }

    // ---- RecognizedSegment ---

    #[test]
    fn segment_constructors_set_finality() {
        assert!(RecognizedSegment::finalized("a").is_final);
        assert!(!RecognizedSegment::interim("a").is_final);
    }

    // ---- MockRecognizer ---

    #[tokio::test]
    async fn mock_start_emits_started_once() {
        let (tx, mut rx) = mpsc::channel(8);
        let mock = MockRecognizer::new(tx);

        mock.start().expect("first start");
        assert_eq!(mock.start_calls(), 1);
        assert_eq!(rx.recv().await, Some(RecognizerEvent::Started));
    }

    #[tokio::test]
    async fn mock_duplicate_start_is_already_active() {
        let (tx, _rx) = mpsc::channel(8);
        let mock = MockRecognizer::new(tx);

        mock.start().expect("first start");
        assert_eq!(mock.start(), Err(RecognizerError::AlreadyActive));
        assert_eq!(mock.start_calls(), 2);
    }

    #[tokio::test]
    async fn mock_stop_when_inactive_is_noop() {
        let (tx, mut rx) = mpsc::channel(8);
        let mock = MockRecognizer::new(tx);

        mock.stop();
        assert_eq!(mock.stop_calls(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn mock_fail_next_start_returns_configured_error() {
        let (tx, _rx) = mpsc::channel(8);
        let mock = MockRecognizer::new(tx);
        mock.fail_next_start(RecognizerError::PermissionDenied);

        assert_eq!(mock.start(), Err(RecognizerError::PermissionDenied));
        // The failure is consumed; the next start succeeds.
        assert!(mock.start().is_ok());
    }

    // ---- Object safety ---

    #[tokio::test]
    async fn box_dyn_recognizer_compiles() {
        let (tx, _rx) = mpsc::channel(8);
        let engine: Box<dyn SpeechRecognizer> = Box::new(MockRecognizer::new(tx));
        let _ = engine.start();
        engine.stop();
    }
}
