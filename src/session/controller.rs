//! Voice session controller — the interaction state machine.
//!
//! [`VoiceSessionController`] owns the listening lifecycle. It consumes
//! [`SessionCommand`]s from the orchestrator and [`RecognizerEvent`]s from the
//! speech engine in a single `select!` loop, together with two deadlines:
//!
//! * the **silence deadline** — re-armed on every accepted result; when it
//!   elapses the current utterance is complete and listening stops;
//! * the **restart deadline** — armed shortly after capture ends, so the
//!   microphone stays warm across the engine's own utterance boundaries
//!   without the app necessarily listening.
//!
//! "Engine is capturing" (`recording`) and "app wants input"
//! ([`SessionPhase::Listening`]) are tracked separately: the auto-restart
//! keeps capture alive while the app is idle, and results that arrive in that
//! window are dropped rather than leaked into the transcript.
//!
//! # Event flow
//!
//! ```text
//! SessionCommand::StartListening
//!   └─▶ engine.start() if cold → Listening, buffers cleared   [ListeningStarted]
//!
//! RecognizerEvent::Result (while Listening)
//!   └─▶ append finals, replace interim, re-arm silence timer  [TranscriptUpdated]
//!         └─ first trigger phrase match                       [CommandDetected]
//!
//! silence deadline / SessionCommand::StopListening
//!   └─▶ Listening → Idle                                      [ListeningStopped]
//!
//! RecognizerEvent::Ended (non-fatal)
//!   └─▶ arm restart deadline → engine.start()                 [RecordingStarted]
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::command::{detect_command, VoiceCommand};
use crate::config::TimingConfig;
use crate::speech::{RecognizedSegment, RecognizerEvent, SpeechRecognizer};

use super::state::{SessionPhase, TranscriptBuffer};

// ---------------------------------------------------------------------------
// SessionCommand / SessionEvent
// ---------------------------------------------------------------------------

/// Commands sent from the orchestrator (or the UI surface) to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Begin accepting transcript input, starting capture if it is cold.
    StartListening,
    /// Stop accepting transcript input. Physical capture may keep running.
    StopListening,
    /// Clear the transcript buffers, the detected command and the error state.
    ResetTranscript,
    /// Acknowledge that the detected command has been handled.
    ClearCommand,
    /// Gate transcript handoff while a fetch is in flight.
    SetProcessing(bool),
    /// Tear the session down: suppress the auto-restart, then stop capture.
    Shutdown,
}

/// Events emitted by the controller, in the order things happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The engine confirmed that physical capture began.
    RecordingStarted,
    /// Physical capture stopped.
    RecordingStopped,
    /// The controller is now accepting transcript input.
    ListeningStarted,
    /// The controller stopped accepting input for this utterance.
    ///
    /// `transcript` is the trimmed accumulated final text;
    /// `command_pending` is `true` when a voice command was detected inside
    /// it and has not been cleared yet.
    ListeningStopped {
        transcript: String,
        command_pending: bool,
    },
    /// The transcript buffers changed.
    TranscriptUpdated { final_text: String, interim: String },
    /// A trigger phrase was matched. Emitted once per utterance; the match
    /// sticks until `ClearCommand` or a buffer reset.
    CommandDetected(VoiceCommand),
    /// An engine or start failure. Fatal errors suppress the auto-restart.
    Error { message: String, fatal: bool },
}

// ---------------------------------------------------------------------------
// VoiceSessionController
// ---------------------------------------------------------------------------

/// The session state machine. Create with [`VoiceSessionController::new`],
/// then spawn [`run`](Self::run) as a tokio task.
pub struct VoiceSessionController {
    engine: Arc<dyn SpeechRecognizer>,
    timing: TimingConfig,
    events: mpsc::Sender<SessionEvent>,

    phase: SessionPhase,
    /// Whether the engine is physically capturing. Can outlive `phase ==
    /// Listening` because of the auto-restart.
    recording: bool,
    /// Set between a successful `engine.start()` and the `Started` event, so
    /// a second `StartListening` does not double-invoke the engine.
    start_in_flight: bool,
    buffer: TranscriptBuffer,
    detected: Option<VoiceCommand>,
    /// Once set, capture is never restarted again (fatal error or shutdown).
    restart_suppressed: bool,
    /// Last result cursor seen in this capture session; earlier cursors are
    /// stale and dropped.
    last_result_index: Option<u64>,
    silence_deadline: Option<Instant>,
    restart_deadline: Option<Instant>,
}

/// Sleep until `deadline`, or forever when there is none.
async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

impl VoiceSessionController {
    pub fn new(
        engine: Arc<dyn SpeechRecognizer>,
        timing: TimingConfig,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self {
            engine,
            timing,
            events,
            phase: SessionPhase::Idle,
            recording: false,
            start_in_flight: false,
            buffer: TranscriptBuffer::new(),
            detected: None,
            restart_suppressed: false,
            last_result_index: None,
            silence_deadline: None,
            restart_deadline: None,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the controller until `Shutdown` arrives or both channels close.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        mut engine_events: mpsc::Receiver<RecognizerEvent>,
    ) {
        loop {
            let silence_at = self.silence_deadline;
            let restart_at = self.restart_deadline;

            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(SessionCommand::Shutdown) | None => {
                        self.shutdown();
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd).await,
                },
                event = engine_events.recv() => match event {
                    Some(event) => self.handle_engine_event(event).await,
                    None => {
                        self.shutdown();
                        break;
                    }
                },
                _ = deadline_elapsed(silence_at) => self.on_silence_elapsed().await,
                _ = deadline_elapsed(restart_at) => self.on_restart_due().await,
            }
        }

        log::info!("session: controller shut down");
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::StartListening => self.start_listening().await,
            SessionCommand::StopListening => self.stop_listening("stop requested").await,
            SessionCommand::ResetTranscript => {
                self.buffer.clear();
                self.detected = None;
            }
            SessionCommand::ClearCommand => {
                self.detected = None;
            }
            SessionCommand::SetProcessing(true) => {
                // Listening and Processing are mutually exclusive; an
                // in-flight fetch closes the door on new input.
                self.silence_deadline = None;
                self.phase = SessionPhase::Processing;
            }
            SessionCommand::SetProcessing(false) => {
                if self.phase.is_processing() {
                    self.phase = SessionPhase::Idle;
                }
            }
            // Intercepted in run(); kept here so the match stays total.
            SessionCommand::Shutdown => self.shutdown(),
        }
    }

    async fn start_listening(&mut self) {
        // An explicit start supersedes any pending warm-mic restart.
        self.restart_deadline = None;

        if !self.recording && !self.start_in_flight {
            match self.engine.start() {
                Ok(()) => self.start_in_flight = true,
                Err(e) => {
                    log::warn!("session: engine start failed: {e}");
                    if e.is_fatal() {
                        self.restart_suppressed = true;
                    }
                    self.emit(SessionEvent::Error {
                        message: e.to_string(),
                        fatal: e.is_fatal(),
                    })
                    .await;
                    // Listening is not entered when the engine refused to
                    // start; the caller sees the error event instead.
                    return;
                }
            }
        }

        log::debug!("session: listening started");
        self.phase = SessionPhase::Listening;
        self.buffer.clear();
        self.detected = None;
        self.emit(SessionEvent::ListeningStarted).await;
    }

    async fn stop_listening(&mut self, reason: &str) {
        self.silence_deadline = None;
        if !self.phase.is_listening() {
            return;
        }

        log::debug!("session: listening stopped ({reason})");
        self.phase = SessionPhase::Idle;
        self.emit(SessionEvent::ListeningStopped {
            transcript: self.buffer.trimmed().to_string(),
            command_pending: self.detected.is_some(),
        })
        .await;
    }

    // -----------------------------------------------------------------------
    // Engine event handlers
    // -----------------------------------------------------------------------

    async fn handle_engine_event(&mut self, event: RecognizerEvent) {
        match event {
            RecognizerEvent::Started => {
                log::debug!("session: capture started");
                self.recording = true;
                self.start_in_flight = false;
                // A fresh capture session restarts the result cursor.
                self.last_result_index = None;
                self.emit(SessionEvent::RecordingStarted).await;
            }

            RecognizerEvent::Result {
                result_index,
                segments,
            } => self.on_result(result_index, segments).await,

            RecognizerEvent::Ended => {
                log::debug!("session: capture ended");
                self.recording = false;
                self.start_in_flight = false;
                self.buffer.clear_interim();
                self.emit(SessionEvent::RecordingStopped).await;
                self.stop_listening("capture ended").await;

                if !self.restart_suppressed {
                    self.restart_deadline = Some(Instant::now() + self.timing.restart_delay());
                }
            }

            RecognizerEvent::Error(e) => {
                log::warn!("session: engine error: {e}");
                let fatal = e.is_fatal();
                if fatal {
                    self.restart_suppressed = true;
                    self.restart_deadline = None;
                }
                self.recording = false;
                self.start_in_flight = false;
                self.emit(SessionEvent::Error {
                    message: e.to_string(),
                    fatal,
                })
                .await;
                self.stop_listening("engine error").await;
            }
        }
    }

    async fn on_result(&mut self, result_index: u64, segments: Vec<RecognizedSegment>) {
        if !self.phase.is_listening() {
            // Background capture from the auto-restart; the user never asked
            // for this input.
            log::debug!("session: dropping result while not listening");
            return;
        }

        if let Some(last) = self.last_result_index {
            if result_index < last {
                log::warn!("session: dropping stale result (cursor {result_index} < {last})");
                return;
            }
        }
        self.last_result_index = Some(result_index);
        self.silence_deadline = Some(Instant::now() + self.timing.silence());

        let mut interim = String::new();
        let mut got_final = false;
        for segment in &segments {
            if segment.is_final {
                self.buffer.push_final(&segment.text);
                got_final = true;
            } else {
                interim.push_str(&segment.text);
            }
        }
        self.buffer.set_interim(interim);

        // Scan the whole accumulated final text, not just this increment, so
        // a trigger word spoken anywhere in the utterance is caught. The
        // first match sticks until cleared.
        if got_final && self.detected.is_none() {
            if let Some(cmd) = detect_command(self.buffer.final_text()) {
                log::info!("session: voice command detected: {}", cmd.label());
                self.detected = Some(cmd);
                self.emit(SessionEvent::CommandDetected(cmd)).await;
            }
        }

        self.emit(SessionEvent::TranscriptUpdated {
            final_text: self.buffer.trimmed().to_string(),
            interim: self.buffer.interim().to_string(),
        })
        .await;
    }

    // -----------------------------------------------------------------------
    // Deadline handlers
    // -----------------------------------------------------------------------

    async fn on_silence_elapsed(&mut self) {
        self.silence_deadline = None;
        log::debug!("session: silence detected, utterance complete");
        self.stop_listening("silence").await;
    }

    async fn on_restart_due(&mut self) {
        self.restart_deadline = None;
        if self.restart_suppressed || self.recording || self.start_in_flight {
            return;
        }

        log::debug!("session: auto-restarting capture");
        match self.engine.start() {
            Ok(()) => self.start_in_flight = true,
            Err(e) => {
                log::warn!("session: auto-restart failed: {e}");
                if e.is_fatal() {
                    self.restart_suppressed = true;
                }
                self.emit(SessionEvent::Error {
                    message: e.to_string(),
                    fatal: e.is_fatal(),
                })
                .await;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Suppress the restart BEFORE stopping the engine, so the trailing
    /// `Ended` event cannot re-arm capture after intended shutdown.
    fn shutdown(&mut self) {
        self.restart_suppressed = true;
        self.restart_deadline = None;
        self.silence_deadline = None;
        self.engine.stop();
    }

    async fn emit(&self, event: SessionEvent) {
        if self.events.send(event).await.is_err() {
            log::debug!("session: event channel closed");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
