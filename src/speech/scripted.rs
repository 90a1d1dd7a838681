//! Text-line driven speech engine.
//!
//! [`ScriptedRecognizer`] consumes lines from an mpsc channel and emits them
//! as recognition events: an interim preview followed by the finalized
//! segment at the same result cursor, the way a streaming ASR engine revises
//! a partial into a final. The demo binary feeds it stdin lines; tests feed
//! it scripted utterances.
//!
//! Lines that arrive while capture is inactive are discarded, matching a real
//! engine that only transcribes while a session is open.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::SpeechConfig;

use super::recognizer::{RecognizedSegment, RecognizerError, RecognizerEvent, SpeechRecognizer};

// ---------------------------------------------------------------------------
// ScriptedRecognizer
// ---------------------------------------------------------------------------

/// A speech engine fed by text lines instead of audio.
pub struct ScriptedRecognizer {
    events: mpsc::Sender<RecognizerEvent>,
    active: Arc<AtomicBool>,
}

impl ScriptedRecognizer {
    /// Spawn the line-consuming task and return the engine handle.
    ///
    /// Must be called from within a tokio runtime. The task runs until
    /// `lines` is closed.
    pub fn spawn(
        config: &SpeechConfig,
        mut lines: mpsc::Receiver<String>,
        events: mpsc::Sender<RecognizerEvent>,
    ) -> Arc<Self> {
        log::debug!("speech: scripted engine ready (language {})", config.language);

        let active = Arc::new(AtomicBool::new(false));
        let task_active = Arc::clone(&active);
        let task_events = events.clone();

        tokio::spawn(async move {
            let mut cursor: u64 = 0;

            while let Some(line) = lines.recv().await {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if !task_active.load(Ordering::SeqCst) {
                    log::debug!("speech: capture inactive, discarding line");
                    continue;
                }

                let interim = RecognizerEvent::Result {
                    result_index: cursor,
                    segments: vec![RecognizedSegment::interim(&line)],
                };
                let finalized = RecognizerEvent::Result {
                    result_index: cursor,
                    segments: vec![RecognizedSegment::finalized(&line)],
                };
                if task_events.send(interim).await.is_err()
                    || task_events.send(finalized).await.is_err()
                {
                    break;
                }
                cursor += 1;
            }

            log::debug!("speech: line source closed, scripted engine done");
        });

        Arc::new(Self { events, active })
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&self) -> Result<(), RecognizerError> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(RecognizerError::AlreadyActive);
        }
        let _ = self.events.try_send(RecognizerEvent::Started);
        Ok(())
    }

    fn stop(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            let _ = self.events.try_send(RecognizerEvent::Ended);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
