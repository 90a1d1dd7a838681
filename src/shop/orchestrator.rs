//! Shop orchestrator — turns session events into screens and side effects.
//!
//! [`ShopOrchestrator`] owns the [`SharedShopState`], the cart and the
//! recommendation client, and responds to [`SessionEvent`]s from the
//! controller plus [`ControlEvent`]s from the user surface.
//!
//! # Workflows
//!
//! ```text
//! ListeningStopped (text, no command, not processing)
//!   └─▶ Processing=true → recommend(text) on a side task
//!         ├─ product → view = Product, re-listen after a short delay
//!         ├─ empty   → "no products found", stay on Voice
//!         └─ error   → generic failure message, stay on Voice
//!       (all paths: transcript cleared, Processing=false)
//!
//! CommandDetected(Add), product displayed
//!   └─▶ stop listening → show acknowledgment → commit to cart
//!       → back to Voice → re-listen after a further delay
//!
//! CommandDetected(OpenCart)
//!   └─▶ view = Cart immediately; listening untouched
//! ```
//!
//! The fetch runs on a spawned task so mic taps that arrive while a request
//! is in flight are evaluated — and ignored — while Processing is still true,
//! instead of being replayed after it concludes. Detected commands are also
//! ignored while Processing=true; the transcript reset at fetch conclusion
//! wipes the stale command on the controller side.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::cart::CartService;
use crate::command::VoiceCommand;
use crate::config::TimingConfig;
use crate::recommend::{Product, RecommendError, RecommendationClient};
use crate::session::{SessionCommand, SessionEvent};

use super::state::{SharedShopState, ViewState};

// ---------------------------------------------------------------------------
// ControlEvent
// ---------------------------------------------------------------------------

/// Release direction of a drag gesture on the microphone control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragDirection {
    Up,
    Down,
    Left,
    Right,
}

impl DragDirection {
    pub fn label(&self) -> &'static str {
        match self {
            DragDirection::Up => "up",
            DragDirection::Down => "down",
            DragDirection::Left => "left",
            DragDirection::Right => "right",
        }
    }
}

/// Events from the user surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// The single microphone control was tapped.
    MicTap,
    /// The control was dragged and released in a direction. Observable but
    /// currently only logged.
    MicDrag(DragDirection),
}

// ---------------------------------------------------------------------------
// User-facing messages
// ---------------------------------------------------------------------------

const NO_PRODUCTS_MESSAGE: &str = "No products found. Try asking for something else.";
const FETCH_FAILED_MESSAGE: &str = "Could not fetch a recommendation. Please try again.";

/// Outcome of a spawned fetch, delivered back into the orchestrator loop.
type FetchOutcome = Result<Option<Product>, RecommendError>;

// ---------------------------------------------------------------------------
// ShopOrchestrator
// ---------------------------------------------------------------------------

/// Drives view selection, the fetch workflow and the command workflows.
///
/// Create with [`ShopOrchestrator::new`], then spawn [`run`](Self::run) as a
/// tokio task.
pub struct ShopOrchestrator {
    state: SharedShopState,
    cart: CartService,
    client: Arc<dyn RecommendationClient>,
    session_tx: mpsc::Sender<SessionCommand>,
    timing: TimingConfig,
}

impl ShopOrchestrator {
    pub fn new(
        state: SharedShopState,
        cart: CartService,
        client: Arc<dyn RecommendationClient>,
        session_tx: mpsc::Sender<SessionCommand>,
        timing: TimingConfig,
    ) -> Self {
        Self {
            state,
            cart,
            client,
            session_tx,
            timing,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the orchestrator until both input channels close.
    pub async fn run(
        mut self,
        mut session_rx: mpsc::Receiver<SessionEvent>,
        mut control_rx: mpsc::Receiver<ControlEvent>,
    ) {
        let (fetch_tx, mut fetch_rx) = mpsc::channel::<FetchOutcome>(4);

        loop {
            tokio::select! {
                event = session_rx.recv() => match event {
                    Some(event) => self.handle_session_event(event, &fetch_tx).await,
                    None => break,
                },
                event = control_rx.recv() => match event {
                    Some(event) => self.handle_control_event(event).await,
                    None => break,
                },
                Some(outcome) = fetch_rx.recv() => self.conclude_fetch(outcome).await,
            }
        }

        log::info!("shop: orchestrator shut down");
    }

    // -----------------------------------------------------------------------
    // Session events
    // -----------------------------------------------------------------------

    async fn handle_session_event(
        &mut self,
        event: SessionEvent,
        fetch_tx: &mpsc::Sender<FetchOutcome>,
    ) {
        match event {
            SessionEvent::RecordingStarted => {
                self.state.lock().unwrap().recording = true;
            }
            SessionEvent::RecordingStopped => {
                self.state.lock().unwrap().recording = false;
            }
            SessionEvent::ListeningStarted => {
                let mut st = self.state.lock().unwrap();
                st.listening = true;
                st.status = None;
                st.transcript.clear();
                st.interim.clear();
            }
            SessionEvent::TranscriptUpdated { final_text, interim } => {
                let mut st = self.state.lock().unwrap();
                st.transcript = final_text;
                st.interim = interim;
            }
            SessionEvent::CommandDetected(cmd) => self.handle_voice_command(cmd).await,
            SessionEvent::ListeningStopped {
                transcript,
                command_pending,
            } => {
                let processing = {
                    let mut st = self.state.lock().unwrap();
                    st.listening = false;
                    st.interim.clear();
                    st.processing
                };

                // A plain request, not a confirmation: hand it to the
                // recommendation service.
                if !processing && !command_pending && !transcript.trim().is_empty() {
                    self.begin_fetch(transcript, fetch_tx).await;
                }
            }
            SessionEvent::Error { message, fatal } => {
                if fatal {
                    log::error!("shop: voice session lost: {message}");
                }
                self.state.lock().unwrap().status = Some(message);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Fetch workflow
    // -----------------------------------------------------------------------

    async fn begin_fetch(&mut self, transcript: String, fetch_tx: &mpsc::Sender<FetchOutcome>) {
        log::info!("shop: requesting recommendation for {:?}", transcript.trim());
        self.state.lock().unwrap().processing = true;
        self.send_session(SessionCommand::SetProcessing(true)).await;

        let client = Arc::clone(&self.client);
        let tx = fetch_tx.clone();
        tokio::spawn(async move {
            let outcome = client.recommend(&transcript).await;
            let _ = tx.send(outcome).await;
        });
    }

    async fn conclude_fetch(&mut self, outcome: FetchOutcome) {
        let success = match outcome {
            Ok(Some(product)) => {
                log::info!("shop: recommendation: {}", product.name);
                let mut st = self.state.lock().unwrap();
                st.current_product = Some(product);
                st.view = ViewState::Product;
                st.status = None;
                true
            }
            Ok(None) => {
                log::info!("shop: no products found");
                self.state.lock().unwrap().status = Some(NO_PRODUCTS_MESSAGE.into());
                false
            }
            Err(e) => {
                log::warn!("shop: recommendation fetch failed: {e}");
                self.state.lock().unwrap().status = Some(FETCH_FAILED_MESSAGE.into());
                false
            }
        };

        // Every path clears the transcript and ends Processing; the flag must
        // not stay stuck after a failure.
        self.send_session(SessionCommand::ResetTranscript).await;
        {
            let mut st = self.state.lock().unwrap();
            st.transcript.clear();
            st.interim.clear();
            st.processing = false;
        }
        self.send_session(SessionCommand::SetProcessing(false)).await;

        // On success, re-arm listening shortly so the user can immediately
        // speak a confirmation.
        if success {
            let tx = self.session_tx.clone();
            let delay = self.timing.relisten_delay();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(SessionCommand::StartListening).await;
            });
        }
    }

    // -----------------------------------------------------------------------
    // Command workflow
    // -----------------------------------------------------------------------

    async fn handle_voice_command(&mut self, cmd: VoiceCommand) {
        if self.state.lock().unwrap().processing {
            log::debug!("shop: ignoring {} command while processing", cmd.label());
            return;
        }

        match cmd {
            VoiceCommand::Add => self.confirm_add().await,
            VoiceCommand::OpenCart => {
                log::info!("shop: opening cart by voice");
                self.state.lock().unwrap().view = ViewState::Cart;
                self.send_session(SessionCommand::ClearCommand).await;
            }
        }
    }

    /// The add-confirmation sequence: acknowledge, commit, resume listening.
    async fn confirm_add(&mut self) {
        let product = self.state.lock().unwrap().current_product.clone();
        let Some(product) = product else {
            log::debug!("shop: add command with no product displayed");
            self.send_session(SessionCommand::ClearCommand).await;
            return;
        };

        self.send_session(SessionCommand::StopListening).await;
        self.send_session(SessionCommand::ResetTranscript).await;
        {
            let mut st = self.state.lock().unwrap();
            st.confirming = true;
            st.transcript.clear();
            st.interim.clear();
        }

        tokio::time::sleep(self.timing.confirm_hold()).await;

        self.cart.add(product.clone());
        log::info!(
            "shop: added {} to cart ({} item(s))",
            product.name,
            self.cart.item_count()
        );
        {
            let mut st = self.state.lock().unwrap();
            st.confirming = false;
            st.current_product = None;
            st.view = ViewState::Voice;
            st.cart_count = self.cart.item_count();
            st.cart_total = self.cart.total_price();
        }
        self.send_session(SessionCommand::ClearCommand).await;

        tokio::time::sleep(self.timing.resume_delay()).await;
        self.send_session(SessionCommand::StartListening).await;
    }

    // -----------------------------------------------------------------------
    // Control events
    // -----------------------------------------------------------------------

    async fn handle_control_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::MicTap => self.handle_mic_tap().await,
            ControlEvent::MicDrag(direction) => {
                log::info!("shop: mic drag released {}", direction.label());
            }
        }
    }

    async fn handle_mic_tap(&mut self) {
        let (processing, listening, view) = {
            let st = self.state.lock().unwrap();
            (st.processing, st.listening, st.view)
        };

        if processing {
            log::debug!("shop: mic tap ignored while processing");
            return;
        }
        if listening {
            self.send_session(SessionCommand::StopListening).await;
            return;
        }

        // Leaving a non-voice view starts a fresh request.
        if view != ViewState::Voice {
            {
                let mut st = self.state.lock().unwrap();
                st.view = ViewState::Voice;
                st.current_product = None;
                st.transcript.clear();
                st.interim.clear();
            }
            self.send_session(SessionCommand::ResetTranscript).await;
        }
        self.send_session(SessionCommand::StartListening).await;
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn send_session(&self, cmd: SessionCommand) {
        if self.session_tx.send(cmd).await.is_err() {
            log::warn!("shop: session command channel closed");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::MockRecommendationClient;
    use crate::shop::state::new_shared_shop_state;
    use std::time::Duration;

    // -----------------------------------------------------------------------
    // Harness
    // -----------------------------------------------------------------------

    struct Harness {
        state: SharedShopState,
        session_events: mpsc::Sender<SessionEvent>,
        control: mpsc::Sender<ControlEvent>,
        session_cmds: mpsc::Receiver<SessionCommand>,
    }

    impl Harness {
        fn spawn(client: Arc<dyn RecommendationClient>) -> Self {
            let (session_event_tx, session_event_rx) = mpsc::channel(32);
            let (control_tx, control_rx) = mpsc::channel(16);
            let (session_cmd_tx, session_cmd_rx) = mpsc::channel(32);

            let state = new_shared_shop_state();
            let orchestrator = ShopOrchestrator::new(
                Arc::clone(&state),
                CartService::new(),
                client,
                session_cmd_tx,
                TimingConfig::default(),
            );
            tokio::spawn(orchestrator.run(session_event_rx, control_rx));

            Self {
                state,
                session_events: session_event_tx,
                control: control_tx,
                session_cmds: session_cmd_rx,
            }
        }

        async fn send(&self, event: SessionEvent) {
            self.session_events
                .send(event)
                .await
                .expect("orchestrator alive");
        }

        async fn tap(&self) {
            self.control
                .send(ControlEvent::MicTap)
                .await
                .expect("orchestrator alive");
        }

        async fn next_cmd(&mut self) -> SessionCommand {
            tokio::time::timeout(Duration::from_secs(30), self.session_cmds.recv())
                .await
                .expect("command within timeout")
                .expect("command channel open")
        }

        fn drain_cmds(&mut self) -> Vec<SessionCommand> {
            let mut out = Vec::new();
            while let Ok(cmd) = self.session_cmds.try_recv() {
                out.push(cmd);
            }
            out
        }
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    fn sample_product() -> Product {
        Product {
            id: "p-1".into(),
            name: "Broccoli".into(),
            image: "https://cdn.example.com/broccoli.jpg".into(),
            price: 3900.0,
            description: None,
            brand: None,
            main_features: Vec::new(),
            tags: Vec::new(),
            delivery_days: None,
            category: None,
        }
    }

    fn utterance(text: &str) -> SessionEvent {
        SessionEvent::ListeningStopped {
            transcript: text.into(),
            command_pending: false,
        }
    }

    // -----------------------------------------------------------------------
    // Fetch workflow
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn fetch_success_shows_product_and_rearms_listening() {
        let client = Arc::new(MockRecommendationClient::ok(sample_product()));
        let mut h = Harness::spawn(Arc::clone(&client) as Arc<dyn RecommendationClient>);

        h.send(utterance("broccoli")).await;

        assert_eq!(h.next_cmd().await, SessionCommand::SetProcessing(true));
        assert_eq!(h.next_cmd().await, SessionCommand::ResetTranscript);
        assert_eq!(h.next_cmd().await, SessionCommand::SetProcessing(false));
        // The re-listen arrives only after the pacing delay.
        assert_eq!(h.next_cmd().await, SessionCommand::StartListening);

        let st = h.state.lock().unwrap();
        assert_eq!(st.view, ViewState::Product);
        assert!(!st.processing);
        assert_eq!(st.current_product.as_ref().map(|p| p.name.as_str()), Some("Broccoli"));
        assert!(st.status.is_none());
        drop(st);

        assert_eq!(client.requests(), vec!["broccoli"]);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_empty_result_keeps_voice_view_with_message() {
        let client = Arc::new(MockRecommendationClient::new());
        let mut h = Harness::spawn(client);

        h.send(utterance("unobtainium")).await;

        assert_eq!(h.next_cmd().await, SessionCommand::SetProcessing(true));
        assert_eq!(h.next_cmd().await, SessionCommand::ResetTranscript);
        assert_eq!(h.next_cmd().await, SessionCommand::SetProcessing(false));
        settle().await;

        let st = h.state.lock().unwrap();
        assert_eq!(st.view, ViewState::Voice);
        assert!(!st.processing);
        assert_eq!(st.status.as_deref(), Some(NO_PRODUCTS_MESSAGE));
        drop(st);

        // No re-listen on an empty result.
        assert!(h.drain_cmds().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_surfaces_message_and_clears_processing() {
        let client = Arc::new(MockRecommendationClient::failing(RecommendError::Timeout));
        let mut h = Harness::spawn(client);

        h.send(utterance("broccoli")).await;

        assert_eq!(h.next_cmd().await, SessionCommand::SetProcessing(true));
        assert_eq!(h.next_cmd().await, SessionCommand::ResetTranscript);
        assert_eq!(h.next_cmd().await, SessionCommand::SetProcessing(false));
        settle().await;

        let st = h.state.lock().unwrap();
        assert_eq!(st.view, ViewState::Voice);
        assert!(!st.processing);
        assert_eq!(st.status.as_deref(), Some(FETCH_FAILED_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_transcript_and_pending_command_do_not_fetch() {
        let client = Arc::new(MockRecommendationClient::new());
        let mut h = Harness::spawn(client);

        h.send(utterance("   ")).await;
        h.send(SessionEvent::ListeningStopped {
            transcript: "add this".into(),
            command_pending: true,
        })
        .await;
        settle().await;

        assert!(h.drain_cmds().is_empty());
        assert!(!h.state.lock().unwrap().processing);
    }

    // -----------------------------------------------------------------------
    // Command workflow
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn add_command_commits_product_and_resumes_listening() {
        let client = Arc::new(MockRecommendationClient::new());
        let mut h = Harness::spawn(client);
        {
            let mut st = h.state.lock().unwrap();
            st.current_product = Some(sample_product());
            st.view = ViewState::Product;
        }

        h.send(SessionEvent::CommandDetected(VoiceCommand::Add)).await;

        assert_eq!(h.next_cmd().await, SessionCommand::StopListening);
        assert_eq!(h.next_cmd().await, SessionCommand::ResetTranscript);
        // Acknowledgment holds, then the cart commit and the single clear.
        assert_eq!(h.next_cmd().await, SessionCommand::ClearCommand);
        assert_eq!(h.next_cmd().await, SessionCommand::StartListening);

        let st = h.state.lock().unwrap();
        assert_eq!(st.cart_count, 1);
        assert_eq!(st.cart_total, 3900.0);
        assert!(!st.confirming);
        assert!(st.current_product.is_none());
        assert_eq!(st.view, ViewState::Voice);
        drop(st);

        // Exactly one ClearCommand for the whole sequence.
        assert!(h.drain_cmds().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn add_command_without_product_only_acknowledges() {
        let client = Arc::new(MockRecommendationClient::new());
        let mut h = Harness::spawn(client);

        h.send(SessionEvent::CommandDetected(VoiceCommand::Add)).await;
        settle().await;

        assert_eq!(h.drain_cmds(), vec![SessionCommand::ClearCommand]);
        assert_eq!(h.state.lock().unwrap().cart_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn open_cart_command_switches_view_immediately() {
        let client = Arc::new(MockRecommendationClient::new());
        let mut h = Harness::spawn(client);
        h.state.lock().unwrap().listening = true;

        h.send(SessionEvent::CommandDetected(VoiceCommand::OpenCart))
            .await;
        settle().await;

        assert_eq!(h.drain_cmds(), vec![SessionCommand::ClearCommand]);
        let st = h.state.lock().unwrap();
        assert_eq!(st.view, ViewState::Cart);
        // No effect on listening.
        assert!(st.listening);
    }

    #[tokio::test(start_paused = true)]
    async fn commands_are_ignored_while_processing() {
        let client = Arc::new(MockRecommendationClient::new());
        let mut h = Harness::spawn(client);
        {
            let mut st = h.state.lock().unwrap();
            st.processing = true;
            st.current_product = Some(sample_product());
        }

        h.send(SessionEvent::CommandDetected(VoiceCommand::Add)).await;
        h.send(SessionEvent::CommandDetected(VoiceCommand::OpenCart))
            .await;
        settle().await;

        assert!(h.drain_cmds().is_empty());
        let st = h.state.lock().unwrap();
        assert_eq!(st.cart_count, 0);
        assert_ne!(st.view, ViewState::Cart);
    }

    // -----------------------------------------------------------------------
    // Mic tap
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn tap_is_ignored_while_processing() {
        let client = Arc::new(MockRecommendationClient::new());
        let mut h = Harness::spawn(client);
        h.state.lock().unwrap().processing = true;

        h.tap().await;
        settle().await;

        assert!(h.drain_cmds().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn tap_while_listening_stops_listening() {
        let client = Arc::new(MockRecommendationClient::new());
        let mut h = Harness::spawn(client);
        h.state.lock().unwrap().listening = true;

        h.tap().await;
        settle().await;

        assert_eq!(h.drain_cmds(), vec![SessionCommand::StopListening]);
    }

    #[tokio::test(start_paused = true)]
    async fn tap_from_voice_view_starts_listening() {
        let client = Arc::new(MockRecommendationClient::new());
        let mut h = Harness::spawn(client);

        h.tap().await;
        settle().await;

        assert_eq!(h.drain_cmds(), vec![SessionCommand::StartListening]);
    }

    #[tokio::test(start_paused = true)]
    async fn tap_from_cart_view_resets_and_starts_listening() {
        let client = Arc::new(MockRecommendationClient::new());
        let mut h = Harness::spawn(client);
        {
            let mut st = h.state.lock().unwrap();
            st.view = ViewState::Cart;
            st.current_product = Some(sample_product());
        }

        h.tap().await;
        settle().await;

        assert_eq!(
            h.drain_cmds(),
            vec![
                SessionCommand::ResetTranscript,
                SessionCommand::StartListening
            ]
        );
        let st = h.state.lock().unwrap();
        assert_eq!(st.view, ViewState::Voice);
        assert!(st.current_product.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn drag_release_is_logged_only() {
        let client = Arc::new(MockRecommendationClient::new());
        let mut h = Harness::spawn(client);

        h.control
            .send(ControlEvent::MicDrag(DragDirection::Up))
            .await
            .unwrap();
        settle().await;

        assert!(h.drain_cmds().is_empty());
    }

    // -----------------------------------------------------------------------
    // Status slot
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn session_error_fills_status_slot() {
        let client = Arc::new(MockRecommendationClient::new());
        let h = Harness::spawn(client);

        h.send(SessionEvent::Error {
            message: "Recognition error: aborted".into(),
            fatal: false,
        })
        .await;
        settle().await;

        assert_eq!(
            h.state.lock().unwrap().status.as_deref(),
            Some("Recognition error: aborted")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn listening_start_clears_status_slot() {
        let client = Arc::new(MockRecommendationClient::new());
        let h = Harness::spawn(client);
        h.state.lock().unwrap().status = Some("stale error".into());

        h.send(SessionEvent::ListeningStarted).await;
        settle().await;

        let st = h.state.lock().unwrap();
        assert!(st.status.is_none());
        assert!(st.listening);
    }

    #[tokio::test(start_paused = true)]
    async fn transcript_mirrors_session_updates() {
        let client = Arc::new(MockRecommendationClient::new());
        let h = Harness::spawn(client);

        h.send(SessionEvent::TranscriptUpdated {
            final_text: "two ripe".into(),
            interim: "avoc".into(),
        })
        .await;
        settle().await;

        let st = h.state.lock().unwrap();
        assert_eq!(st.transcript, "two ripe");
        assert_eq!(st.interim, "avoc");
    }
}
