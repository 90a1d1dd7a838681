//! Application entry point — voice-driven shopping demo.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the channels wiring engine → controller → orchestrator.
//! 4. Spawn the scripted speech engine (stdin lines stand in for audio).
//! 5. Spawn the session controller.
//! 6. Build the HTTP recommendation client and the cart.
//! 7. Spawn the shop orchestrator.
//! 8. Run the stdin REPL until `/quit`.
//!
//! The REPL treats plain lines as recognized speech; `/mic` taps the
//! microphone control, `/state` prints the shop snapshot.

use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use voice_shop::{
    cart::CartService,
    config::AppConfig,
    recommend::{HttpRecommendationClient, RecommendationClient},
    session::{SessionCommand, VoiceSessionController},
    shop::{new_shared_shop_state, ControlEvent, SharedShopState, ShopOrchestrator},
    speech::{ScriptedRecognizer, SpeechRecognizer},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voice-shop starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Channel setup
    let (line_tx, line_rx) = mpsc::channel::<String>(16);
    let (engine_tx, engine_rx) = mpsc::channel(64);
    let (session_cmd_tx, session_cmd_rx) = mpsc::channel::<SessionCommand>(16);
    let (session_event_tx, session_event_rx) = mpsc::channel(64);
    let (control_tx, control_rx) = mpsc::channel::<ControlEvent>(16);

    // 4. Speech engine — stdin lines become recognition events
    let engine = ScriptedRecognizer::spawn(&config.speech, line_rx, engine_tx);

    // 5. Session controller
    let controller = VoiceSessionController::new(
        Arc::clone(&engine) as Arc<dyn SpeechRecognizer>,
        config.timing,
        session_event_tx,
    );
    tokio::spawn(controller.run(session_cmd_rx, engine_rx));

    // 6. Recommendation client + cart
    let client: Arc<dyn RecommendationClient> =
        Arc::new(HttpRecommendationClient::from_config(&config.api));
    log::info!("recommendation endpoint: {}/chat", config.api.base_url);

    // 7. Shop orchestrator
    let state = new_shared_shop_state();
    let orchestrator = ShopOrchestrator::new(
        Arc::clone(&state),
        CartService::new(),
        client,
        session_cmd_tx.clone(),
        config.timing,
    );
    tokio::spawn(orchestrator.run(session_event_rx, control_rx));

    // 8. stdin REPL
    println!("voice-shop demo — type a request and press enter to \"speak\" it.");
    println!("  /mic    tap the microphone control");
    println!("  /state  print the current shop state");
    println!("  /quit   exit");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "/quit" => break,
            "/mic" => {
                let _ = control_tx.send(ControlEvent::MicTap).await;
            }
            "/state" => print_state(&state),
            spoken => {
                let _ = line_tx.send(spoken.to_string()).await;
            }
        }
    }

    // Shutdown marks the engine do-not-restart before stopping it, so the
    // trailing end event cannot re-arm capture.
    let _ = session_cmd_tx.send(SessionCommand::Shutdown).await;
    log::info!("voice-shop shutting down");
    Ok(())
}

fn print_state(state: &SharedShopState) {
    let st = state.lock().unwrap();
    println!(
        "view: {}  listening: {}  recording: {}  processing: {}",
        st.view.label(),
        st.listening,
        st.recording,
        st.processing
    );
    if !st.transcript.is_empty() {
        println!("transcript: {}", st.transcript);
    }
    if !st.interim.is_empty() {
        println!("interim: {}", st.interim);
    }
    if let Some(product) = &st.current_product {
        println!("product: {} — {} KRW", product.name, product.price);
    }
    if st.confirming {
        println!("confirming add to cart…");
    }
    if let Some(status) = &st.status {
        println!("status: {status}");
    }
    println!(
        "cart: {} item(s), total {} KRW",
        st.cart_count, st.cart_total
    );
}
