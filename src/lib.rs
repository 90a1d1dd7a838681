//! Voice-driven shopping core.
//!
//! The user speaks a request, the speech engine streams transcription events,
//! the session controller segments them into utterances, and the shop
//! orchestrator turns a finished utterance into a product-recommendation
//! request — or, when a trigger phrase is heard, into an add-to-cart
//! confirmation or a cart view switch.
//!
//! # Architecture
//!
//! ```text
//! SpeechRecognizer ──RecognizerEvent──▶ VoiceSessionController
//!        ▲                                     │ SessionEvent
//!        │ start()/stop()                      ▼
//!        └───────SessionCommand────── ShopOrchestrator ──▶ RecommendationClient
//!                                              │               CartService
//!                          ControlEvent ───────┘
//!                          (mic tap / drag)
//! ```
//!
//! Two tokio tasks carry the whole interaction loop:
//!
//! * [`session::VoiceSessionController`] — recording lifecycle, transcript
//!   accumulation, silence-based utterance segmentation, voice-command
//!   detection, engine auto-restart.
//! * [`shop::ShopOrchestrator`] — view selection (voice / product / cart),
//!   the fetch and add-to-cart workflows, and the mic-tap entry point.
//!
//! Everything else (`speech`, `command`, `recommend`, `cart`, `config`) is a
//! leaf collaborator behind a narrow interface.

pub mod cart;
pub mod command;
pub mod config;
pub mod recommend;
pub mod session;
pub mod shop;
pub mod speech;
