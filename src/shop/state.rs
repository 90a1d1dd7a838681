//! View state and the shared shop snapshot.
//!
//! [`ViewState`] selects the active screen. [`ShopState`] is the single
//! source of truth a UI reads each frame: flags mirrored from the session
//! controller, the displayed product, the user-facing status slot and the
//! cart summary.
//!
//! [`SharedShopState`] is a type alias for `Arc<Mutex<ShopState>>` — cheap to
//! clone and safe to share across threads.

use std::sync::{Arc, Mutex};

use crate::recommend::Product;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// The active screen.
///
/// ```text
/// Voice ──fetch success──▶ Product ──add confirmed──▶ Voice
/// any   ──cart command / cart tap──▶ Cart ──mic tap──▶ Voice
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Idle / listening screen with the microphone control.
    #[default]
    Voice,
    /// A fetched product awaiting confirmation.
    Product,
    /// The cart contents.
    Cart,
}

impl ViewState {
    /// A short human-readable label suitable for log lines and the demo REPL.
    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Voice => "voice",
            ViewState::Product => "product",
            ViewState::Cart => "cart",
        }
    }
}

// ---------------------------------------------------------------------------
// ShopState
// ---------------------------------------------------------------------------

/// Shared application snapshot — everything a UI needs to render.
///
/// The orchestrator mutates it; readers lock briefly and copy out what they
/// need. Do not hold the lock across `.await` points.
#[derive(Debug, Clone, Default)]
pub struct ShopState {
    /// The active screen.
    pub view: ViewState,

    /// Mirrors of the session controller's flags.
    pub listening: bool,
    pub recording: bool,
    pub processing: bool,

    /// Accumulated final transcript for the current utterance.
    pub transcript: String,
    /// Provisional interim text, replaced in place.
    pub interim: String,

    /// The product currently displayed for confirmation.
    pub current_product: Option<Product>,

    /// `true` while the add-to-cart acknowledgment is showing.
    pub confirming: bool,

    /// User-facing status slot: errors and the "no products found" message.
    /// Last write wins.
    pub status: Option<String>,

    /// Cart summary, refreshed after every cart mutation.
    pub cart_count: u32,
    pub cart_total: f64,
}

impl ShopState {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// SharedShopState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`ShopState`].
pub type SharedShopState = Arc<Mutex<ShopState>>;

/// Construct a new [`SharedShopState`] wrapping a default [`ShopState`].
pub fn new_shared_shop_state() -> SharedShopState {
    Arc::new(Mutex::new(ShopState::new()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
