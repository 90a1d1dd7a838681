//! View orchestration.
//!
//! Consumes session events and user-surface control events, owns the active
//! [`ViewState`] and the cart, and performs the two side-effecting workflows:
//! the recommendation fetch and the add-to-cart confirmation. A UI renders
//! from the [`SharedShopState`] snapshot.

pub mod orchestrator;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use orchestrator::{ControlEvent, DragDirection, ShopOrchestrator};
pub use state::{new_shared_shop_state, SharedShopState, ShopState, ViewState};
