//! Product-recommendation collaborator.
//!
//! The core hands a finished utterance to [`RecommendationClient::recommend`]
//! and gets back at most one [`Product`]. [`HttpRecommendationClient`] is the
//! real network implementation; the wire shape lives in
//! [`product`](self::product).

pub mod client;
pub mod product;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{HttpRecommendationClient, RecommendError, RecommendationClient};
pub use product::{ApiProduct, Product};

#[cfg(test)]
pub use client::MockRecommendationClient;
