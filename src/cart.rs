//! Cart service — line items and derived totals.
//!
//! An explicitly owned, injectable service rather than ambient shared state:
//! the orchestrator holds the one instance and mutates it in response to
//! confirmed voice commands. Adding a product that is already in the cart
//! increments its quantity; removing decrements and drops the line at zero.

use crate::recommend::Product;

// ---------------------------------------------------------------------------
// CartLine
// ---------------------------------------------------------------------------

/// One product in the cart with its quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

// ---------------------------------------------------------------------------
// CartService
// ---------------------------------------------------------------------------

/// The shopping cart.
#[derive(Debug, Default)]
pub struct CartService {
    lines: Vec<CartLine>,
}

impl CartService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`. An existing line is incremented; otherwise
    /// a new line with quantity 1 is appended.
    pub fn add(&mut self, product: Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine {
                product,
                quantity: 1,
            });
        }
    }

    /// Remove one unit of the product. The line is dropped when its quantity
    /// reaches zero. Unknown ids are ignored.
    pub fn remove(&mut self, product_id: &str) {
        if let Some(pos) = self.lines.iter().position(|l| l.product.id == product_id) {
            if self.lines[pos].quantity > 1 {
                self.lines[pos].quantity -= 1;
            } else {
                self.lines.remove(pos);
            }
        }
    }

    /// Set a line's quantity outright. A quantity below 1 removes the line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity < 1 {
            self.lines.retain(|l| l.product.id != product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) {
            line.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn items(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of price × quantity across all lines, in KRW.
    pub fn total_price(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.product.price * l.quantity as f64)
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
