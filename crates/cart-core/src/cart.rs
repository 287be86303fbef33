//! # Cart
//!
//! In-memory shopping cart. Nothing here is persisted; the total is
//! recomputed from the lines on every call.

use crate::amount::Lamports;
use crate::product::Product;
use serde::{Deserialize, Serialize};

/// A line in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product ID
    pub id: String,

    /// Product title (denormalized for display)
    pub title: String,

    /// Unit price
    pub unit_price: Lamports,

    /// Quantity, always at least 1 while the line exists
    pub quantity: u32,
}

impl CartItem {
    /// Create a cart line from a product
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            unit_price: product.price,
            quantity,
        }
    }

    /// Line total
    pub fn total(&self) -> Lamports {
        self.unit_price.times(self.quantity)
    }
}

/// Quantity-adjustable cart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product; increments the quantity when the product is already in the cart.
    /// A zero quantity is ignored.
    pub fn add_product(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem::from_product(product, quantity)),
        }
    }

    /// Set the quantity of a line. Zero or negative removes it.
    ///
    /// Returns false if no line has that id.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line entirely
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Sum of price × quantity over all lines
    pub fn total(&self) -> Lamports {
        self.items.iter().map(CartItem::total).sum()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Total number of units across lines
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
