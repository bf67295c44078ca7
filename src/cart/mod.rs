//! Shopping cart and checkout preview totals.

use serde::{Deserialize, Serialize};

use crate::resources::Product;
use crate::store::RecordId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: RecordId,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl CartItem {
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Adding a product already in the cart raises its quantity.
    /// Products without a backend id cannot be added.
    pub fn add(&mut self, product: &Product, quantity: u32) -> bool {
        let Some(product_id) = product.id.clone() else {
            return false;
        };
        let quantity = quantity.max(1);
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem {
                product_id,
                name: product.name.clone(),
                price: product.price,
                quantity,
            }),
        }
        true
    }

    pub fn set_quantity(&mut self, product_id: &RecordId, quantity: u32) {
        if let Some(item) = self.items.iter_mut().find(|i| &i.product_id == product_id) {
            item.quantity = quantity.max(1);
        }
    }

    pub fn remove(&mut self, product_id: &RecordId) {
        self.items.retain(|i| &i.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Saturates at `u32::MAX`.
    pub fn item_count(&self) -> u32 {
        self.items.iter().fold(0u32, |n, i| n.saturating_add(i.quantity))
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
