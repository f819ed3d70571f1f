//! Inquiry cart: product id → quantity, bounded by the product's stock.
//!
//! There is no payment step. Submitting compiles the cart into an
//! [`Inquiry`] and empties it.

use crate::record::ProductEntity;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: BTreeMap<i64, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InquiryLine {
    pub product_id: i64,
    pub slug: String,
    pub name: String,
    pub quantity: u32,
    pub stock: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inquiry {
    pub lines: Vec<InquiryLine>,
    pub total_items: u64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit unless the cart already holds the whole stock.
    /// Returns whether the quantity changed.
    pub fn add(&mut self, product: &ProductEntity) -> bool {
        let current = self.quantity(product.id);
        if i64::from(current) >= product.stock {
            return false;
        }
        self.lines.insert(product.id, current + 1);
        true
    }

    /// Removes one unit; the line disappears when it would reach zero.
    pub fn remove(&mut self, product_id: i64) -> bool {
        let Some(qty) = self.lines.get_mut(&product_id) else {
            return false;
        };
        if *qty > 1 {
            *qty -= 1;
        } else {
            self.lines.remove(&product_id);
        }
        true
    }

    pub fn quantity(&self, product_id: i64) -> u32 {
        self.lines.get(&product_id).copied().unwrap_or(0)
    }

    pub fn total_items(&self) -> u64 {
        self.lines.values().map(|&q| u64::from(q)).sum()
    }

    /// Distinct products in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Joins cart lines with the catalog. Ids without a product are skipped;
    /// with duplicate ids the first product in `products` is used.
    pub fn compile_inquiry(&self, products: &[ProductEntity]) -> Inquiry {
        let lines: Vec<InquiryLine> = self
            .lines
            .iter()
            .filter(|(_, qty)| **qty > 0)
            .filter_map(|(&id, &quantity)| {
                products.iter().find(|p| p.id == id).map(|p| InquiryLine {
                    product_id: id,
                    slug: p.slug.clone(),
                    name: p.name.clone(),
                    quantity,
                    stock: p.stock,
                })
            })
            .collect();

        let total_items = lines.iter().map(|l| u64::from(l.quantity)).sum();
        Inquiry { lines, total_items }
    }

    /// Simulated checkout: compile, then empty the cart.
    pub fn submit(&mut self, products: &[ProductEntity]) -> Inquiry {
        let inquiry = self.compile_inquiry(products);
        tracing::info!(lines = inquiry.lines.len(), items = inquiry.total_items, "inquiry submitted");
        self.clear();
        inquiry
    }
}
