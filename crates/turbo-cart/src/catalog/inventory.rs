//! Stock level records.

use serde::{Deserialize, Serialize};

/// Stock level for a product, as reported by the stock service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StockRecord {
    /// Maximum quantity a cart may hold.
    pub amount: i64,
}

impl StockRecord {
    /// Create a stock record.
    pub fn new(amount: i64) -> Self {
        Self { amount }
    }

    /// Check if a specific amount is available.
    pub fn can_fulfill(&self, amount: i64) -> bool {
        amount <= self.amount
    }

    /// Check if out of stock.
    pub fn is_out_of_stock(&self) -> bool {
        self.amount <= 0
    }
}
