//! Decrement-or-delete policy applied when a product is removed.

use serde::Serialize;

use catalog_core::ProductId;

use crate::Product;

/// What a removal request does to a product, decided solely by its stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDisposition {
    /// More than one unit left: keep the product with one unit fewer.
    Decrement { remaining: u32 },
    /// One unit or none: delete the product record.
    Remove,
}

impl StockDisposition {
    pub fn for_stock(stock_count: u32) -> Self {
        if stock_count > 1 {
            Self::Decrement {
                remaining: stock_count - 1,
            }
        } else {
            Self::Remove
        }
    }
}

/// Result of a removal request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RemovalOutcome {
    Decremented { product: Product },
    Deleted { id: ProductId },
}

impl Product {
    pub fn disposition(&self) -> StockDisposition {
        StockDisposition::for_stock(self.stock_count)
    }

    /// The product after a decrement, or `None` when removal deletes it.
    pub fn after_removal(&self) -> Option<Product> {
        match self.disposition() {
            StockDisposition::Decrement { remaining } => Some(Product {
                stock_count: remaining,
                ..self.clone()
            }),
            StockDisposition::Remove => None,
        }
    }
}
