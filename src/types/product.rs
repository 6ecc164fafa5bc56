//! Product catalog and enrichment output types

use crate::types::transaction::{LineNumber, ValidatedTransaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog key: product ids are matched exactly and case-sensitively
pub type ProductId = String;

/// One item of the external product catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    /// Price advertised by the catalog, independent of the sale price
    pub catalog_price: Option<Decimal>,
    pub available: bool,
    pub brand: Option<String>,
    pub rating: Option<Decimal>,
}

/// Catalog attributes copied onto an enriched record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttributes {
    pub name: String,
    pub category: String,
    pub brand: Option<String>,
    pub catalog_price: Option<Decimal>,
    pub available: bool,
}

impl From<&ProductEntry> for ProductAttributes {
    fn from(entry: &ProductEntry) -> Self {
        Self {
            name: entry.name.clone(),
            category: entry.category.clone(),
            brand: entry.brand.clone(),
            catalog_price: entry.catalog_price,
            available: entry.available,
        }
    }
}

/// A validated transaction joined against the catalog
///
/// `product` is `None` when the catalog had no entry for the product id.
/// Such records are kept so matched and unmatched revenue stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub line_no: LineNumber,
    pub transaction_id: String,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub region: String,
    pub timestamp: String,
    pub product: Option<ProductAttributes>,
}

impl EnrichedRecord {
    /// Join a transaction with an optional catalog entry
    pub fn new(transaction: &ValidatedTransaction, entry: Option<&ProductEntry>) -> Self {
        Self {
            line_no: transaction.line_no,
            transaction_id: transaction.transaction_id.clone(),
            product_id: transaction.product_id.clone(),
            quantity: transaction.quantity,
            unit_price: transaction.unit_price,
            region: transaction.region.clone(),
            timestamp: transaction.timestamp.clone(),
            product: entry.map(ProductAttributes::from),
        }
    }

    /// Whether a catalog entry was found for this record
    pub fn matched(&self) -> bool {
        self.product.is_some()
    }

    /// Saturating quantity times unit price
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }
}
