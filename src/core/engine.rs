//! Enrichment engine
//!
//! Joins validated transactions against the product catalog. The join is a
//! total function: every transaction yields exactly one `EnrichedRecord`,
//! either carrying the matched product's attributes or explicitly unmatched.
//!
//! Output order is input order and output content depends only on the
//! inputs, so two runs over the same transactions and catalog snapshot
//! produce identical sequences.

use crate::core::catalog::ProductCatalog;
use crate::types::{EnrichedRecord, ValidatedTransaction};
use tracing::debug;

/// Joins transactions against a catalog snapshot
///
/// Borrows the catalog read-only; any number of engines may share it.
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentEngine<'a> {
    catalog: &'a ProductCatalog,
}

impl<'a> EnrichmentEngine<'a> {
    pub fn new(catalog: &'a ProductCatalog) -> Self {
        Self { catalog }
    }

    /// Enrich a single transaction
    ///
    /// Lookup is an exact, case-sensitive match on the product id.
    pub fn enrich_one(&self, transaction: &ValidatedTransaction) -> EnrichedRecord {
        let entry = self.catalog.get(&transaction.product_id);
        if entry.is_none() {
            debug!(
                line = transaction.line_no,
                product_id = %transaction.product_id,
                "no catalog entry"
            );
        }
        EnrichedRecord::new(transaction, entry)
    }

    /// Enrich every transaction, preserving order
    pub fn enrich(&self, transactions: &[ValidatedTransaction]) -> Vec<EnrichedRecord> {
        transactions.iter().map(|tx| self.enrich_one(tx)).collect()
    }
}

/// Convenience wrapper around `EnrichmentEngine::enrich`
pub fn enrich(
    transactions: &[ValidatedTransaction],
    catalog: &ProductCatalog,
) -> Vec<EnrichedRecord> {
    EnrichmentEngine::new(catalog).enrich(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::tests::entry;
    use crate::core::catalog::CatalogBuilder;
    use crate::types::ProductAttributes;
    use rust_decimal::Decimal;

    fn tx(line_no: usize, id: &str, product_id: &str) -> ValidatedTransaction {
        ValidatedTransaction {
            line_no,
            transaction_id: id.to_string(),
            product_id: product_id.to_string(),
            quantity: 5,
            unit_price: Decimal::new(1999, 2),
            region: "North".to_string(),
            timestamp: "2024-01-01".to_string(),
        }
    }

    fn catalog() -> ProductCatalog {
        let mut builder = CatalogBuilder::new();
        builder.add_page(vec![
            entry("P100", "Widget", "Hardware"),
            entry("P200", "Gadget", "Electronics"),
        ]);
        builder.finish().catalog
    }

    #[test]
    fn test_matched_record_carries_attributes() {
        let catalog = catalog();
        let record = EnrichmentEngine::new(&catalog).enrich_one(&tx(1, "TX1", "P100"));

        assert!(record.matched());
        assert_eq!(record.transaction_id, "TX1");
        assert_eq!(record.product_id, "P100");
        assert_eq!(record.quantity, 5);
        assert_eq!(record.unit_price, Decimal::new(1999, 2));
        assert_eq!(record.region, "North");
        assert_eq!(
            record.product,
            Some(ProductAttributes {
                name: "Widget".to_string(),
                category: "Hardware".to_string(),
                brand: None,
                catalog_price: None,
                available: true,
            })
        );
    }

    #[test]
    fn test_unmatched_record_is_kept() {
        let catalog = catalog();
        let record = EnrichmentEngine::new(&catalog).enrich_one(&tx(1, "TX9", "P999"));

        assert!(!record.matched());
        assert_eq!(record.product, None);
        assert_eq!(record.transaction_id, "TX9");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let catalog = catalog();
        let record = EnrichmentEngine::new(&catalog).enrich_one(&tx(1, "TX1", "p100"));
        assert!(!record.matched());
    }

    #[test]
    fn test_enrichment_is_total_and_ordered() {
        let catalog = catalog();
        let transactions = vec![
            tx(3, "TX3", "P200"),
            tx(1, "TX1", "P999"),
            tx(2, "TX2", "P100"),
            tx(4, "TX4", "P100"),
        ];

        let records = enrich(&transactions, &catalog);

        assert_eq!(records.len(), transactions.len());
        let ids: Vec<&str> = records.iter().map(|r| r.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["TX3", "TX1", "TX2", "TX4"]);
        let matched: Vec<bool> = records.iter().map(EnrichedRecord::matched).collect();
        assert_eq!(matched, vec![true, false, true, true]);
    }

    #[test]
    fn test_enrichment_is_idempotent() {
        let catalog = catalog();
        let transactions: Vec<_> = (0..50)
            .map(|i| tx(i, &format!("TX{}", i), if i % 3 == 0 { "P999" } else { "P100" }))
            .collect();

        let first = enrich(&transactions, &catalog);
        let second = enrich(&transactions, &catalog);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_inputs() {
        let empty = ProductCatalog::default();
        assert!(enrich(&[], &empty).is_empty());

        let records = enrich(&[tx(1, "TX1", "P100")], &empty);
        assert_eq!(records.len(), 1);
        assert!(!records[0].matched());
    }
}
