//! Product catalog lookup
//!
//! The catalog is assembled page by page into a `CatalogBuilder` and only
//! handed out as an immutable `ProductCatalog` once every page is in. Nothing
//! outside this module ever sees a partially built catalog.
//!
//! # Duplicate Keys
//!
//! If the same product id appears more than once (within a page or across
//! pages), the last occurrence wins and a `CatalogWarning::DuplicateProduct`
//! is recorded. Duplicates are not fatal.

use crate::core::traits::CatalogSource;
use crate::types::{CatalogError, ProductEntry, ProductId};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Product id as sent by the service: string or number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(u64),
}

impl WireId {
    fn into_key(self) -> ProductId {
        match self {
            WireId::Text(s) => s.trim().to_string(),
            WireId::Number(n) => n.to_string(),
        }
    }
}

/// One product as it appears in a catalog page
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPayload {
    id: WireId,
    #[serde(alias = "title")]
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    available: Option<bool>,
    #[serde(default)]
    stock: Option<i64>,
    #[serde(default, rename = "availabilityStatus")]
    availability_status: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    rating: Option<Decimal>,
}

impl ProductPayload {
    /// Availability: explicit flag, else stock level, else status text, else available
    fn is_available(&self) -> bool {
        if let Some(flag) = self.available {
            return flag;
        }
        if let Some(stock) = self.stock {
            return stock > 0;
        }
        if let Some(status) = &self.availability_status {
            return !status.trim().eq_ignore_ascii_case("out of stock");
        }
        true
    }

    pub fn into_entry(self) -> ProductEntry {
        let available = self.is_available();
        ProductEntry {
            product_id: self.id.into_key(),
            name: self.name,
            category: self.category,
            catalog_price: self.price,
            available,
            brand: self.brand.filter(|b| !b.trim().is_empty()),
            rating: self.rating,
        }
    }
}

/// One page of the paginated catalog endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPage {
    pub products: Vec<ProductPayload>,
    /// Total number of products across all pages, if the service reports it
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub skip: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Non-fatal observations made while building the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum CatalogWarning {
    /// A product id was seen again; the later entry replaced the earlier one
    DuplicateProduct {
        product_id: ProductId,
        /// 1-based page index where the replacing entry was found
        page: usize,
    },
    /// Pagination stopped at the configured page limit
    PageLimitReached { pages: usize },
}

impl std::fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogWarning::DuplicateProduct { product_id, page } => write!(
                f,
                "duplicate product id '{}' on page {}, keeping last seen",
                product_id, page
            ),
            CatalogWarning::PageLimitReached { pages } => {
                write!(f, "stopped after {} pages (page limit)", pages)
            }
        }
    }
}

/// Immutable, run-scoped lookup from product id to product entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCatalog {
    entries: HashMap<ProductId, ProductEntry>,
}

impl ProductCatalog {
    /// Exact, case-sensitive lookup
    pub fn get(&self, product_id: &str) -> Option<&ProductEntry> {
        self.entries.get(product_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A fully built catalog together with the warnings raised while building it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub catalog: ProductCatalog,
    pub warnings: Vec<CatalogWarning>,
}

/// Accumulates catalog pages; the only way to obtain a `CatalogSnapshot`
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: HashMap<ProductId, ProductEntry>,
    warnings: Vec<CatalogWarning>,
    pages: usize,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages added so far
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Add one page of entries, last-seen-wins on duplicate ids
    pub fn add_page<I>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = ProductEntry>,
    {
        self.pages += 1;
        for entry in entries {
            let product_id = entry.product_id.clone();
            if self.entries.insert(product_id.clone(), entry).is_some() {
                let warning = CatalogWarning::DuplicateProduct {
                    product_id,
                    page: self.pages,
                };
                warn!(%warning, "catalog duplicate");
                self.warnings.push(warning);
            }
        }
        self
    }

    pub fn warn(&mut self, warning: CatalogWarning) -> &mut Self {
        warn!(%warning, "catalog warning");
        self.warnings.push(warning);
        self
    }

    pub fn finish(self) -> CatalogSnapshot {
        CatalogSnapshot {
            catalog: ProductCatalog {
                entries: self.entries,
            },
            warnings: self.warnings,
        }
    }
}

/// In-memory catalog source
///
/// Returns the same snapshot on every call. Pages are replayed through a
/// `CatalogBuilder`, so duplicate handling matches the network client.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    pages: Vec<Vec<ProductEntry>>,
}

impl StaticCatalogSource {
    /// A single-page catalog
    pub fn new(entries: Vec<ProductEntry>) -> Self {
        Self {
            pages: vec![entries],
        }
    }

    pub fn from_pages(pages: Vec<Vec<ProductEntry>>) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch(&self) -> Result<CatalogSnapshot, CatalogError> {
        let mut builder = CatalogBuilder::new();
        for page in &self.pages {
            builder.add_page(page.iter().cloned());
        }
        Ok(builder.finish())
    }

    fn describe(&self) -> String {
        format!("in-memory catalog ({} page(s))", self.pages.len())
    }
}

/// Either a bare product array or a page object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Products(Vec<ProductPayload>),
    Page(CatalogPage),
}

/// Catalog read from a JSON file on disk
///
/// Accepts the same product shape as the service, either as a bare array
/// or wrapped in a page object.
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse a catalog document from JSON text
    pub fn parse(json: &str) -> Result<Vec<ProductEntry>, CatalogError> {
        let document: CatalogDocument =
            serde_json::from_str(json).map_err(|e| CatalogError::InvalidPayload {
                message: e.to_string(),
            })?;
        let products = match document {
            CatalogDocument::Products(products) => products,
            CatalogDocument::Page(page) => page.products,
        };
        Ok(products.into_iter().map(ProductPayload::into_entry).collect())
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch(&self) -> Result<CatalogSnapshot, CatalogError> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CatalogError::Unavailable {
                attempts: 1,
                last_error: format!("{}: {}", self.path.display(), e),
            })?;
        let entries = Self::parse(&json)?;

        let mut builder = CatalogBuilder::new();
        builder.add_page(entries);
        let snapshot = builder.finish();
        info!(
            path = %self.path.display(),
            products = snapshot.catalog.len(),
            "loaded catalog file"
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("catalog file {}", self.path.display())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub(crate) fn entry(id: &str, name: &str, category: &str) -> ProductEntry {
        ProductEntry {
            product_id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            catalog_price: None,
            available: true,
            brand: None,
            rating: None,
        }
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let mut builder = CatalogBuilder::new();
        builder.add_page(vec![entry("P100", "Widget", "Hardware")]);
        let snapshot = builder.finish();

        assert_eq!(snapshot.catalog.get("P100").map(|e| e.name.as_str()), Some("Widget"));
        assert!(snapshot.catalog.get("p100").is_none());
        assert!(snapshot.catalog.get("P100 ").is_none());
        assert!(snapshot.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_across_pages_last_seen_wins() {
        let mut builder = CatalogBuilder::new();
        builder
            .add_page(vec![entry("P1", "Old", "A"), entry("P2", "Other", "B")])
            .add_page(vec![entry("P1", "New", "C")]);
        let snapshot = builder.finish();

        assert_eq!(snapshot.catalog.len(), 2);
        let p1 = snapshot.catalog.get("P1").unwrap();
        assert_eq!(p1.name, "New");
        assert_eq!(p1.category, "C");
        assert_eq!(
            snapshot.warnings,
            vec![CatalogWarning::DuplicateProduct {
                product_id: "P1".to_string(),
                page: 2
            }]
        );
    }

    #[test]
    fn test_duplicate_within_page() {
        let mut builder = CatalogBuilder::new();
        builder.add_page(vec![entry("P1", "First", "A"), entry("P1", "Second", "A")]);
        let snapshot = builder.finish();

        assert_eq!(snapshot.catalog.get("P1").unwrap().name, "Second");
        assert_eq!(snapshot.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_static_source_replays_pages() {
        let source = StaticCatalogSource::from_pages(vec![
            vec![entry("P1", "Old", "A")],
            vec![entry("P1", "New", "A")],
        ]);

        let first = source.fetch().await.unwrap();
        let second = source.fetch().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.catalog.get("P1").unwrap().name, "New");
        assert_eq!(first.warnings.len(), 1);
    }

    #[rstest]
    #[case::explicit_flag(r#"{"id": 1, "name": "A", "available": false, "stock": 10}"#, false)]
    #[case::stock(r#"{"id": 1, "name": "A", "stock": 0}"#, false)]
    #[case::positive_stock(r#"{"id": 1, "name": "A", "stock": 4}"#, true)]
    #[case::status(r#"{"id": 1, "name": "A", "availabilityStatus": "Out of Stock"}"#, false)]
    #[case::low_stock_status(r#"{"id": 1, "name": "A", "availabilityStatus": "Low Stock"}"#, true)]
    #[case::nothing(r#"{"id": 1, "name": "A"}"#, true)]
    fn test_availability(#[case] json: &str, #[case] expected: bool) {
        let payload: ProductPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.into_entry().available, expected);
    }

    #[test]
    fn test_payload_conversion() {
        let json = r#"{
            "id": 101,
            "title": "Essence Mascara",
            "category": "beauty",
            "price": 9.99,
            "brand": "Essence",
            "rating": 4.94,
            "stock": 5
        }"#;
        let payload: ProductPayload = serde_json::from_str(json).unwrap();
        let entry = payload.into_entry();

        assert_eq!(entry.product_id, "101");
        assert_eq!(entry.name, "Essence Mascara");
        assert_eq!(entry.category, "beauty");
        assert_eq!(entry.catalog_price, Some(Decimal::new(999, 2)));
        assert_eq!(entry.brand.as_deref(), Some("Essence"));
        assert!(entry.available);
    }

    #[rstest]
    #[case::array(r#"[{"id": "P100", "name": "Widget", "category": "Hardware"}]"#)]
    #[case::page(r#"{"products": [{"id": "P100", "name": "Widget", "category": "Hardware"}], "total": 1}"#)]
    fn test_file_document_shapes(#[case] json: &str) {
        let entries = FileCatalogSource::parse(json).unwrap();
        assert_eq!(entries, vec![entry("P100", "Widget", "Hardware")]);
    }

    #[test]
    fn test_file_invalid_json() {
        assert!(matches!(
            FileCatalogSource::parse("{not json"),
            Err(CatalogError::InvalidPayload { .. })
        ));
    }

    #[tokio::test]
    async fn test_file_source_fetch() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "P1", "name": "A", "category": "X"}}, {{"id": "P1", "name": "B", "category": "X"}}]"#
        )
        .unwrap();

        let snapshot = FileCatalogSource::new(file.path()).fetch().await.unwrap();
        assert_eq!(snapshot.catalog.get("P1").unwrap().name, "B");
        assert_eq!(snapshot.warnings.len(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_file_source_reads_alongside_other_tasks() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "P1", "name": "A", "category": "X"}}]"#).unwrap();
        let source = FileCatalogSource::new(file.path());

        let (first, second) = tokio::join!(source.fetch(), source.fetch());

        assert_eq!(first.unwrap().catalog.len(), 1);
        assert_eq!(second.unwrap().catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_unavailable() {
        let result = FileCatalogSource::new("no-such-catalog.json").fetch().await;
        assert!(matches!(result, Err(CatalogError::Unavailable { .. })));
    }
}
