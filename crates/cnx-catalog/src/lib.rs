//! Deterministic in-memory product catalog.
//!
//! Design decisions (kept intentionally simple/deterministic):
//! - Products are keyed by slug in a `BTreeMap`, so every listing walks in
//!   stable slug order.
//! - Search is case-insensitive substring match over title + description.
//! - Pagination is 1-based with a default page size of 12.
//! - Featured ranks by rating, trending by sales count; ties break on slug.
//! - No IO and no clock beyond the timestamps already on the records.
//!
//! The cart/checkout core treats products as immutable reference data; this
//! crate is the only place they are created or listed.

use std::collections::BTreeMap;

use cnx_types::{Product, ProductCategory};

mod fixtures;

pub use fixtures::seed_products;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Slugs are the catalog key and must be unique.
    DuplicateSlug { slug: String },
    /// Slug must be non-empty.
    EmptySlug,
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::DuplicateSlug { slug } => {
                write!(f, "catalog invariant: duplicate slug '{slug}'")
            }
            CatalogError::EmptySlug => write!(f, "catalog invariant: slug must not be empty"),
        }
    }
}

impl std::error::Error for CatalogError {}

// ---------------------------------------------------------------------------
// Query / page
// ---------------------------------------------------------------------------

/// Browse filter. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: Option<ProductCategory>,
    pub search: Option<String>,
    pub page: usize,
    pub limit: usize,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            page: 1,
            limit: 12,
        }
    }
}

/// One page of browse results.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    /// Matches across all pages, before pagination.
    pub total_matches: usize,
    pub page: usize,
    pub has_more: bool,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// In-memory catalog store keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: BTreeMap<String, Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-seeded with the storefront's fixture products.
    pub fn with_fixtures() -> Self {
        let mut catalog = Self::new();
        for product in seed_products() {
            // Fixture slugs are unique by construction.
            let _ = catalog.insert(product);
        }
        catalog
    }

    /// Insert a product. Rejects empty or duplicate slugs.
    pub fn insert(&mut self, product: Product) -> Result<(), CatalogError> {
        if product.slug.trim().is_empty() {
            return Err(CatalogError::EmptySlug);
        }
        if self.products.contains_key(&product.slug) {
            return Err(CatalogError::DuplicateSlug {
                slug: product.slug.clone(),
            });
        }
        self.products.insert(product.slug.clone(), product);
        Ok(())
    }

    pub fn get(&self, slug: &str) -> Option<&Product> {
        self.products.get(slug)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// All products in slug order.
    pub fn all(&self) -> Vec<Product> {
        self.products.values().cloned().collect()
    }

    /// Products owned by a creator, in slug order.
    pub fn by_creator(&self, creator_id: &str) -> Vec<Product> {
        self.products
            .values()
            .filter(|p| p.creator_id == creator_id)
            .cloned()
            .collect()
    }

    /// Filtered, paginated browse listing.
    pub fn list(&self, query: &CatalogQuery) -> CatalogPage {
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let matches: Vec<&Product> = self
            .products
            .values()
            .filter(|p| query.category.map_or(true, |c| p.category == c))
            .filter(|p| match &needle {
                Some(needle) => {
                    p.title.to_lowercase().contains(needle)
                        || p.description.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect();

        let total_matches = matches.len();
        let page = query.page.max(1);
        let limit = query.limit.max(1);
        let start = (page - 1).saturating_mul(limit);

        let products: Vec<Product> = matches
            .into_iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect();
        let has_more = start + products.len() < total_matches;

        CatalogPage {
            products,
            total_matches,
            page,
            has_more,
        }
    }

    /// Highest-rated products, ties broken by slug order.
    pub fn featured(&self, limit: usize) -> Vec<Product> {
        let mut ranked = self.all();
        ranked.sort_by(|a, b| b.rating_tenths.cmp(&a.rating_tenths).then(a.slug.cmp(&b.slug)));
        ranked.truncate(limit);
        ranked
    }

    /// Best-selling products, ties broken by slug order.
    pub fn trending(&self, limit: usize) -> Vec<Product> {
        let mut ranked = self.all();
        ranked.sort_by(|a, b| b.sales_count.cmp(&a.sales_count).then(a.slug.cmp(&b.slug)));
        ranked.truncate(limit);
        ranked
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_seed_a_nonempty_catalog() {
        let catalog = Catalog::with_fixtures();
        assert!(catalog.len() >= 6);
        assert!(catalog.get("deep-work-planner").is_some());
    }

    #[test]
    fn insert_rejects_duplicate_slug() {
        let mut catalog = Catalog::with_fixtures();
        let existing = catalog.get("deep-work-planner").cloned().unwrap();
        let err = catalog.insert(existing);
        assert_eq!(
            err,
            Err(CatalogError::DuplicateSlug {
                slug: "deep-work-planner".to_string()
            })
        );
    }

    #[test]
    fn get_unknown_slug_is_none() {
        let catalog = Catalog::with_fixtures();
        assert!(catalog.get("no-such-product").is_none());
    }

    #[test]
    fn category_filter_narrows_listing() {
        let catalog = Catalog::with_fixtures();
        let page = catalog.list(&CatalogQuery {
            category: Some(ProductCategory::Audio),
            ..CatalogQuery::default()
        });
        assert!(!page.products.is_empty());
        assert!(page
            .products
            .iter()
            .all(|p| p.category == ProductCategory::Audio));
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let catalog = Catalog::with_fixtures();
        let page = catalog.list(&CatalogQuery {
            search: Some("PLANNER".to_string()),
            ..CatalogQuery::default()
        });
        assert!(page.products.iter().any(|p| p.slug == "deep-work-planner"));
    }

    #[test]
    fn blank_search_matches_everything() {
        let catalog = Catalog::with_fixtures();
        let page = catalog.list(&CatalogQuery {
            search: Some("   ".to_string()),
            ..CatalogQuery::default()
        });
        assert_eq!(page.total_matches, catalog.len());
    }

    #[test]
    fn pagination_splits_and_flags_more() {
        let catalog = Catalog::with_fixtures();
        let total = catalog.len();
        let first = catalog.list(&CatalogQuery {
            limit: 2,
            ..CatalogQuery::default()
        });
        assert_eq!(first.products.len(), 2);
        assert_eq!(first.total_matches, total);
        assert!(first.has_more);

        let last_page = total.div_ceil(2);
        let last = catalog.list(&CatalogQuery {
            page: last_page,
            limit: 2,
            ..CatalogQuery::default()
        });
        assert!(!last.has_more);
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let catalog = Catalog::with_fixtures();
        let page = catalog.list(&CatalogQuery {
            page: 99,
            limit: 12,
            ..CatalogQuery::default()
        });
        assert!(page.products.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn featured_ranks_by_rating() {
        let catalog = Catalog::with_fixtures();
        let featured = catalog.featured(3);
        assert_eq!(featured.len(), 3);
        assert!(featured[0].rating_tenths >= featured[1].rating_tenths);
        assert!(featured[1].rating_tenths >= featured[2].rating_tenths);
    }

    #[test]
    fn trending_ranks_by_sales() {
        let catalog = Catalog::with_fixtures();
        let trending = catalog.trending(3);
        assert!(trending[0].sales_count >= trending[1].sales_count);
        assert!(trending[1].sales_count >= trending[2].sales_count);
    }

    #[test]
    fn listing_order_is_stable_across_calls() {
        let catalog = Catalog::with_fixtures();
        let a = catalog.list(&CatalogQuery::default());
        let b = catalog.list(&CatalogQuery::default());
        assert_eq!(a, b);
    }
}
