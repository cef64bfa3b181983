//! cnx-types
//!
//! Shared domain records for the Conectory storefront core:
//! - users, products, orders, creator stats
//! - the [`Cents`] fixed-point money type
//! - the [`StoreError`] taxonomy and its user-facing message mapping
//!
//! Everything here is plain data — no IO, no stores, no business rules.
//! Stores and rules live in the service crates (`cnx-catalog`, `cnx-orders`,
//! `cnx-cart`, `cnx-checkout`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod money;
pub mod error;

pub use error::StoreError;
pub use money::Cents;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// An authenticated storefront user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub is_creator: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// The kind of digital good being sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Ebook,
    Audio,
    Bundle,
    Planner,
    Toolkit,
    Vault,
}

/// Browsing category a product is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Quotes,
    Ebooks,
    Audio,
    Vault,
    Planner,
    Toolkit,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Quotes => "quotes",
            ProductCategory::Ebooks => "ebooks",
            ProductCategory::Audio => "audio",
            ProductCategory::Vault => "vault",
            ProductCategory::Planner => "planner",
            ProductCategory::Toolkit => "toolkit",
        }
    }

    /// Parse a category from its canonical lowercase name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quotes" => Some(ProductCategory::Quotes),
            "ebooks" => Some(ProductCategory::Ebooks),
            "audio" => Some(ProductCategory::Audio),
            "vault" => Some(ProductCategory::Vault),
            "planner" => Some(ProductCategory::Planner),
            "toolkit" => Some(ProductCategory::Toolkit),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable catalog reference data. The cart/checkout core only reads
/// `slug` and `price`; everything else is presentation and creator metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    /// Uniqueness key across the catalog and inside any cart.
    pub slug: String,
    pub description: String,
    /// Unit price in integer cents.
    pub price: Cents,
    pub kind: ProductKind,
    pub category: ProductCategory,
    pub image: String,
    pub download_url: String,
    pub features: Vec<String>,
    pub creator_id: String,
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sales_count: u64,
    /// Average rating on a 0.0–5.0 scale, stored as tenths (e.g. 47 = 4.7)
    /// so product records stay `Eq`-free of floats.
    pub rating_tenths: u8,
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// Lifecycle status of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
            OrderStatus::Refunded => "refunded",
        }
    }
}

/// A server-side record of a completed-or-pending purchase.
///
/// `creator_earnings` is always `amount - platform_fee`; the order service
/// enforces that identity at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub product_id: String,
    pub product_title: String,
    pub product_slug: String,
    pub buyer_id: String,
    pub buyer_email: String,
    pub amount: Cents,
    pub platform_fee: Cents,
    pub creator_earnings: Cents,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub download_url: String,
}

// ---------------------------------------------------------------------------
// CreatorStats
// ---------------------------------------------------------------------------

/// Aggregated dashboard numbers for a single creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorStats {
    pub total_products: usize,
    pub total_sales: usize,
    pub total_earnings: Cents,
    /// Earnings over the trailing 30 days.
    pub monthly_earnings: Cents,
    /// Download count over the trailing 24 hours.
    pub daily_downloads: u64,
}
