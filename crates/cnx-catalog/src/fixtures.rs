//! Fixture products for the mock storefront.
//!
//! Two fixture creators, six products spread across every category. Prices,
//! sales counts and ratings are chosen so featured/trending orderings are
//! unambiguous in tests.

use chrono::Utc;
use cnx_types::{Cents, Product, ProductCategory, ProductKind};

const AVA: (&str, &str) = ("usr-ava", "Ava Moreno");
const KAI: (&str, &str) = ("usr-kai", "Kai Tanaka");

struct Seed {
    slug: &'static str,
    title: &'static str,
    description: &'static str,
    price: i64,
    kind: ProductKind,
    category: ProductCategory,
    features: &'static [&'static str],
    creator: (&'static str, &'static str),
    sales_count: u64,
    rating_tenths: u8,
}

const SEEDS: &[Seed] = &[
    Seed {
        slug: "deep-work-planner",
        title: "Deep Work Planner",
        description: "A 12-week printable planner for distraction-free focus blocks.",
        price: 2_000,
        kind: ProductKind::Planner,
        category: ProductCategory::Planner,
        features: &["12 weekly layouts", "habit tracker", "A4 + letter PDFs"],
        creator: AVA,
        sales_count: 320,
        rating_tenths: 47,
    },
    Seed {
        slug: "creator-toolkit",
        title: "Creator Toolkit",
        description: "Templates, contracts and launch checklists for solo creators.",
        price: 3_200,
        kind: ProductKind::Toolkit,
        category: ProductCategory::Toolkit,
        features: &["30+ templates", "launch checklist", "pricing worksheet"],
        creator: KAI,
        sales_count: 540,
        rating_tenths: 49,
    },
    Seed {
        slug: "mindset-audio-pack",
        title: "Mindset Audio Pack",
        description: "Six guided audio sessions for deep-focus warmups.",
        price: 1_500,
        kind: ProductKind::Audio,
        category: ProductCategory::Audio,
        features: &["6 sessions", "offline mp3 downloads"],
        creator: AVA,
        sales_count: 210,
        rating_tenths: 44,
    },
    Seed {
        slug: "founders-quote-vault",
        title: "Founders Quote Vault",
        description: "A curated vault of 500 sourced quotes from company builders.",
        price: 900,
        kind: ProductKind::Vault,
        category: ProductCategory::Quotes,
        features: &["500 quotes", "CSV + Notion export"],
        creator: KAI,
        sales_count: 120,
        rating_tenths: 41,
    },
    Seed {
        slug: "indie-marketing-ebook",
        title: "Indie Marketing Playbook",
        description: "An ebook on zero-budget marketing loops for indie products.",
        price: 2_400,
        kind: ProductKind::Ebook,
        category: ProductCategory::Ebooks,
        features: &["180 pages", "case studies", "epub + pdf"],
        creator: AVA,
        sales_count: 460,
        rating_tenths: 46,
    },
    Seed {
        slug: "launch-day-bundle",
        title: "Launch Day Bundle",
        description: "Everything from the vault plus the toolkit, bundled for launch week.",
        price: 5_600,
        kind: ProductKind::Bundle,
        category: ProductCategory::Vault,
        features: &["toolkit included", "quote vault included", "bonus worksheets"],
        creator: KAI,
        sales_count: 75,
        rating_tenths: 43,
    },
];

/// The storefront's fixture products.
pub fn seed_products() -> Vec<Product> {
    let now = Utc::now();
    SEEDS
        .iter()
        .map(|seed| Product {
            id: format!("prd-{}", seed.slug),
            title: seed.title.to_string(),
            slug: seed.slug.to_string(),
            description: seed.description.to_string(),
            price: Cents::new(seed.price),
            kind: seed.kind,
            category: seed.category,
            image: format!("/images/products/{}.png", seed.slug),
            download_url: format!("/downloads/{}.zip", seed.slug),
            features: seed.features.iter().map(|f| f.to_string()).collect(),
            creator_id: seed.creator.0.to_string(),
            creator_name: seed.creator.1.to_string(),
            created_at: now,
            updated_at: now,
            sales_count: seed.sales_count,
            rating_tenths: seed.rating_tenths,
        })
        .collect()
}
