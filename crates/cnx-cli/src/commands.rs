//! Command bodies for the `cnx` binary.

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;
use uuid::Uuid;

use cnx_analytics::{verify_chain, ChainStatus, EventLog};
use cnx_auth::SessionStore;
use cnx_cart::CartLedger;
use cnx_catalog::{Catalog, CatalogQuery};
use cnx_checkout::{CheckoutPolicy, CheckoutSequencer, Navigator, NoopTracker, PurchaseTracker};
use cnx_config::{load_layered_yaml, StoreConfig};
use cnx_orders::{OrderStore, SimulatedLatency};
use cnx_types::{Product, ProductCategory};

// ---------------------------------------------------------------------------
// Catalog commands
// ---------------------------------------------------------------------------

pub fn catalog_list(
    category: Option<&str>,
    search: Option<String>,
    page: usize,
    limit: usize,
) -> Result<()> {
    let category = match category {
        Some(raw) => Some(
            ProductCategory::parse(raw).ok_or_else(|| anyhow!("unknown category '{raw}'"))?,
        ),
        None => None,
    };

    let catalog = Catalog::with_fixtures();
    let result = catalog.list(&CatalogQuery {
        category,
        search,
        page,
        limit,
    });

    for product in &result.products {
        println!(
            "{:<24} ${:>8}  {:<8} {}",
            product.slug, product.price, product.category, product.title
        );
    }
    println!(
        "page {} — {} of {} match(es){}",
        result.page,
        result.products.len(),
        result.total_matches,
        if result.has_more { ", more available" } else { "" }
    );
    Ok(())
}

pub fn catalog_show(slug: &str) -> Result<()> {
    let catalog = Catalog::with_fixtures();
    let product = catalog
        .get(slug)
        .ok_or_else(|| anyhow!("no product with slug '{slug}'"))?;
    print_product(product);
    Ok(())
}

pub fn catalog_featured() -> Result<()> {
    let catalog = Catalog::with_fixtures();
    for product in catalog.featured(3) {
        println!(
            "{:<24} rating {}.{}  {}",
            product.slug,
            product.rating_tenths / 10,
            product.rating_tenths % 10,
            product.title
        );
    }
    Ok(())
}

pub fn catalog_trending() -> Result<()> {
    let catalog = Catalog::with_fixtures();
    for product in catalog.trending(3) {
        println!(
            "{:<24} {:>5} sold  {}",
            product.slug, product.sales_count, product.title
        );
    }
    Ok(())
}

fn print_product(product: &Product) {
    println!("{} — ${}", product.title, product.price);
    println!("slug:     {}", product.slug);
    println!("category: {}", product.category);
    println!("creator:  {}", product.creator_name);
    println!("{}", product.description);
    for feature in &product.features {
        println!("  - {feature}");
    }
}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

/// Navigator for the terminal: prints where the web UI would redirect.
struct PrintingNavigator;

impl Navigator for PrintingNavigator {
    fn redirect(&mut self, path: &str) {
        info!(path, "redirect");
        println!("→ {path}");
    }
}

pub fn checkout(
    email: &str,
    password: &str,
    items: &[String],
    config_paths: &[String],
    all_or_nothing: bool,
    events: Option<&str>,
) -> Result<()> {
    let mut config = load_store_config(config_paths)?;
    if all_or_nothing {
        config.policy = CheckoutPolicy::AllOrNothing;
    }

    let mut session = SessionStore::new();
    let user = session
        .login(email, password)
        .map_err(|err| anyhow!("login failed: {err}"))?
        .clone();
    info!(user_id = %user.id, email = %user.email, "session started");

    let catalog = Catalog::with_fixtures();
    let mut cart = CartLedger::with_policies(config.fees, config.limits);
    for raw in items {
        let (slug, qty) = parse_item(raw)?;
        let product = catalog
            .get(&slug)
            .cloned()
            .ok_or_else(|| anyhow!("no product with slug '{slug}'"))?;
        cart.add(product, qty)
            .with_context(|| format!("could not add '{slug}' to the cart"))?;
    }

    let totals = cart.totals();
    println!(
        "cart: {} item(s), subtotal ${}, platform fee ${}, total ${}",
        cart.item_count(),
        totals.subtotal,
        totals.platform_fee,
        totals.total
    );

    let tracker: Box<dyn PurchaseTracker> = match events {
        Some(path) => Box::new(
            EventLog::new(path, Uuid::new_v4(), true).context("open analytics trail")?,
        ),
        None => Box::new(NoopTracker),
    };

    let orders_api = OrderStore::with_policies(
        catalog,
        config.fees,
        SimulatedLatency::from_millis(config.latency_ms),
    );
    let mut sequencer =
        CheckoutSequencer::with_policy(orders_api, tracker, PrintingNavigator, config.policy);

    match sequencer.process_checkout(Some(&user), &mut cart) {
        Ok(orders) => {
            for order in &orders {
                println!(
                    "{}  {:<24} ${:>8}  {}",
                    order.id,
                    order.product_slug,
                    order.amount,
                    order.status.as_str()
                );
            }
            println!("{} order(s) created", orders.len());
            Ok(())
        }
        Err(err) => {
            info!(error = %err, "checkout refused");
            bail!("{}", err.user_message())
        }
    }
}

fn load_store_config(paths: &[String]) -> Result<StoreConfig> {
    if paths.is_empty() {
        return Ok(StoreConfig::default());
    }
    let refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = load_layered_yaml(&refs)?;
    info!(config_hash = %loaded.config_hash, "config loaded");
    StoreConfig::from_loaded(&loaded)
}

/// Parse `slug` or `slug:qty`.
fn parse_item(raw: &str) -> Result<(String, u32)> {
    match raw.split_once(':') {
        Some((slug, qty)) => {
            let qty: u32 = qty
                .parse()
                .with_context(|| format!("bad quantity in item '{raw}'"))?;
            Ok((slug.to_string(), qty))
        }
        None => Ok((raw.to_string(), 1)),
    }
}

// ---------------------------------------------------------------------------
// Config / events
// ---------------------------------------------------------------------------

pub fn config_hash(paths: &[String]) -> Result<()> {
    let refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = load_layered_yaml(&refs)?;
    println!("config_hash: {}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    Ok(())
}

pub fn events_verify(path: &str) -> Result<()> {
    match verify_chain(path)? {
        ChainStatus::Valid { events } => {
            println!("chain OK ({events} event(s))");
            Ok(())
        }
        ChainStatus::Broken { line, reason } => {
            bail!("chain BROKEN at line {line}: {reason}")
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
