//! cnx — the Conectory storefront core CLI.
//!
//! This file is intentionally thin: it sets up tracing and declares the
//! command surface. All command bodies live in `commands.rs`.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cnx")]
#[command(about = "Conectory storefront core CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the fixture catalog
    Catalog {
        #[command(subcommand)]
        cmd: CatalogCmd,
    },

    /// Run a one-shot checkout against the in-memory storefront
    Checkout {
        /// Email for the mock session
        #[arg(long)]
        email: String,

        /// Password for the mock session (any value is accepted)
        #[arg(long, default_value = "Demo-Pass1")]
        password: String,

        /// Item as slug or slug:qty (repeatable, processed in order)
        #[arg(long = "item", required = true)]
        items: Vec<String>,

        /// Layered config paths in merge order (base -> env -> overrides)
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Abort the whole checkout on the first failed item
        #[arg(long, default_value_t = false)]
        all_or_nothing: bool,

        /// Append purchase events to this analytics trail
        #[arg(long)]
        events: Option<String>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Analytics trail utilities
    Events {
        #[command(subcommand)]
        cmd: EventsCmd,
    },
}

#[derive(Subcommand)]
enum CatalogCmd {
    /// List products, optionally filtered
    List {
        /// Category filter (quotes|ebooks|audio|vault|planner|toolkit)
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive search over title + description
        #[arg(long)]
        search: Option<String>,

        /// 1-based page
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 12)]
        limit: usize,
    },

    /// Show one product by slug
    Show { slug: String },

    /// Highest-rated products
    Featured,

    /// Best sellers
    Trending,
}

#[derive(Subcommand)]
enum EventsCmd {
    /// Verify a trail's hash chain
    Verify { path: String },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Catalog { cmd } => match cmd {
            CatalogCmd::List {
                category,
                search,
                page,
                limit,
            } => commands::catalog_list(category.as_deref(), search, page, limit),
            CatalogCmd::Show { slug } => commands::catalog_show(&slug),
            CatalogCmd::Featured => commands::catalog_featured(),
            CatalogCmd::Trending => commands::catalog_trending(),
        },
        Commands::Checkout {
            email,
            password,
            items,
            config_paths,
            all_or_nothing,
            events,
        } => commands::checkout(
            &email,
            &password,
            &items,
            &config_paths,
            all_or_nothing,
            events.as_deref(),
        ),
        Commands::ConfigHash { paths } => commands::config_hash(&paths),
        Commands::Events { cmd } => match cmd {
            EventsCmd::Verify { path } => commands::events_verify(&path),
        },
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
