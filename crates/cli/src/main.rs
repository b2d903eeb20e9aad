//! Shopwise CLI - a terminal front end for the storefront.
//!
//! # Usage
//!
//! ```bash
//! # Log in and look at the cart
//! shopwise login -e ada@example.com -p secret
//! shopwise cart show
//!
//! # Add two of product 3, then change it to one
//! shopwise cart add 3 -q 2
//! shopwise cart set 3 1
//!
//! # Place an order with the coupon
//! shopwise checkout --phone 5551234567 --address "1 Analytical Way" \
//!     --payment paypal --coupon coupon888
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `register`, `whoami` - Account and session
//! - `cart` - Show and edit the cart
//! - `wishlist` - List and toggle favorites
//! - `orders` - Order history
//! - `checkout` - Place an order
//! - `products` - Browse the catalog
//!
//! Session and cart persist between runs under `SHOPWISE_STATE_DIR`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopwise_client::ClientConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "shopwise")]
#[command(author, version, about = "Shopwise storefront from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "SHOPWISE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "SHOPWISE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the logged-in user
    Whoami,
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage favorites
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// List past orders, newest first
    Orders,
    /// Place an order for the current cart
    Checkout {
        /// Ten-digit phone number
        #[arg(long)]
        phone: String,

        /// Shipping address (at most 30 characters)
        #[arg(long)]
        address: String,

        /// `credit-card`, `paypal` or `bank-transfer`
        #[arg(long)]
        payment: String,

        /// Coupon code
        #[arg(long)]
        coupon: Option<String>,
    },
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List lines and totals
    Show,
    /// Add a product
    Add {
        product_id: String,

        /// Quantity to add (1-20)
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity; zero removes it
    Set { product_id: String, quantity: i64 },
    /// Remove a line
    Remove { product_id: String },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// List favorite products
    List,
    /// Add or remove a product
    Toggle { product_id: String },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products, optionally in one category
    List {
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product with recommendations
    Show { product_id: String },
    /// Search product titles
    Search { query: String },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry
                .environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry.sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::debug!("Sentry initialized");
    Some(guard)
}

/// Warnings and errors become Sentry events; info and debug become breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopwise=info,shopwise_client=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be up before the subscriber so the layer has a client
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let result = match Context::open(&config) {
        Ok(ctx) => {
            let result = run(cli, &ctx).await;
            // An expired session finishes its notice and redirect before exit
            commands::finish_pending_redirect(&ctx.state).await;
            result
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        if e.is_reportable() {
            e.report();
        } else {
            tracing::error!("{e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, ctx: &Context) -> shopwise_client::Result<()> {
    match cli.command {
        Commands::Login { email, password } => {
            commands::account::login(ctx, &email, password).await?;
        }
        Commands::Logout => commands::account::logout(ctx),
        Commands::Register {
            name,
            email,
            password,
        } => commands::account::register(ctx, &name, &email, password).await?,
        Commands::Whoami => commands::account::whoami(ctx).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(ctx).await,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(ctx, &product_id, quantity).await?,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(ctx, &product_id, quantity).await,
            CartAction::Remove { product_id } => commands::cart::remove(ctx, &product_id).await,
            CartAction::Clear => commands::cart::clear(ctx).await,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::List => commands::shop::wishlist(ctx).await?,
            WishlistAction::Toggle { product_id } => {
                commands::shop::toggle_favorite(ctx, &product_id).await?;
            }
        },
        Commands::Orders => commands::shop::orders(ctx).await?,
        Commands::Checkout {
            phone,
            address,
            payment,
            coupon,
        } => {
            commands::shop::checkout(ctx, phone, address, &payment, coupon.as_deref()).await?;
        }
        Commands::Products { action } => match action {
            ProductsAction::List { category } => {
                commands::products::list(ctx, category.as_deref()).await?;
            }
            ProductsAction::Show { product_id } => {
                commands::products::show(ctx, &product_id).await?;
            }
            ProductsAction::Search { query } => commands::products::search(ctx, &query).await?,
        },
    }
    Ok(())
}
