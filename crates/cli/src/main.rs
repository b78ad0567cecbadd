//! Shopfront CLI - a terminal storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! shopfront products list
//! shopfront products show cold-pressed-coconut-oil
//!
//! # Cart (works signed out; merged into your account at login)
//! shopfront cart add cold-pressed-coconut-oil --qty 2
//! shopfront cart show
//!
//! # Sign in
//! shopfront login send-otp +919876543210
//! shopfront login verify +919876543210 123456
//!
//! # Check out and pay
//! shopfront checkout --address <address-id>
//! shopfront pay ORD20260101ABC123
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_API_URL` - Backend base URL, e.g. `http://localhost:8000/api/v1`
//! - `SHOPFRONT_DATA_DIR` - Where tokens and the guest cart are kept
//! - `SENTRY_DSN` - Optional error tracking

#![cfg_attr(not(test), forbid(unsafe_code))]
// A terminal UI writes to stdout and stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_client::{ClientConfig, ClientError, NoticeLevel, NoticeQueue, Storefront, Stores};
use shopfront_core::AddressId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod payment;
mod render;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront terminal storefront")]
struct Cli {
    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalogue
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// View and change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign in with a one-time code
    Login {
        #[command(subcommand)]
        action: LoginAction,
    },
    /// Sign out
    Logout,
    /// View and update your profile
    Me {
        #[command(subcommand)]
        action: MeAction,
    },
    /// Manage delivery addresses
    Addresses {
        #[command(subcommand)]
        action: AddressesAction,
    },
    /// View and cancel orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Place an order for the cart and pay for it
    Checkout {
        /// Delivery address id (defaults to your default address)
        #[arg(short, long)]
        address: Option<AddressId>,
    },
    /// Pay for a pending order
    Pay {
        /// Order id or order number
        order: String,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// Show one product
    Show {
        /// Product slug or id
        product: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product slug or id
        product: String,

        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Set the quantity of a product in the cart
    Update {
        /// Product slug or id
        product: String,

        qty: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product slug or id
        product: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum LoginAction {
    /// Text a login code to a mobile number
    SendOtp { mobile: String },
    /// Sign in with the code
    Verify { mobile: String, otp: String },
}

#[derive(Subcommand)]
enum MeAction {
    /// Show your profile
    Show,
    /// Change name or email
    Update {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
enum AddressesAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add(commands::account::AddressArgs),
    /// Change a saved address
    Update {
        id: AddressId,

        #[command(flatten)]
        fields: commands::account::AddressUpdateArgs,
    },
    /// Delete a saved address
    Remove { id: AddressId },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    /// Show one order
    Show { order: String },
    /// Show shipment tracking
    Track { order: String },
    /// Cancel an order
    Cancel { order: String },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so stdout stays clean for output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_cli=warn,shopfront_client=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let notices = NoticeQueue::new();
    let stores = Stores::in_dir(&config.data_dir);
    let shop = match Storefront::new(config, stores, Arc::new(notices.clone())) {
        Ok(shop) => shop,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    let result = run(&shop, cli).await;

    for notice in notices.drain() {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => eprintln!("{}", notice.message),
            NoticeLevel::Warning | NoticeLevel::Error => {
                eprintln!("{}: {}", notice.level, notice.message);
            }
        }
    }

    if let Err(e) = result {
        tracing::debug!(error = %e, "Command failed");
        eprintln!("error: {}", e.user_message());
        if e.requires_login() {
            eprintln!("hint: sign in with `shopfront login send-otp <mobile>`");
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(shop: &Storefront, cli: Cli) -> Result<(), ClientError> {
    let json = cli.json;
    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List { page, page_size } => {
                commands::catalogue::list(shop, page, page_size, json).await
            }
            ProductsAction::Show { product } => commands::catalogue::show(shop, &product, json).await,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(shop, json).await,
            CartAction::Add { product, qty } => commands::cart::add(shop, &product, qty, json).await,
            CartAction::Update { product, qty } => {
                commands::cart::update(shop, &product, qty, json).await
            }
            CartAction::Remove { product } => commands::cart::remove(shop, &product, json).await,
            CartAction::Clear => commands::cart::clear(shop, json).await,
        },
        Commands::Login { action } => match action {
            LoginAction::SendOtp { mobile } => commands::session::send_otp(shop, &mobile).await,
            LoginAction::Verify { mobile, otp } => {
                commands::session::verify(shop, &mobile, &otp).await
            }
        },
        Commands::Logout => commands::session::logout(shop).await,
        Commands::Me { action } => match action {
            MeAction::Show => commands::account::me(shop, json).await,
            MeAction::Update { name, email } => {
                commands::account::update_me(shop, name, email, json).await
            }
        },
        Commands::Addresses { action } => match action {
            AddressesAction::List => commands::account::addresses(shop, json).await,
            AddressesAction::Add(args) => commands::account::add_address(shop, args, json).await,
            AddressesAction::Update { id, fields } => {
                commands::account::update_address(shop, id, fields, json).await
            }
            AddressesAction::Remove { id } => commands::account::remove_address(shop, id).await,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List { page, page_size } => {
                commands::orders::list(shop, page, page_size, json).await
            }
            OrdersAction::Show { order } => commands::orders::show(shop, &order, json).await,
            OrdersAction::Track { order } => commands::orders::track(shop, &order, json).await,
            OrdersAction::Cancel { order } => commands::orders::cancel(shop, &order).await,
        },
        Commands::Checkout { address } => commands::checkout::checkout(shop, address, json).await,
        Commands::Pay { order } => commands::checkout::pay(shop, &order, json).await,
    }
}
