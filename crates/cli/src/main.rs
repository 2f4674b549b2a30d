//! Ferrik CLI - browse the menu, manage the cart and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Moods and mood menus
//! ferrik moods
//! ferrik mood party
//!
//! # Menu and restaurants
//! ferrik menu --restaurant Napoli
//! ferrik restaurants
//!
//! # Cart (saved under $FERRIK_DATA_DIR)
//! ferrik cart add p1 -q 2
//! ferrik cart show
//!
//! # Checkout
//! ferrik promo WELCOME10
//! ferrik order submit -u 42 -n "Олена" -p 0501234567 -a "вул. Хрещатик, 22"
//! ferrik orders 42
//! ```
//!
//! # Commands
//!
//! - `health` - Check the API
//! - `moods` / `mood` - Mood catalog and mood menus
//! - `menu` / `restaurants` - Catalog
//! - `cart` - Show and edit the saved cart
//! - `promo` - Check a promo code
//! - `order submit` - Place an order for the cart
//! - `orders` - Order history

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use ferrik_client::{ApiClient, MenuFilter, OrderDetails};
use ferrik_core::{DeliveryType, PaymentMethod, TelegramUserId};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod file_store;

use config::CliConfig;
use error::CliError;
use file_store::FileStore;

#[derive(Parser)]
#[command(name = "ferrik")]
#[command(author, version, about = "Ferrik food ordering CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API is reachable
    Health,
    /// List moods
    Moods,
    /// Show dishes for a mood
    Mood {
        /// Mood id (e.g. `calm`, `spicy`)
        tag: String,
    },
    /// Show the menu
    Menu(MenuArgs),
    /// List restaurants
    Restaurants,
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check a promo code
    Promo {
        /// Promo code
        code: String,
    },
    /// Place orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Show a user's recent orders
    Orders {
        /// Telegram user ID
        user_id: i64,

        /// Maximum number of orders
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

#[derive(Args)]
struct MenuArgs {
    /// Only dishes from this restaurant
    #[arg(short, long)]
    restaurant: Option<String>,

    /// Only dishes in this category
    #[arg(short, long)]
    category: Option<String>,

    /// Include unavailable dishes
    #[arg(long)]
    all: bool,

    /// Page size
    #[arg(short, long)]
    limit: Option<u32>,

    /// Page offset
    #[arg(short, long)]
    offset: Option<u32>,
}

impl From<MenuArgs> for MenuFilter {
    fn from(args: MenuArgs) -> Self {
        Self {
            restaurant: args.restaurant,
            category: args.category,
            active: (!args.all).then_some(true),
            limit: args.limit,
            offset: args.offset,
        }
    }
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add a dish
    Add {
        /// Menu item ID
        id: String,

        /// Number of units
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Unit price; skips the menu lookup
        #[arg(long)]
        price: Option<String>,

        /// Display name for a line added with --price
        #[arg(long, requires = "price")]
        name: Option<String>,
    },
    /// Set the quantity of a line (0 removes it)
    Update {
        /// Menu item ID
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Menu item ID
        id: String,
    },
    /// Remove all lines
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Submit the cart as an order
    Submit {
        /// Telegram user ID
        #[arg(short, long)]
        user_id: i64,

        /// Customer name
        #[arg(short, long)]
        name: String,

        /// Contact phone (e.g. 0501234567)
        #[arg(short, long)]
        phone: String,

        /// Delivery address
        #[arg(short, long, default_value = "")]
        address: String,

        /// Collect from the restaurant instead of delivery
        #[arg(long)]
        pickup: bool,

        /// Payment method (`cash` or `card`)
        #[arg(long, default_value = "cash")]
        payment: PaymentMethod,

        /// Note for the restaurant
        #[arg(long, default_value = "")]
        note: String,

        /// Promo code to apply
        #[arg(long)]
        promo: Option<String>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CliConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

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

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ferrik=info,ferrik_client=info,ferrik_core=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("{e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &CliConfig) -> Result<(), CliError> {
    let client = ApiClient::new(&config.client)?;

    match cli.command {
        Commands::Health => commands::catalog::health(&client).await?,
        Commands::Moods => commands::catalog::moods(),
        Commands::Mood { tag } => commands::catalog::mood(&client, &tag).await?,
        Commands::Menu(args) => commands::catalog::menu(&client, &args.into()).await?,
        Commands::Restaurants => commands::catalog::restaurants(&client).await?,
        Commands::Promo { code } => commands::order::promo(&client, &code).await?,
        Commands::Orders { user_id, limit } => {
            commands::order::history(&client, TelegramUserId::new(user_id), limit).await?;
        }
        Commands::Cart { action } => {
            let mut cart = commands::cart::open(FileStore::open(&config.data_dir)?);
            match action {
                CartAction::Show => commands::cart::show(&cart),
                CartAction::Add {
                    id,
                    quantity,
                    price,
                    name,
                } => {
                    let manual = commands::cart::ManualLine { price, name };
                    commands::cart::add(&mut cart, &client, &id, quantity, manual).await?;
                }
                CartAction::Update { id, quantity } => {
                    commands::cart::update(&mut cart, &id, quantity)?;
                }
                CartAction::Remove { id } => commands::cart::remove(&mut cart, &id),
                CartAction::Clear => commands::cart::clear(&mut cart),
            }
        }
        Commands::Order { action } => match action {
            OrderAction::Submit {
                user_id,
                name,
                phone,
                address,
                pickup,
                payment,
                note,
                promo,
            } => {
                let mut cart = commands::cart::open(FileStore::open(&config.data_dir)?);
                let details = OrderDetails {
                    name,
                    phone,
                    address,
                    delivery_type: if pickup {
                        DeliveryType::Pickup
                    } else {
                        DeliveryType::Delivery
                    },
                    payment_method: payment,
                    note,
                };
                commands::order::submit(
                    &mut cart,
                    &client,
                    TelegramUserId::new(user_id),
                    details,
                    promo.as_deref(),
                )
                .await?;
            }
        },
    }
    Ok(())
}
