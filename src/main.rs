use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use lunch_offline::application::ports::ConnectivityStatus;
use lunch_offline::domain::entities::{OrderDraft, OrderItem, ReservationRequest};
use lunch_offline::{AppConfig, AppState, init_logging};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "lunch-offline")]
#[command(about = "Offline order queue and sync for the lunch app", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database URL
    #[arg(long, env = "LUNCH_DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Base URL of the lunch API
    #[arg(long, env = "LUNCH_API_URL", global = true)]
    api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", env = "LOG_LEVEL", global = true)]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "JSON_LOGS", global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an order locally and sync it when online
    Order {
        #[arg(long)]
        user_id: String,
        /// Item as id:name:price:quantity (repeatable)
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<OrderItem>,
        /// Order total; defaults to the sum of the items
        #[arg(long)]
        total: Option<i64>,
    },
    /// List orders that have not reached the server yet
    Pending,
    /// Run one flush pass now
    Sync,
    /// Show the current menu
    Menu {
        /// Only read the local snapshot
        #[arg(long)]
        cached: bool,
    },
    /// Queue a reservation for delivery
    Reserve {
        #[arg(long)]
        cc: String,
        #[arg(long)]
        menu_id: String,
        #[arg(long)]
        protein_id: String,
        #[arg(long)]
        side_dish_id: Option<String>,
        #[arg(long)]
        drink_id: Option<String>,
    },
    /// Obtain and store API tokens
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LUNCH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Remove stored tokens and the persisted cache
    Logout,
    /// Watch connectivity and sync on every reconnect until interrupted
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.json_logs)?;

    let mut config = AppConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if let Some(url) = cli.api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }

    info!("Starting lunch-offline v{}", env!("CARGO_PKG_VERSION"));
    let state = AppState::initialize(config)
        .await
        .context("failed to initialize offline store")?;

    let result = run_command(&state, cli.command).await;
    state.shutdown().await;
    result
}

async fn run_command(state: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Order {
            user_id,
            items,
            total,
        } => {
            let total = match total {
                Some(total) => total,
                None => order_total(&items)?,
            };
            let order = state
                .order_service
                .create_order(OrderDraft::new(user_id, items, total))
                .await?;
            print_json(&order)?;
            if state.connectivity.is_online() {
                // トリガー済みのパスと重なった場合は shutdown で完了を待つ
                state.sync_manager.sync_pending_orders().await;
            }
        }
        Commands::Pending => {
            let orders = state.order_service.pending_orders().await?;
            print_json(&orders)?;
        }
        Commands::Sync => {
            let pass = state.sync_manager.sync_pending_orders().await;
            print_json(&pass)?;
        }
        Commands::Menu { cached } => {
            let menu = if cached {
                state
                    .menu_service
                    .cached_menu()
                    .await?
                    .map(|snapshot| snapshot.data)
            } else {
                Some(state.current_menu().await?)
            };
            let Some(menu) = menu else {
                bail!("no menu available");
            };
            print_json(&menu)?;
        }
        Commands::Reserve {
            cc,
            menu_id,
            protein_id,
            side_dish_id,
            drink_id,
        } => {
            let entry = state
                .queue_reservation(ReservationRequest {
                    cc,
                    menu_id,
                    protein_id,
                    side_dish_id,
                    drink_id,
                })
                .await?;
            print_json(&entry)?;
        }
        Commands::Login { email, password } => {
            state.login(&email, &password).await?;
            println!("logged in as {email}");
        }
        Commands::Logout => {
            state.logout().await?;
            println!("logged out");
        }
        Commands::Run => {
            let handles = state.start_background_tasks();
            info!("watching connectivity; press Ctrl+C to stop");
            tokio::signal::ctrl_c().await?;
            info!("shutting down");
            for handle in handles {
                handle.abort();
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_item(s: &str) -> Result<OrderItem> {
    // Format: id:name:price:quantity
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 4 {
        bail!("Invalid item format. Expected: id:name:price:quantity");
    }
    Ok(OrderItem {
        id: parts[0].to_string(),
        name: parts[1].to_string(),
        price: parts[2].parse().context("invalid price")?,
        quantity: parts[3].parse().context("invalid quantity")?,
    })
}

fn order_total(items: &[OrderItem]) -> Result<i64> {
    items.iter().try_fold(0i64, |total, item| {
        let Some(line) = item.price.checked_mul(i64::from(item.quantity)) else {
            bail!("line total for item {} overflows", item.id);
        };
        let Some(total) = total.checked_add(line) else {
            bail!("order total overflows");
        };
        Ok(total)
    })
}
