use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paydesk::api::{self, AppState};
use paydesk::config::{validate_settings, Settings};
use paydesk::eth_rpc::{AccountWatcher, JsonRpcProvider, WalletProvider};
use paydesk::explorer::{tx_url, EtherscanClient};
use paydesk::ledger::LocalLedger;
use paydesk::metrics::{self, Metrics};
use paydesk::reconcile::view::{sort_for_display, DashboardSummary, TransactionFilter};
use paydesk::reconcile::TransactionService;
use paydesk::storage::{FileStore, KeyValueStore, MemoryStore};
use paydesk::wallet::address::{shorten_address, shorten_hash};
use paydesk::wallet::units::format_amount_display;
use paydesk::wallet::{TransferForm, WalletSession};

#[derive(Parser)]
#[command(name = "paydesk", about = "Ethereum payment dashboard service")]
struct Args {
    /// Configuration file (yaml), defaults to ./config.yaml if present
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the dashboard HTTP API (default)
    Serve,
    /// Connect the wallet and remember the account
    Connect,
    /// Forget the connected account
    Disconnect,
    /// Show the connected account's balance
    Balance,
    /// Show reconciled transaction history
    History {
        /// all, pending, confirmed or failed
        #[arg(long)]
        status: Option<String>,
        /// Substring of a hash or address
        #[arg(long)]
        query: Option<String>,
    },
    /// Check a transaction's status with the wallet provider
    Status { hash: String },
    /// Send ether to an address
    Send {
        to: String,
        amount: String,
        /// Gas price in gwei, network default if omitted
        #[arg(long)]
        gas_price: Option<String>,
    },
}

struct Services {
    provider: Option<JsonRpcProvider>,
    wallet: Arc<WalletSession>,
    transactions: Arc<TransactionService>,
}

fn build_services(settings: &Settings) -> Result<Services> {
    let store: Arc<dyn KeyValueStore> = if settings.storage.in_memory {
        info!("Using in-memory storage");
        Arc::new(MemoryStore::new())
    } else {
        let store = FileStore::open(&settings.storage.path)
            .with_context(|| format!("Failed to open store at {}", settings.storage.path))?;
        info!("Using storage file {}", store.path().display());
        Arc::new(store)
    };

    let provider = settings
        .provider
        .url
        .clone()
        .map(|url| JsonRpcProvider::new(url, settings.provider.request_timeout()));
    if provider.is_none() {
        warn!("No provider.url configured, wallet actions will be unavailable");
    }

    let explorer = Arc::new(EtherscanClient::new(
        settings.explorer.api_url.clone(),
        settings.explorer.api_key.clone(),
        settings.provider.request_timeout(),
    ));
    let wallet = Arc::new(WalletSession::new(
        provider.clone().map(|p| Arc::new(p) as Arc<dyn WalletProvider>),
        store.clone(),
    ));
    let transactions = Arc::new(TransactionService::new(
        wallet.clone(),
        LocalLedger::new(store),
        explorer,
    ));

    Ok(Services {
        provider,
        wallet,
        transactions,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new(args.config.as_deref()).context("Failed to load configuration")?;
    validate_settings(&settings)?;

    let services = build_services(&settings)?;
    services.wallet.restore().await;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings, services).await,
        Command::Connect => {
            let state = services.wallet.connect().await?;
            match state.address {
                Some(ref address) if state.is_connected => {
                    println!("Connected {} ({} ETH)", address, format_amount_display(&state.balance_ether()))
                }
                _ => println!("Wallet did not connect"),
            }
            Ok(())
        }
        Command::Disconnect => {
            services.wallet.disconnect().await?;
            println!("Disconnected");
            Ok(())
        }
        Command::Balance => {
            let state = services.wallet.refresh_balance().await;
            match state.address {
                Some(ref address) => println!("{}: {} ETH", address, state.balance_ether()),
                None => println!("No wallet connected"),
            }
            Ok(())
        }
        Command::History { status, query } => {
            let filter = TransactionFilter::new(status.as_deref(), query.as_deref()).map_err(anyhow::Error::msg)?;
            let Some(address) = services.wallet.address().await else {
                println!("No wallet connected");
                return Ok(());
            };
            let mut records = services.transactions.transaction_history().await?;
            sort_for_display(&mut records);

            let summary = DashboardSummary::build(&address, &services.wallet.state().await, &records, &settings.explorer.web_url);
            println!(
                "{}  balance {} ETH  sent {}  received {}",
                shorten_address(&address),
                summary.balance_display,
                summary.sent_count,
                summary.received_count
            );
            for record in filter.apply(&records) {
                let timestamp = chrono::DateTime::from_timestamp_millis(record.timestamp)
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{}  {:<9}  {:>10} ETH  {} -> {}  {}",
                    timestamp,
                    record.status.as_str(),
                    format_amount_display(&record.amount),
                    shorten_address(&record.from),
                    shorten_address(&record.to),
                    shorten_hash(&record.hash)
                );
            }
            Ok(())
        }
        Command::Status { hash } => {
            let status = services.transactions.transaction_status(&hash).await?;
            println!("{}: {}", hash, status);
            Ok(())
        }
        Command::Send { to, amount, gas_price } => {
            if !services.wallet.is_connected().await {
                anyhow::bail!("No wallet connected, run `paydesk connect` first");
            }
            let form = TransferForm { to, amount, gas_price };
            let balance = services.wallet.state().await.balance;
            form.validate(balance)?;
            match services
                .transactions
                .send_transaction(form.to.trim(), form.amount.trim(), form.gas_price())
                .await?
            {
                Some(hash) => {
                    println!("Transaction sent successfully!");
                    println!("{}", tx_url(&settings.explorer.web_url, &hash));
                    Ok(())
                }
                None => Err(anyhow::anyhow!("Transaction failed. Please try again.")),
            }
        }
    }
}

async fn serve(settings: Settings, services: Services) -> Result<()> {
    let metrics = Metrics::new(metrics::setup_metrics_recorder()?);
    info!("Prometheus metrics initialized");

    let watcher = services
        .provider
        .clone()
        .map(|provider| AccountWatcher::new(provider, settings.provider.poll_interval()).spawn());
    let listener_task = services.wallet.clone().spawn_event_listener();

    let cors = CorsLayer::new()
        .allow_origin(settings.application.cors_allow_origin.parse::<HeaderValue>().unwrap_or_else(|_| {
            HeaderValue::from_static("*")
        }))
        .allow_methods(
            settings.application.cors_allow_methods
                .split(',')
                .map(|s| s.trim().parse::<Method>().unwrap_or(Method::GET))
                .collect::<Vec<Method>>()
        )
        .allow_headers(
            settings.application.cors_allow_headers
                .split(',')
                .map(|s| match s.trim().to_lowercase().as_str() {
                    "content-type" => header::CONTENT_TYPE,
                    "authorization" => header::AUTHORIZATION,
                    _ => header::HeaderName::from_lowercase(s.trim().to_lowercase().as_bytes()).unwrap_or(header::CONTENT_TYPE),
                })
                .collect::<Vec<_>>()
        );

    let state = AppState::new(services.transactions.clone(), &settings.explorer.web_url);
    let app = Router::new()
        .route("/metrics", axum::routing::get(move || async move {
            (
                [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                metrics.render(),
            )
        }))
        .merge(api::create_router(state))
        .layer(cors);

    let host = settings
        .application
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("Invalid application.host '{}'", settings.application.host))?;
    let addr = SocketAddr::from((host, settings.application.port));

    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(watcher) = watcher {
        watcher.abort();
    }
    if let Some(listener_task) = listener_task {
        listener_task.abort();
    }
    info!("paydesk stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
