use anyhow::Context;
use clap::Parser;
use gateway::config::Arguments;
use gateway::intake::OrderIntakeService;
use gateway::rate_limit::RateLimiter;
use gateway::router::create_router;
use gateway::state::AppState;
use gateway::sweep::spawn_expiry_sweep;
use matching_engine::{InMemoryOrderBook, MatchingEngine, OrderBookStore};
use persistence::JournaledOrderBook;
use settlement::{HttpSettlementAuthority, LedgerAuthority, SettlementAuthority, SettlementDispatcher};
use signing::{CustodialSigner, MasterSecret};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Arguments::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting venue gateway with arguments:\n{}", args);

    let domain = args.signing_domain();
    let secret = MasterSecret::new(args.master_secret.as_bytes()).context("invalid master secret")?;

    let store: Arc<dyn OrderBookStore> = match &args.journal_path {
        Some(path) => {
            let book = JournaledOrderBook::open(path, args.match_policy)
                .with_context(|| format!("opening order book journal {}", path.display()))?;
            book.compact().context("compacting order book journal")?;
            Arc::new(book)
        }
        None => Arc::new(InMemoryOrderBook::new(args.match_policy)),
    };

    let authority: Arc<dyn SettlementAuthority> = match &args.settlement_url {
        Some(url) => {
            let client = reqwest::Client::builder()
                .timeout(args.settlement_timeout)
                .build()
                .context("building settlement HTTP client")?;
            tracing::info!(url = %url, "Using remote settlement authority");
            Arc::new(HttpSettlementAuthority::new(client, url))
        }
        None => {
            tracing::info!("Using in-process settlement ledger");
            Arc::new(LedgerAuthority::new(domain.clone()))
        }
    };

    let engine = MatchingEngine::new(store);
    let intake = OrderIntakeService::new(
        Arc::new(CustodialSigner::new(secret, domain)),
        engine.clone(),
        SettlementDispatcher::new(authority, args.settlement_timeout),
    );
    let state = AppState::new(
        intake,
        RateLimiter::new(args.order_rate_capacity, args.order_rate_refill),
    );

    let sweep = spawn_expiry_sweep(
        engine,
        Arc::clone(&state.rate_limiter),
        args.expiry_sweep_interval,
    );
    let app = create_router(state);

    let listener = TcpListener::bind(args.bind_address).await?;
    tracing::info!("Listening on {}", args.bind_address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweep.abort();
    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
