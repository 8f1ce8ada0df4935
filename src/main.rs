//! CropCircle engine CLI
//!
//! Drives the transaction lifecycle engine end to end. Simulation mode
//! wires the pipelines against the scriptable in-memory ledger and
//! walks event creation, claiming, and the refill workflow; production
//! embeddings provide their own wallet-backed implementations of the
//! ledger seams and use the library directly.

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cropcircle::config::Config;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Operating mode (simulation or production)
    #[arg(short, long, default_value = "simulation")]
    mode: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("Starting CropCircle engine");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;

    match args.mode.as_str() {
        "simulation" => run_simulation(&config).await,
        "production" => {
            bail!(
                "production mode needs a wallet-backed ledger implementation; \
                 embed the library and provide the ledger seams directly"
            )
        }
        other => {
            warn!("Unknown mode '{}', defaulting to simulation", other);
            run_simulation(&config).await
        }
    }
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "cropcircle=debug,info"
    } else {
        "cropcircle=info,warn,error"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        warn!("Config file '{}' not found, using defaults", path);
        Ok(Config::default())
    }
}

#[cfg(feature = "mock-ledger")]
async fn run_simulation(config: &Config) -> Result<()> {
    use cropcircle::balance::parse_units;
    use cropcircle::decoder::EVENT_CREATED_TOPIC;
    use cropcircle::ledger::{mock::MockLedger, Value};
    use cropcircle::types::{ActionRegistry, LogEntry, TOKEN_DECIMALS};
    use cropcircle::{
        ClaimWorkflow, CreateEventPipeline, FundingRequest, FundingWorkflow, SessionStore,
    };
    use cropcircle::{submitter::Submitter, watcher::ReceiptWatcher};
    use std::sync::Arc;

    info!("Operating mode: simulation (in-memory ledger)");

    let ledger = Arc::new(MockLedger::new());
    let session = Arc::new(SessionStore::temporary().context("opening session store")?);
    let actions = Arc::new(ActionRegistry::new());

    let registry_address = config.contracts.registry_address.clone();
    let operator = "0x1111111111111111111111111111111111111111".to_string();
    let wad = 10u128.pow(TOKEN_DECIMALS);

    // Script the creation receipt: one well-formed EventCreated log.
    let event_topic = [0x42u8; 32];
    let create_handle = ledger.peek_next_handle();
    ledger.confirm_with_logs(
        &create_handle,
        vec![LogEntry {
            address: registry_address.clone(),
            topics: vec![*EVENT_CREATED_TOPIC, event_topic],
            data: vec![0u8; 96],
        }],
    );

    // Registry read fixtures for the claim walkthrough.
    ledger.set_read(
        "getEventDetails",
        Value::Tuple(vec![
            Value::Uint(1_700_000_000),
            Value::Uint(1_700_086_400),
            Value::Bytes32([0xaa; 32]),
            Value::Bool(true),
            Value::Uint(0),
            Value::Address("0x0000000000000000000000000000000000000000".into()),
            Value::Uint(0),
            Value::Bool(false),
        ]),
    );
    ledger.set_read("hasUserClaimedTokens", Value::Bool(false));
    ledger.set_read("getContractTokenBalance", Value::Uint(5_000 * wad));
    ledger.set_read("INITIAL_TOKEN_AMOUNT", Value::Uint(100 * wad));

    // 1. Create an event and recover its identifier from the logs.
    let pipeline = CreateEventPipeline::new(
        ledger.clone(),
        ledger.clone(),
        session.clone(),
        actions.clone(),
        config,
    );
    let created = pipeline
        .run(24 * 60 * 60)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e.user_message()))?;
    println!("{}", serde_json::to_string_pretty(&created)?);

    // 2. Claim the initial grant for the new event.
    let claim = ClaimWorkflow::new(
        ledger.clone(),
        ledger.clone(),
        ledger.clone(),
        actions.clone(),
        config,
    );
    match claim.run(&created.id, &operator).await {
        Ok(outcome) => println!("{}", serde_json::to_string_pretty(&outcome)?),
        Err(e) => {
            warn!(error = %e, "claim failed");
            println!("{}", ClaimWorkflow::user_message(&e));
        }
    }

    // 3. Refill the pooled balance: allowance grant, then deposit.
    let watcher = ReceiptWatcher::from_config(ledger.clone(), &config.chain);
    let mut funding = FundingWorkflow::new(
        Submitter::new(ledger.clone()),
        Submitter::new(ledger.clone()),
        watcher,
        actions,
    );
    let request = FundingRequest {
        granter: operator,
        spender: registry_address,
        amount: parse_units("500", TOKEN_DECIMALS).context("parsing refill amount")?,
    };
    let outcome = funding
        .run(&request)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    info!(
        allowance = %outcome.allowance,
        deposit = %outcome.deposit,
        "funding complete"
    );

    info!(
        submitted = ?ledger.submitted_functions(),
        "simulation walkthrough finished"
    );
    Ok(())
}

#[cfg(not(feature = "mock-ledger"))]
async fn run_simulation(_config: &Config) -> Result<()> {
    bail!("simulation mode requires the `mock-ledger` feature")
}
