use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    dispatch, ContractBinding, PrimaryAction, SessionController, SessionEvent, SimulatedChain,
};
use shared::domain::{Address, ChainId};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

/// Walks the allow-list page through mount, connect and join against an
/// in-memory wallet and contract.
#[derive(Parser, Debug)]
struct Args {
    /// Account held by the simulated wallet.
    #[arg(long, default_value = "0x71c7656ec7ab88b098defb751b7401b5f6d8976f")]
    account: String,
    /// Network the wallet is pointed at. Defaults to the required network.
    #[arg(long)]
    chain_id: Option<u64>,
    #[arg(long)]
    required_chain_id: Option<u64>,
    #[arg(long)]
    contract_address: Option<String>,
    /// Addresses already on the allow-list.
    #[arg(long, default_value_t = 0)]
    preloaded: u64,
    #[arg(long, default_value_t = client_core::sim::DEFAULT_MAX_ALLOWLISTED)]
    max: u64,
    #[arg(long)]
    no_wallet: bool,
    /// The account was authorized on an earlier visit.
    #[arg(long)]
    authorized: bool,
    /// Reject the wallet's connection prompt.
    #[arg(long)]
    reject: bool,
    #[arg(long, default_value_t = 3)]
    confirm_ticks: u32,
    /// Click the join button once connected.
    #[arg(long)]
    join: bool,
    /// Print each rendered view as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = config::load_settings()?;
    if let Some(v) = args.required_chain_id {
        settings.required_chain_id = v;
    }
    if let Some(v) = &args.contract_address {
        settings.contract_address = v.clone();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let contract_address = Address::parse(&settings.contract_address)
        .with_context(|| format!("invalid contract address '{}'", settings.contract_address))?;
    let account = Address::parse(&args.account)
        .with_context(|| format!("invalid account '{}'", args.account))?;
    let required = ChainId(settings.required_chain_id);

    let mut chain = SimulatedChain::new(
        ChainId(args.chain_id.unwrap_or(required.0)),
        ContractBinding::new(contract_address),
    )
    .with_account(account)
    .with_max_allowlisted(args.max)
    .with_preloaded(args.preloaded)
    .with_confirm_ticks(args.confirm_ticks);
    if args.no_wallet {
        chain = chain.without_wallet();
    }
    if args.authorized {
        chain = chain.authorized();
    }
    if args.reject {
        chain = chain.rejecting_access();
    }

    let controller = SessionController::new(Arc::new(chain.clone()), Arc::new(chain), required);
    info!(required_chain_id = required.0, "page mounted");

    run(&controller, SessionEvent::Mounted, args.json).await?;

    if controller.render().action == PrimaryAction::Connect {
        run(&controller, SessionEvent::ConnectClicked, args.json).await?;
    }
    if args.join && controller.render().action == PrimaryAction::Join {
        run(&controller, SessionEvent::JoinClicked, args.json).await?;
    }

    Ok(())
}

async fn run(controller: &SessionController, event: SessionEvent, json: bool) -> Result<()> {
    let name = event.name();
    let report = dispatch(controller, event).await;
    for err in report.errors() {
        warn!(event = name, kind = ?err.kind(), "{err}");
    }

    println!("--- after {name} ---");
    for notice in controller.take_notices() {
        println!("! {}", notice.message());
    }
    let view = controller.render();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{view}");
    }
    Ok(())
}
