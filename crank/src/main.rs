use std::sync::Arc;

use anyhow::Context;
use solana_sdk::signature::Signer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use autodeploy_api::FullSelection;
use autodeploy_crank::{
    config::{self, Config},
    ledger::RpcLedger,
    round::HttpRoundProvider,
    scheduler::Crank,
    submit::SubmitPolicy,
};

const DEFAULT_LOG_FILTER: &str = "autodeploy_crank=info,autodeploy_api=info";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_target(false)).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    let executor = config::load_executor().context("loading executor key")?;

    info!(
        executor = %executor.pubkey(),
        rpc = %config.rpc_url,
        round_api = %config.round_api_url,
        commitment = ?config.commitment.commitment,
        "configuration loaded"
    );

    let ledger = RpcLedger::new(config.rpc_url.clone(), config.commitment);
    let rounds = HttpRoundProvider::new(config.round_api_url.clone())
        .context("building round API client")?;
    let policy = SubmitPolicy {
        send_retries: config.send_retries,
        poll_interval: config.confirm_poll,
        ..SubmitPolicy::default()
    };

    let crank = Arc::new(Crank::new(
        rounds,
        ledger,
        executor,
        config.program_id,
        Box::new(FullSelection),
        policy,
    ));
    crank.run(config.tick_interval).await;
    Ok(())
}
