//! Offline replay tool: runs a recorded batch of registration events
//! through the decision pipeline and reports each outcome.
//!
//! Configuration comes from the environment (an optional `.env` file is
//! loaded first); `--data` and `--policy` override the fixture paths.
//! Nothing here touches the real registration flow.

use camino::Utf8PathBuf;
use clap::Parser;
use signup_gate_lib::config::Config;
use signup_gate_lib::handlers::PreSignupHandler;
use signup_gate_lib::{logging, replay};

#[derive(Parser, Debug)]
#[command(name = "signup-gate-replay", version, about)]
struct Args {
    /// Path to a JSON file with recorded registration events
    #[arg(long, value_name = "PATH")]
    data: Option<Utf8PathBuf>,

    /// Path to the policy document
    #[arg(long, value_name = "PATH")]
    policy: Option<Utf8PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), ohno::AppError> {
    let args = Args::parse();

    if std::path::Path::new(".env").exists() {
        let _ = dotenvy::from_path(".env");
    }

    let mut config = Config::from_env();

    if config.debug_data_path.as_str().is_empty() {
        config.debug_data_path = Utf8PathBuf::from("fixtures/debug-data.json");
    }
    if let Some(data) = args.data {
        config.debug_data_path = data;
    }

    if config.policy_path.as_str().is_empty() {
        config.policy_path = Utf8PathBuf::from("fixtures/debug-policy.cel");
    }
    if let Some(policy) = args.policy {
        config.policy_path = policy;
    }

    logging::init(&config.log_level);

    let events = replay::load_events(&config.debug_data_path)?;
    let handler = PreSignupHandler::new(config)?;

    for outcome in replay::replay(&handler, events).await {
        let response = serde_json::to_string(&outcome.event.response).unwrap_or_default();
        match &outcome.error {
            Some(reason) => log::error!("event {} rejected: {reason}", outcome.index),
            None => log::info!("event {} allowed: response={response}", outcome.index),
        }
    }

    log::info!("replay completed");
    Ok(())
}
