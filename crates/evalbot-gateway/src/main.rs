use std::sync::Arc;

use tracing::info;

use evalbot_core::EvalbotConfig;
use evalbot_sandbox::SnekboxClient;

mod app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "evalbot_gateway=info,evalbot_discord=info,evalbot_sandbox=info".into()
            }),
        )
        .init();

    // load config: EVALBOT_CONFIG env > ~/.evalbot/evalbot.toml
    let config_path = std::env::var("EVALBOT_CONFIG").ok();
    let config = EvalbotConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        EvalbotConfig::default()
    });

    let sandbox = SnekboxClient::from_config(&config.sandbox)?;
    info!(
        version = evalbot_core::VERSION,
        url = %sandbox.eval_url(),
        prefixes = ?config.discord.command_prefixes,
        "evalbot starting"
    );

    let state = Arc::new(app::AppState::new(config, sandbox));
    evalbot_discord::DiscordAdapter::new(state).run().await?;
    Ok(())
}
