use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tracing::{error, info, warn};

use evalbot_sandbox::EvalContext;

use crate::error::DiscordError;
use crate::handler::DiscordHandler;
use crate::pending::PendingReevals;

/// Discord channel adapter.
///
/// Wraps a serenity `Client` and drives the event loop until the process exits,
/// reconnecting whenever the gateway drops.
pub struct DiscordAdapter<C: EvalContext + 'static> {
    ctx: Arc<C>,
    pending: PendingReevals,
}

impl<C: EvalContext + 'static> DiscordAdapter<C> {
    pub fn new(ctx: Arc<C>) -> Self {
        Self {
            ctx,
            pending: PendingReevals::new(),
        }
    }

    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MESSAGE_REACTIONS
            | GatewayIntents::DIRECT_MESSAGE_REACTIONS
    }

    /// Connect to Discord and keep reconnecting whenever the gateway drops.
    ///
    /// Only returns early, with [`DiscordError::NoToken`], when no token is
    /// configured.
    pub async fn run(self) -> Result<(), DiscordError> {
        if self.ctx.config().discord.bot_token.trim().is_empty() {
            return Err(DiscordError::NoToken);
        }
        let intents = Self::intents();

        loop {
            let mut client = loop {
                match self.build_client(intents).await {
                    Ok(c) => break c,
                    Err(e) => {
                        error!("Discord: connect failed ({e}), retrying in 30s");
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            };

            info!("Discord: gateway connecting");

            if let Err(e) = client.start().await {
                warn!("Discord: gateway error ({e}), reconnecting in 5s");
            } else {
                info!("Discord: gateway stopped cleanly, reconnecting in 5s");
            }

            tokio::time::sleep(Duration::from_secs(5)).await;
        }
    }

    /// Build a fresh serenity `Client`. Pending re-evaluations survive the rebuild.
    async fn build_client(&self, intents: GatewayIntents) -> Result<Client, serenity::Error> {
        let handler = DiscordHandler {
            ctx: Arc::clone(&self.ctx),
            pending: self.pending.clone(),
            bot_id: OnceLock::new(),
        };

        Client::builder(&self.ctx.config().discord.bot_token, intents)
            .event_handler(handler)
            .await
    }
}
