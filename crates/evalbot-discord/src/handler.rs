use std::sync::{Arc, OnceLock};

use serenity::all::ActivityData;
use serenity::async_trait;
use serenity::model::channel::{Message, Reaction};
use serenity::model::event::MessageUpdateEvent;
use serenity::model::gateway::Ready;
use serenity::model::id::UserId;
use serenity::model::user::OnlineStatus;
use serenity::prelude::{Context, EventHandler};
use tracing::{debug, info, warn};

use evalbot_core::config::DiscordConfig;
use evalbot_sandbox::{EvalContext, ReevalEvent};

use crate::commands::{self, Command, Invocation};
use crate::pending::PendingReevals;

/// Serenity event handler wired to the eval pipeline.
pub struct DiscordHandler<C: EvalContext + 'static> {
    pub ctx: Arc<C>,
    pub pending: PendingReevals,
    pub bot_id: OnceLock<UserId>,
}

impl<C: EvalContext + 'static> DiscordHandler<C> {
    fn prefixes(&self) -> Vec<String> {
        let bot_id = self.bot_id.get().map(|id| id.get());
        commands::prefixes(self.ctx.config(), bot_id)
    }
}

#[async_trait]
impl<C: EvalContext + 'static> EventHandler for DiscordHandler<C> {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.bot_id.set(ready.user.id).ok();

        let config = &self.ctx.config().discord;
        ctx.set_presence(build_activity(config), parse_online_status(&config.status));

        info!(name = %ready.user.name, guilds = ready.guilds.len(), "Discord bot connected");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let prefixes = self.prefixes();
        let Some(Invocation { command, args }) = commands::parse(&msg.content, &prefixes) else {
            return;
        };
        debug!(command = command.name(), author = %msg.author.id, "command invoked");

        let config = self.ctx.config();
        let reply = match command {
            Command::Eval => {
                let app = Arc::clone(&self.ctx);
                let http = Arc::clone(&ctx.http);
                let pending = self.pending.clone();
                let args = args.to_string();
                tokio::spawn(async move {
                    crate::session::run(app, http, pending, msg, args, prefixes).await;
                });
                return;
            }
            Command::Help => commands::help_text(args, commands::display_prefix(&prefixes)),
            Command::Invite => match ctx.http.get_current_application_info().await {
                Ok(app_info) => {
                    commands::invite_url(app_info.id.get(), msg.guild_id.map(|g| g.get()))
                }
                Err(e) => {
                    warn!(error = %e, "could not fetch application info");
                    return;
                }
            },
            other => match commands::static_reply(other, config, &prefixes) {
                Some(text) => text,
                None => return,
            },
        };

        if let Err(e) = msg.channel_id.say(&ctx.http, reply).await {
            warn!(error = %e, command = command.name(), "Discord send failed");
        }
    }

    async fn message_update(
        &self,
        _ctx: Context,
        _old_if_available: Option<Message>,
        _new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        // Embed-only updates carry no content.
        let Some(content) = event.content else {
            return;
        };
        self.pending
            .forward(event.id, ReevalEvent::Edited { content });
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        let Some(user_id) = reaction.user_id else {
            return;
        };
        if self.bot_id.get() == Some(&user_id) {
            return;
        }
        self.pending.forward(
            reaction.message_id,
            ReevalEvent::Reacted {
                user_id: evalbot_core::UserId(user_id.get()),
                emoji: reaction.emoji.to_string(),
            },
        );
    }
}

/// Parse a config status string into serenity's `OnlineStatus`.
fn parse_online_status(s: &str) -> OnlineStatus {
    match s.to_lowercase().as_str() {
        "idle" => OnlineStatus::Idle,
        "dnd" | "do_not_disturb" => OnlineStatus::DoNotDisturb,
        "invisible" => OnlineStatus::Invisible,
        _ => OnlineStatus::Online,
    }
}

/// Build an `ActivityData` from the Discord config.
fn build_activity(config: &DiscordConfig) -> Option<ActivityData> {
    let name = config.activity_name.as_deref()?;
    let kind = config.activity_type.as_deref().unwrap_or("playing");
    Some(match kind.to_lowercase().as_str() {
        "listening" => ActivityData::listening(name),
        "watching" => ActivityData::watching(name),
        "competing" => ActivityData::competing(name),
        "custom" => ActivityData::custom(name),
        _ => ActivityData::playing(name),
    })
}
