//! One eval command, from the first run through any re-runs on edit.

use std::sync::Arc;
use std::time::Duration;

use serenity::http::Http;
use serenity::model::channel::{Message, ReactionType};
use serenity::model::mention::Mentionable;
use tokio::sync::mpsc;
use tracing::{info, warn};

use evalbot_core::UserId;
use evalbot_sandbox::pipeline::evaluate;
use evalbot_sandbox::{
    extract, EvalContext, ReevalEvent, ReevalSession, ReevalState, REEVAL_EMOJI,
};

use crate::commands::{self, Command};
use crate::error::DiscordError;
use crate::pending::PendingReevals;
use crate::send;

const EVENT_BUFFER: usize = 16;

/// Code for the first round and whether it still needs markdown extraction.
struct Submission {
    code: String,
    raw: bool,
}

/// Run the eval command invoked by `msg` with argument `args`.
///
/// `prefixes` are the command prefixes in effect, used to parse edits.
pub async fn run<C: EvalContext + 'static>(
    app: Arc<C>,
    http: Arc<Http>,
    pending: PendingReevals,
    msg: Message,
    args: String,
    prefixes: Vec<String>,
) {
    let author = UserId(msg.author.id.get());
    let mention = msg.author.id.mention().to_string();

    if app.jobs().is_running(author) {
        let _ = msg.channel_id.say(&http, send::busy_message(&mention)).await;
        return;
    }

    let submission = if !args.is_empty() {
        Some(Submission {
            code: args,
            raw: false,
        })
    } else {
        crate::attach::code_from_attachments(&msg.attachments)
            .await
            .map(|code| Submission { code, raw: true })
    };
    let Some(Submission { mut code, mut raw }) = submission.filter(|s| !s.code.is_empty()) else {
        let help = commands::command_help(Command::Eval, commands::display_prefix(&prefixes));
        let _ = msg.channel_id.say(&http, help).await;
        return;
    };

    info!(
        author = %msg.author.name,
        author_id = %author,
        guild = ?msg.guild_id,
        "received code for evaluation:\n{code}"
    );

    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
    let _registration = pending.register(msg.id, tx);
    let config = app.config().eval.clone();
    let mut last_content = msg.content.clone();

    loop {
        let Some(job) = app.jobs().try_acquire(author) else {
            let _ = msg.channel_id.say(&http, send::busy_message(&mention)).await;
            break;
        };
        code = round_code(&code, raw);
        let outcome = send_eval(app.as_ref(), &http, &msg, &code).await;
        info!(
            author_id = %author,
            elapsed_ms = job.job().elapsed().num_milliseconds(),
            "eval round finished"
        );
        drop(job);

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, author = %author, "eval failed");
                let _ = msg
                    .channel_id
                    .say(&http, format!("{mention} :x: {}", failure_notice(&e)))
                    .await;
                break;
            }
        };

        let mut session = ReevalSession::new(
            author,
            last_content.clone(),
            Duration::from_secs(config.edit_timeout_secs),
            Duration::from_secs(config.reaction_timeout_secs),
        );
        let Some(edited) = await_rerun(&http, &msg, &response, &mut session, &mut rx).await else {
            break;
        };
        let Some(next) = commands::code_from_edit(&edited, &prefixes) else {
            break;
        };
        info!(message = %msg.id, "re-evaluating code:\n{next}");
        last_content = edited;
        code = next;
        raw = false;
    }
}

/// The code sent to the sandbox for one round. Attachment source (`raw`) is
/// run verbatim; anything typed into a message goes through extraction.
fn round_code(code: &str, raw: bool) -> String {
    if raw {
        code.to_string()
    } else {
        extract(code).code
    }
}

/// Evaluate `code` and post the result as a reply.
async fn send_eval<C: EvalContext>(
    app: &C,
    http: &Arc<Http>,
    msg: &Message,
    code: &str,
) -> Result<Message, DiscordError> {
    let _ = msg.channel_id.broadcast_typing(http).await;
    let (_, formatted) = evaluate(app.sandbox(), code).await?;
    let reply = send::send_result(http, msg.channel_id, msg.author.id, &formatted).await?;
    Ok(reply)
}

/// Drive the re-run prompt for one posted reply.
///
/// Returns the edited message content once the author confirms a re-run.
async fn await_rerun(
    http: &Arc<Http>,
    msg: &Message,
    response: &Message,
    session: &mut ReevalSession,
    events: &mut mpsc::Receiver<ReevalEvent>,
) -> Option<String> {
    let reaction = ReactionType::Unicode(REEVAL_EMOJI.to_string());
    let mut prompted = false;
    loop {
        match session.advance(events).await.clone() {
            ReevalState::AwaitingEdit => continue,
            ReevalState::AwaitingReaction { .. } => {
                if !prompted {
                    let _ = http.create_reaction(msg.channel_id, msg.id, &reaction).await;
                    prompted = true;
                }
            }
            ReevalState::Restart { content } => {
                clear_prompt(http, msg, &reaction).await;
                if let Err(e) = http.delete_message(response.channel_id, response.id, None).await {
                    warn!(error = %e, "could not delete previous result");
                }
                return Some(content);
            }
            ReevalState::Terminated(reason) => {
                if prompted {
                    clear_prompt(http, msg, &reaction).await;
                }
                info!(message = %msg.id, ?reason, "re-eval window closed");
                return None;
            }
        }
    }
}

async fn clear_prompt(http: &Arc<Http>, msg: &Message, reaction: &ReactionType) {
    // Needs Manage Messages; in DMs only our own reaction can go.
    if http
        .delete_message_reaction_emoji(msg.channel_id, msg.id, reaction)
        .await
        .is_err()
    {
        let _ = http.delete_reaction_me(msg.channel_id, msg.id, reaction).await;
    }
}

fn failure_notice(err: &DiscordError) -> &'static str {
    match err {
        DiscordError::Sandbox(_) => "The eval service is unavailable right now. Please try again later",
        _ => "Could not post the eval result",
    }
}

#[cfg(test)]
mod tests {
    use evalbot_core::EvalbotConfig;

    use super::*;

    fn prefixes() -> Vec<String> {
        commands::prefixes(&EvalbotConfig::default(), Some(42))
    }

    #[test]
    fn attachment_source_is_run_verbatim() {
        let source = "doc = \"\"\"\n```py\nnot code\n```\n\"\"\"\nprint(doc)\n";
        assert_eq!(round_code(source, true), source);
    }

    #[test]
    fn typed_code_is_extracted() {
        assert_eq!(round_code("```py\n    print(1)\n```", false), "print(1)");
    }

    #[test]
    fn rerun_after_attachment_round_is_extracted() {
        let edited = "!e ```py\nprint(2)\n```";
        let next = commands::code_from_edit(edited, &prefixes()).unwrap();
        assert_eq!(round_code(&next, false), "print(2)");
    }

    #[test]
    fn edit_without_code_ends_the_chain() {
        assert_eq!(commands::code_from_edit("!eval", &prefixes()), None);
        assert_eq!(commands::code_from_edit("!e   ", &prefixes()), None);
    }

    #[test]
    fn transport_failures_get_distinct_notices() {
        let down = DiscordError::Sandbox(evalbot_sandbox::SandboxError::Unavailable("refused".into()));
        assert!(failure_notice(&down).contains("unavailable"));
        assert_eq!(failure_notice(&DiscordError::NoToken), "Could not post the eval result");
    }
}
