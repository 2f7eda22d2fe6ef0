//! Rendering an evaluation result as a Discord reply.

use std::sync::Arc;

use serenity::builder::{CreateAttachment, CreateMessage};
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, UserId};
use serenity::model::mention::Mentionable;
use tracing::debug;

use evalbot_sandbox::FormattedOutput;

/// File name of the full-output attachment.
pub const OUTPUT_FILE_NAME: &str = "output.txt";

/// Reply body: mention, icon, status, then the display text in a code block.
pub fn compose_reply(mention: &str, formatted: &FormattedOutput) -> String {
    let mut text = format!(
        "{mention} {} {}.\n\n```\n{}\n```",
        formatted.status_icon.as_emoji(),
        formatted.status_message,
        formatted.display_text
    );
    if formatted.full_output.is_some() {
        text.push_str("\nFull output: ");
    }
    text
}

pub fn busy_message(mention: &str) -> String {
    format!("{mention} You've already got a job running - please wait for it to finish!")
}

/// Post the result to `channel_id`, attaching the full output when present.
pub async fn send_result(
    http: &Arc<Http>,
    channel_id: ChannelId,
    author: UserId,
    formatted: &FormattedOutput,
) -> Result<Message, serenity::Error> {
    let mut builder =
        CreateMessage::new().content(compose_reply(&author.mention().to_string(), formatted));
    if let Some(blob) = &formatted.full_output {
        debug!(bytes = blob.len(), "attaching full output");
        builder = builder.add_file(CreateAttachment::bytes(blob.clone(), OUTPUT_FILE_NAME));
    }
    channel_id.send_message(http, builder).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalbot_sandbox::StatusIcon;

    fn output(blob: Option<&[u8]>) -> FormattedOutput {
        FormattedOutput {
            status_message: "Your eval job has completed with return code 0".to_string(),
            status_icon: StatusIcon::Success,
            display_text: "001 | hi".to_string(),
            full_output: blob.map(<[u8]>::to_vec),
        }
    }

    #[test]
    fn reply_without_blob() {
        assert_eq!(
            compose_reply("<@1>", &output(None)),
            "<@1> :white_check_mark: Your eval job has completed with return code 0.\n\n```\n001 | hi\n```"
        );
    }

    #[test]
    fn reply_with_blob_points_at_attachment() {
        let text = compose_reply("<@1>", &output(Some(b"hi")));
        assert!(text.ends_with("```\nFull output: "));
    }

    #[test]
    fn busy_message_mentions_author() {
        assert_eq!(
            busy_message("<@1>"),
            "<@1> You've already got a job running - please wait for it to finish!"
        );
    }
}
