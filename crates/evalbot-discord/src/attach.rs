//! Python source files attached to an eval command.

use serenity::model::channel::Attachment;
use tracing::{info, warn};

use evalbot_sandbox::attachment::{code_from_attachment, python_charset};

/// Code from the first attachment declared as Python source.
///
/// `None` when there is no such attachment, the download fails, or the bytes
/// do not decode with the declared charset.
pub async fn code_from_attachments(attachments: &[Attachment]) -> Option<String> {
    let att = attachments.iter().find(|a| {
        a.content_type
            .as_deref()
            .and_then(python_charset)
            .is_some()
    })?;

    info!(filename = %att.filename, size = att.size, "reading code from attachment");
    match download_bytes(&att.url).await {
        Ok(bytes) => code_from_attachment(att.content_type.as_deref(), &bytes),
        Err(e) => {
            warn!(error = %e, filename = %att.filename, "attachment download failed");
            None
        }
    }
}

async fn download_bytes(url: &str) -> Result<Vec<u8>, reqwest::Error> {
    let resp = reqwest::get(url).await?.error_for_status()?;
    resp.bytes().await.map(|b| b.to_vec())
}
