//! Turn a snekbox result into something safe to post back into Discord.
//!
//! Program output is hostile input: it can ping users, break out of the
//! surrounding code block, or be arbitrarily long. The display text produced
//! here is mention-neutralised, never contains a run of three backticks or
//! invisible characters, and stays under 11 lines / 1000 characters. When the
//! inline text had to be cut or suppressed, the full output is handed back as
//! bytes for upload.

use tracing::info;

use crate::signal::{signal_for_returncode, SIGKILL};
use crate::types::{ExecutionResult, FormattedOutput, StatusIcon};

/// Discord's upload limit for bots without boosts.
pub const MAX_UPLOAD_BYTES: usize = 8_000_000;
/// Uploaded instead of the output when the output exceeds [`MAX_UPLOAD_BYTES`].
pub const TOO_LONG_TO_UPLOAD: &[u8] = b"too long to upload";

/// More newlines than this and the inline output is replaced by a notice.
pub const MAX_LINES: usize = 10;
/// Numbered lines kept before the truncation check.
pub const SHOWN_LINES: usize = 11;
/// Character count at which the inline output is replaced by a notice.
pub const MAX_CHARS: usize = 1000;

pub const ESCAPE_DETECTED: &str = "Code block escape attempt detected; will not output result";
pub const TRUNCATED_LINES: &str = "... (truncated - too many lines)";
pub const TRUNCATED_LENGTH: &str = "... (truncated - too long)";
pub const TRUNCATED_BOTH: &str = "... (truncated - too long, too many lines)";
pub const NO_OUTPUT: &str = "[No output]";
pub const NSJAIL_FATAL: &str = "A fatal NsJail error occurred";

const ZERO_WIDTH_SPACE: char = '\u{200B}';
const RIGHT_TO_LEFT_OVERRIDE: char = '\u{202E}';
const ESCAPE_RUN: usize = 3;

/// Build the complete reply payload for one evaluation result.
pub fn format_result(result: &ExecutionResult) -> FormattedOutput {
    let (status_message, error) = status_message(result);
    let status_icon = status_icon(result);

    let (display_text, full_output) = if error.is_empty() {
        format_output(&result.stdout)
    } else {
        (error, None)
    };

    FormattedOutput {
        status_message,
        status_icon,
        display_text,
        full_output,
    }
}

/// Human-readable status plus an error detail that replaces the output when
/// the sandbox itself failed (empty otherwise).
pub fn status_message(result: &ExecutionResult) -> (String, String) {
    match result.returncode {
        None => (
            "Your eval job has failed".to_string(),
            result.stdout.trim().to_string(),
        ),
        Some(code) if code == 128 + SIGKILL => (
            "Your eval job timed out or ran out of memory".to_string(),
            String::new(),
        ),
        Some(255) => (
            "Your eval job has failed".to_string(),
            NSJAIL_FATAL.to_string(),
        ),
        Some(code) => {
            let mut msg = format!("Your eval job has completed with return code {code}");
            if let Some(name) = signal_for_returncode(code) {
                msg.push_str(&format!(" ({name})"));
            }
            (msg, String::new())
        }
    }
}

pub fn status_icon(result: &ExecutionResult) -> StatusIcon {
    if result.stdout.trim().is_empty() {
        StatusIcon::Warning
    } else if result.returncode == Some(0) {
        StatusIcon::Success
    } else {
        StatusIcon::Error
    }
}

/// Number, bound and sanitise program output.
///
/// Returns the inline text and, if anything was cut or suppressed, the bytes
/// to upload as the full output.
pub fn format_output(stdout: &str) -> (String, Option<Vec<u8>>) {
    info!("formatting output");

    let original = stdout.trim_end_matches('\n');
    let output = neutralize_mentions(original);

    if has_escape_run(&output) {
        return (ESCAPE_DETECTED.to_string(), Some(upload_bytes(original)));
    }

    let lines = output.matches('\n').count();
    let mut display = output.clone();

    if lines > 0 {
        display = output
            .split('\n')
            .enumerate()
            .take(SHOWN_LINES)
            .map(|(i, line)| format!("{:03} | {line}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut truncated = false;
    if lines > MAX_LINES {
        truncated = true;
        display = if display.chars().count() >= MAX_CHARS {
            TRUNCATED_BOTH.to_string()
        } else {
            TRUNCATED_LINES.to_string()
        };
    } else if display.chars().count() >= MAX_CHARS {
        truncated = true;
        display = TRUNCATED_LENGTH.to_string();
    }

    let full_output = truncated.then(|| upload_bytes(&output));

    if display.is_empty() {
        display = NO_OUTPUT.to_string();
    }

    (display, full_output)
}

/// Insert a zero-width space after `<@` and `<!@` so user and role mentions
/// render as text instead of pinging.
pub fn neutralize_mentions(text: &str) -> String {
    text.replace("<@", "<@\u{200B}")
        .replace("<!@", "<!@\u{200B}")
}

/// True when `text` holds three or more consecutive backticks, RTL overrides
/// or zero-width spaces in any mix.
pub fn has_escape_run(text: &str) -> bool {
    let mut run = 0;
    for c in text.chars() {
        if matches!(c, '`' | RIGHT_TO_LEFT_OVERRIDE | ZERO_WIDTH_SPACE) {
            run += 1;
            if run >= ESCAPE_RUN {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// UTF-8 bytes of `output`, or a placeholder when too large to upload.
pub fn upload_bytes(output: &str) -> Vec<u8> {
    info!("uploading full output to Discord file");
    if output.len() > MAX_UPLOAD_BYTES {
        info!(bytes = output.len(), "full output is too long to upload");
        return TOO_LONG_TO_UPLOAD.to_vec();
    }
    output.as_bytes().to_vec()
}
