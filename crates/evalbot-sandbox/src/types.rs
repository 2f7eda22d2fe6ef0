use std::fmt;

use serde::{Deserialize, Serialize};

/// Which markup the extractor recognised. Kept for log lines only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionReason {
    /// A single ```-fenced block without a language tag.
    FencedBlock,
    /// A single ```-fenced block tagged with a language (tag as written).
    FencedBlockWithLanguage(String),
    /// Several ```-fenced blocks, concatenated.
    MultipleFencedBlocks,
    /// The first inline span; the value is the delimiter width (1 or 2).
    InlineCode(usize),
    /// No markup at all: the whole message is the code.
    RawFallback,
}

impl fmt::Display for ExtractionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionReason::FencedBlock => write!(f, "plain code block"),
            ExtractionReason::FencedBlockWithLanguage(lang) => {
                write!(f, "'{lang}' highlighted code block")
            }
            ExtractionReason::MultipleFencedBlocks => write!(f, "several code blocks"),
            ExtractionReason::InlineCode(width) => {
                write!(f, "{}-enclosed inline code", "`".repeat(*width))
            }
            ExtractionReason::RawFallback => write!(f, "unformatted or badly formatted code"),
        }
    }
}

/// Output of [`crate::extract::extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCode {
    pub code: String,
    pub reason: ExtractionReason,
}

/// Result record returned by the snekbox `/eval` endpoint.
///
/// A missing `returncode` means snekbox itself failed and `stdout` carries its
/// own error text rather than the program's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub stdout: String,
    #[serde(default)]
    pub returncode: Option<i32>,
}

impl ExecutionResult {
    pub fn new(stdout: impl Into<String>, returncode: Option<i32>) -> Self {
        Self {
            stdout: stdout.into(),
            returncode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    /// Nothing was printed.
    Warning,
    /// Printed something and exited with 0.
    Success,
    /// Printed something and exited non-zero (or the sandbox failed).
    Error,
}

impl StatusIcon {
    /// Discord emoji shortcode.
    pub fn as_emoji(self) -> &'static str {
        match self {
            StatusIcon::Warning => ":warning:",
            StatusIcon::Success => ":white_check_mark:",
            StatusIcon::Error => ":x:",
        }
    }
}

/// Everything needed to render a reply for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedOutput {
    pub status_message: String,
    pub status_icon: StatusIcon,
    /// Text safe to put inside a code block in the reply.
    pub display_text: String,
    /// Full output for upload as a file, set when the inline text was
    /// truncated or suppressed.
    pub full_output: Option<Vec<u8>>,
}
