/// Errors from talking to the execution service.
///
/// None of these describe the user's code; a failing program still comes back
/// as an `Ok(ExecutionResult)`.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Connection refused or request timed out.
    #[error("sandbox unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("sandbox returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected sandbox response: {0}")]
    Parse(String),
}
