use evalbot_sandbox::SandboxError;

/// Errors produced by the Discord adapter.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("serenity error: {0}")]
    Serenity(#[from] serenity::Error),

    #[error("sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("no bot token configured")]
    NoToken,
}
