//! One evaluation: send code to the sandbox and format what comes back.

use tracing::info;

use crate::client::Sandbox;
use crate::error::SandboxError;
use crate::format::format_result;
use crate::types::{ExecutionResult, FormattedOutput};

/// Run already-extracted `code` and format the result for display.
pub async fn evaluate(
    sandbox: &dyn Sandbox,
    code: &str,
) -> Result<(ExecutionResult, FormattedOutput), SandboxError> {
    let result = sandbox.eval(code).await?;
    info!(sandbox = sandbox.name(), returncode = ?result.returncode, "eval job finished");
    let formatted = format_result(&result);
    Ok((result, formatted))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::format::NO_OUTPUT;
    use crate::types::StatusIcon;

    struct Echo;

    #[async_trait]
    impl Sandbox for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        async fn eval(&self, code: &str) -> Result<ExecutionResult, SandboxError> {
            Ok(ExecutionResult::new(code, Some(0)))
        }
    }

    struct Down;

    #[async_trait]
    impl Sandbox for Down {
        fn name(&self) -> &str {
            "down"
        }
        async fn eval(&self, _code: &str) -> Result<ExecutionResult, SandboxError> {
            Err(SandboxError::Status {
                status: 503,
                body: "maintenance".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn evaluate_formats_sandbox_output() {
        let (result, formatted) = evaluate(&Echo, "hello\nworld\n").await.unwrap();
        assert_eq!(result.returncode, Some(0));
        assert_eq!(formatted.display_text, "001 | hello\n002 | world");
        assert_eq!(formatted.status_icon, StatusIcon::Success);
    }

    #[tokio::test]
    async fn evaluate_handles_empty_output() {
        let (_, formatted) = evaluate(&Echo, "").await.unwrap();
        assert_eq!(formatted.display_text, NO_OUTPUT);
        assert_eq!(formatted.status_icon, StatusIcon::Warning);
    }

    #[tokio::test]
    async fn evaluate_propagates_transport_failure() {
        let err = evaluate(&Down, "print(1)").await.unwrap_err();
        assert!(matches!(err, SandboxError::Status { status: 503, .. }));
    }
}
