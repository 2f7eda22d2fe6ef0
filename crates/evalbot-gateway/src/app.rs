use evalbot_core::EvalbotConfig;
use evalbot_sandbox::{EvalContext, JobRegistry, Sandbox, SnekboxClient};

/// Central shared state, passed as `Arc<AppState>` to the Discord adapter.
pub struct AppState {
    pub config: EvalbotConfig,
    pub sandbox: SnekboxClient,
    /// Users with an evaluation in flight.
    pub jobs: JobRegistry,
}

impl AppState {
    pub fn new(config: EvalbotConfig, sandbox: SnekboxClient) -> Self {
        Self {
            config,
            sandbox,
            jobs: JobRegistry::new(),
        }
    }
}

impl EvalContext for AppState {
    fn config(&self) -> &EvalbotConfig {
        &self.config
    }

    fn sandbox(&self) -> &dyn Sandbox {
        &self.sandbox
    }

    fn jobs(&self) -> &JobRegistry {
        &self.jobs
    }
}
