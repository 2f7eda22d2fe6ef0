//! Shared context interface for chat adapters.
//!
//! Implemented by the host process (`evalbot-gateway`); adapters only see this
//! trait, so they never construct their own HTTP client or job table.

use evalbot_core::EvalbotConfig;

use crate::client::Sandbox;
use crate::job::JobRegistry;

pub trait EvalContext: Send + Sync {
    fn config(&self) -> &EvalbotConfig;
    fn sandbox(&self) -> &dyn Sandbox;
    fn jobs(&self) -> &JobRegistry;
}
