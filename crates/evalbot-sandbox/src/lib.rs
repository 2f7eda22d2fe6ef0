//! evalbot-sandbox — everything between a chat message and a chat reply that
//! does not depend on the chat platform.
//!
//! - [`extract`] recovers the code a user meant to run from markdown-ish text.
//! - [`format`] turns a sandbox result into a bounded, mention-safe reply.
//! - [`client`] talks to the snekbox HTTP service.
//! - [`job`] and [`reeval`] hold the per-user evaluation lifecycle.

pub mod attachment;
pub mod client;
pub mod context;
pub mod error;
pub mod extract;
pub mod format;
pub mod job;
pub mod pipeline;
pub mod reeval;
pub mod signal;
pub mod types;

pub use client::{Sandbox, SnekboxClient};
pub use context::EvalContext;
pub use error::SandboxError;
pub use extract::{dedent, extract};
pub use format::format_result;
pub use job::{Job, JobGuard, JobRegistry};
pub use reeval::{ReevalEvent, ReevalSession, ReevalState, Termination, REEVAL_EMOJI};
pub use types::{ExecutionResult, ExtractedCode, ExtractionReason, FormattedOutput, StatusIcon};
