pub mod adapter;
pub mod attach;
pub mod commands;
pub mod error;
pub mod handler;
pub mod pending;
pub mod send;
pub mod session;

pub use adapter::DiscordAdapter;
pub use error::DiscordError;
