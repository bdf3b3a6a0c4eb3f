//! wiscv-session
//!
//! The application layer a desktop shell calls into: configuration, session
//! state (norm tables + database connection), and the command surface.
//! Commands return `Result<T, String>` so every failure is a message the UI
//! can show next to the form.

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

pub use config::{SessionConfig, has_config, load_config, save_config};
pub use error::SessionError;
pub use state::SessionState;

/// Install the session's log subscriber. The embedding shell calls this
/// once at startup; `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
