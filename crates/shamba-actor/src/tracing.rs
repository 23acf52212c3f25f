//! # Observability & Tracing
//!
//! [`setup_tracing`] installs structured logging for every actor in the process.
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: `Actor started` / `Shutdown`, tagged with `machine_type`
//! - **Commands**: one debug line per command with its full payload
//! - **Events**: timer ticks and child-task results at trace level
//! - **Failures**: commands whose machine returned an error, at warn level
//!
//! ## Usage
//!
//! ```bash
//! # Compact logs (default)
//! RUST_LOG=info cargo run
//!
//! # Show command payloads
//! RUST_LOG=debug cargo run
//!
//! # Every timer tick and fetch result
//! RUST_LOG=trace cargo run
//! ```
//!
//! With `RUST_LOG` unset the filter falls back to `info`.
//!
//! ## Output Format
//!
//! The compact formatter hides the module path (`with_target(false)`); the actor loop tags
//! every line with `machine_type` instead, so a payment poll reads like:
//!
//! ```text
//! INFO Actor started machine_type="PaymentPoller"
//! INFO Payment verification started order_id=abc123
//! INFO Payment confirmed order_id=abc123 attempt=3
//! ```
use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();
}
