//! The `logger` module is a simple utility that requires manual verification.
//! See `main.rs` for the bootstrap-then-reload wiring.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
