//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Wire store/fetcher/coordinator → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger → Stop accepting → Drain in-flight → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
