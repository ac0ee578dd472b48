//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! health checks, server, config watcher
//!     → tracing events (structured fields)
//!     → logging.rs subscriber (stdout, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID attached to every inbound request span

pub mod logging;
