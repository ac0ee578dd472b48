//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign x-request-id)
//!     → healthz.rs (run checks, render verdict)
//!     → Send to orchestrator
//! ```

pub mod healthz;
pub mod request;
pub mod server;

pub use healthz::{healthz_router, install_handler};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
