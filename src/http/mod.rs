//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all route)
//!     → request.rs (request ID)
//!     → dispatch.rs (location lookup, rule match)
//!     → 302 / 404 / 500
//! ```

pub mod dispatch;
pub mod request;
pub mod server;

pub use dispatch::{normalize_path, Dispatcher, Outcome};
pub use request::{request_id, MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
