//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Rule table (JSON)
//!     → table.rs (RuleSet, loaded once)
//!     → router.rs (path index, frozen)
//!
//! Per request (path, location)
//!     → router.rs (rule lookup by exact path)
//!     → matcher.rs semantics (location, then "Default")
//!     → RouteMatch { backend, matched }
//! ```
//!
//! # Design Decisions
//! - Rules loaded at startup, immutable at runtime
//! - Exact path matching only, no prefixes or regex
//! - Deterministic: same input always yields the same backend
//! - First match wins (ordered by position in the table)

pub mod matcher;
pub mod router;
pub mod table;

pub use matcher::{apply_rules, RouteMatch};
pub use router::Router;
pub use table::{Rule, RuleSet, DEFAULT_LOCATION};
