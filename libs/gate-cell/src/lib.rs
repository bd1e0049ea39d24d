//! # Gate Cell
//!
//! The pre-render authorization check run on every page request. Given the
//! request path and session cookies, the gate produces one of: allow
//! through, redirect to login, redirect to the change-password page, or
//! redirect to the caller's role home zone.
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------------------+
//! |                    Gate Cell                        |
//! +-----------------------------------------------------+
//! |  zone.rs        |  Path classification (zones)      |
//! |  models.rs      |  GateDecision + decision function |
//! |  gate.rs        |  Axum middleware (IO + redirects) |
//! |  handlers.rs    |  Page endpoints behind the gate   |
//! |  router.rs      |  Page route definitions           |
//! +-----------------------------------------------------+
//! ```
//!
//! The decision function is pure: it sees the resolved identity, the
//! resolved profile, and the path, and never touches the network. All IO
//! (session resolution, cookie rotation, profile lookup, the forced
//! sign-out on deactivated accounts) lives in the middleware, so the
//! routing rules are testable without a mock server.
//!
//! Evaluation order is strict and the earlier checks dominate the later
//! ones: unauthenticated, deactivated, must-change-password, auth-page
//! bounce, then role zones.

pub mod gate;
pub mod handlers;
pub mod models;
pub mod router;
pub mod zone;

pub use gate::request_gate;
pub use models::{decide, GateDecision};
pub use zone::{classify, PathZone};
