pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use handlers::AuthCellState;
pub use services::session_state::{AuthPhase, AuthState, SessionStateService};
