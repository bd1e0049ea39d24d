//! Account provisioning and administration. Accounts are never
//! self-service: creation, deactivation, role changes, and forced password
//! resets are administrator actions guarded per route.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use services::provisioning::ProvisioningService;
