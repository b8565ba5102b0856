// Public contracts for the Fedelytics API
// This crate defines request/response DTOs and their OpenAPI schemas.
// Storage row types live in fedelytics-storage; these are the wire shapes only.

pub mod common;
pub mod project;
pub mod telemetry;

pub use common::*;
pub use project::*;
pub use telemetry::*;
