//! Student housing marketplace: listings, bookings, favorites and profiles.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{client, error, model};

// === MODULE WIRING ===
pub mod module;
pub use module::Housing;

// === CLIENT SESSION ===
pub mod session;

// === INTERNAL MODULES ===
// Exposed for integration tests and the server binary; other crates should
// program against `contract`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
