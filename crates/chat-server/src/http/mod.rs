//! HTTP layer: axum router, handlers, and the protected-route gate.
//!
//! Errors go out as `{ error, details? }` with a 400 or 500 status.

pub mod error;
pub mod extractors;
pub mod gate;
pub mod handlers;
pub mod router;
