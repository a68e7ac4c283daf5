//! Typed HTTP client for the remote generation services.
//!
//! One operation per external capability: narrative fetch, scene media and
//! audio resolution, assembly submission, task status queries, and a
//! best-effort media cleanup call. Each operation is a single
//! request/response with no internal retry; retry policy belongs to the
//! caller.

pub mod client;
pub mod error;

pub use client::GenerationClient;
pub use error::{GatewayError, GatewayResult};
