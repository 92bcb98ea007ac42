//! Business logic services for HTTP handlers.

pub mod analysis;
pub mod upload;
