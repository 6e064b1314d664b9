//! Backend access.

mod client;
mod error;
mod response;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{CalorieApi, HttpApiClient, DEFAULT_API_URL};
pub use error::ApiError;
pub use response::{decode, decode_ack, error_message, ApiResponse};
