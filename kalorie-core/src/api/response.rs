//! The response shapes the backend produces, normalized once.
//!
//! Endpoints answer with the bare payload, with an envelope
//! `{"success": bool, "data": ..., "error": ...}`, or with a success object
//! that carries the payload's fields inline next to `"success"`. Everything
//! above the API client only ever sees `Result<T, ApiError>`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    /// The payload itself, or a success object with the payload fields inline
    Bare(T),
    /// `{"success": true, "data": <payload>}`
    Data(T),
    /// `{"success": true, "data": null}`: nothing stored yet
    Empty { message: Option<String> },
    /// `{"success": false, "error": ...}`
    Failure { error: String },
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Classifies a parsed body and decodes its payload.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value.get("success").and_then(Value::as_bool) {
            Some(false) => Ok(ApiResponse::Failure {
                error: error_text(&value).unwrap_or_else(|| "unknown error".to_string()),
            }),
            Some(true) => {
                let data = value.get("data").cloned();
                match data {
                    Some(Value::Null) => Ok(ApiResponse::Empty {
                        message: text_field(&value, "message"),
                    }),
                    Some(data) => payload(data).map(ApiResponse::Data),
                    None => payload(value).map(ApiResponse::Bare),
                }
            }
            None => payload(value).map(ApiResponse::Bare),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            ApiResponse::Bare(value) | ApiResponse::Data(value) => Ok(value),
            ApiResponse::Empty { message } => Err(ApiError::NotFound(
                message.unwrap_or_else(|| "no data".to_string()),
            )),
            ApiResponse::Failure { error } => Err(ApiError::Rejected(error)),
        }
    }
}

/// Decodes a response body into `T`, accepting every response shape.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
    ApiResponse::from_value(value)?.into_result()
}

/// Checks the body of a delete call.
///
/// Deletes answer with `{"message": ...}` or an envelope; only an explicit
/// `success: false` counts as a failure.
pub fn decode_ack(body: &str) -> Result<(), ApiError> {
    if body.trim().is_empty() {
        return Ok(());
    }
    let value: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
    match value.get("success").and_then(Value::as_bool) {
        Some(false) => Err(ApiError::Rejected(
            error_text(&value).unwrap_or_else(|| "delete failed".to_string()),
        )),
        _ => Ok(()),
    }
}

/// The server's explanation in an error body (`error`, else `message`).
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| error_text(&value))
}

fn payload<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))
}

fn error_text(value: &Value) -> Option<String> {
    text_field(value, "error").or_else(|| text_field(value, "message"))
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}
