// responses/json.rs
use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};
use serde::Serialize;

/// Serialize `value` as a JSON response body.
pub fn json_response<T: Serialize>(status: u16, value: &T) -> ResultResp {
    let body = serde_json::to_string(value).map_err(|_| ServerError::InternalError)?;

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .map_err(|_| ServerError::InternalError)
}
