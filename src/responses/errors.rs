use crate::errors::ServerError;
use astra::{Body, Response, ResponseBuilder};

pub type ResultResp = Result<Response, ServerError>;

/// Convert a ServerError into a JSON error response. The report
/// endpoints are API-shaped, so errors carry the message in a JSON body
/// rather than an HTML page.
pub fn error_to_response(err: ServerError) -> Response {
    let status = match &err {
        ServerError::NotFound => 404,
        ServerError::BadRequest(_) => 400,
        ServerError::DbError(_) | ServerError::InternalError => 500,
        ServerError::RunFailed(_) => 502,
    };

    let body = serde_json::json!({ "error": { "message": err.to_string() } });

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
