//! Maps raw responses onto payloads or the error taxonomy.

use gatehouse_domain::{ApiResponse, ResponseCodes};
use serde_json::Value;

use crate::ApplicationError;
use crate::ports::RawResponse;

/// Classifies a raw response.
///
/// A 2xx response is unwrapped from its envelope; the business code then
/// decides between payload, `Unauthorized` and `Business`. Any other status
/// maps through `status_error`.
///
/// # Errors
///
/// Returns the taxonomy error for every non-success outcome.
pub fn classify_response(
    response: &RawResponse,
    codes: ResponseCodes,
) -> Result<Value, ApplicationError> {
    if !response.is_success() {
        return Err(status_error(response.status, &response.body));
    }

    let envelope: ApiResponse<Value> = serde_json::from_slice(&response.body)?;
    if envelope.code == codes.success {
        return Ok(envelope.data.unwrap_or(Value::Null));
    }

    let message = if envelope.message.is_empty() {
        format!("Request failed ({})", envelope.code)
    } else {
        envelope.message
    };
    if envelope.code == codes.unauthorized {
        Err(ApplicationError::Unauthorized { message })
    } else {
        Err(ApplicationError::Business {
            code: envelope.code,
            message,
        })
    }
}

/// Maps a non-2xx HTTP status to an error with a user-facing message.
///
/// A 401 keeps the server's envelope message when one is present.
#[must_use]
pub fn status_error(status: u16, body: &[u8]) -> ApplicationError {
    match status {
        401 => {
            let message = serde_json::from_slice::<ApiResponse<Value>>(body)
                .ok()
                .map(|envelope| envelope.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| "Session expired, please log in again".to_string());
            ApplicationError::Unauthorized { message }
        }
        403 => ApplicationError::Forbidden {
            message: "Access denied".to_string(),
        },
        404 => ApplicationError::NotFound {
            message: "Requested resource not found".to_string(),
        },
        500..=599 => ApplicationError::ServerError {
            status,
            message: "Internal server error".to_string(),
        },
        other => ApplicationError::HttpStatus {
            status: other,
            message: format!("Connection error ({other})"),
        },
    }
}
