//! Maps raw responses to a JSON payload or a typed failure.

use serde_json::{Map, Value};

use crate::clients::errors::{FailureKind, RequestError};
use crate::clients::http_request::HttpMethod;
use crate::clients::http_response::{HttpResponse, ResponseBody};

/// Classifies transport responses.
///
/// Rules are applied in order: 429 is rate limiting, any 5xx is a server
/// error, any other 4xx is a client error. Everything else is decoded as
/// JSON, with a blank body meaning an empty object.
///
/// # Example
///
/// ```rust
/// use powo_api::{FailureKind, HttpMethod, HttpResponse, ResponseClassifier};
/// use serde_json::json;
///
/// let classifier = ResponseClassifier;
/// let url = "https://powo.science.kew.org/api/2/search";
///
/// let ok = classifier.classify(HttpResponse::new(200, r#"{"results":[]}"#), HttpMethod::Get, url);
/// assert_eq!(ok.unwrap(), json!({"results": []}));
///
/// let limited = classifier.classify(HttpResponse::new(429, ""), HttpMethod::Get, url);
/// assert_eq!(limited.unwrap_err().kind, FailureKind::RateLimited);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseClassifier;

impl ResponseClassifier {
    /// Classifies one response.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] for 4xx/5xx statuses or an undecodable body.
    pub fn classify(
        &self,
        response: HttpResponse,
        method: HttpMethod,
        url: &str,
    ) -> Result<Value, RequestError> {
        let status = response.code;
        let failure = match status {
            429 => Some((
                FailureKind::RateLimited,
                "Rate limited by POWO (HTTP 429)".to_string(),
            )),
            s if s >= 500 => Some((
                FailureKind::ServerError,
                format!("POWO server error (HTTP {s})"),
            )),
            s if s >= 400 => Some((
                FailureKind::ClientError,
                format!("POWO request failed (HTTP {s})"),
            )),
            _ => None,
        };

        if let Some((kind, message)) = failure {
            return Err(Self::failure(kind, message, response, method, url));
        }

        let parsed = match &response.body {
            ResponseBody::Json(Value::Null) => return Ok(Value::Object(Map::new())),
            ResponseBody::Json(value) => return Ok(value.clone()),
            ResponseBody::Text(text) if text.trim().is_empty() => {
                return Ok(Value::Object(Map::new()))
            }
            ResponseBody::Text(text) => serde_json::from_str::<Value>(text),
        };

        parsed.map_err(|e| {
            Self::failure(
                FailureKind::ParseError,
                format!("Failed to parse JSON response: {e}"),
                response,
                method,
                url,
            )
        })
    }

    fn failure(
        kind: FailureKind,
        message: String,
        response: HttpResponse,
        method: HttpMethod,
        url: &str,
    ) -> RequestError {
        RequestError {
            kind,
            message,
            status: Some(response.code),
            method,
            url: url.to_string(),
            body: Some(response.body),
            headers: response.headers,
        }
    }
}
