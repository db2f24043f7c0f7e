//! Decoded API responses.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use jobboard_core::error::{ApiError, Error};
use jobboard_core::{ResponseType, Result};

fn invalid(err: impl std::fmt::Display) -> Error {
    Error::InvalidResponse {
        message: err.to_string(),
    }
}

/// A fully read HTTP reply, before success/failure is decided.
#[derive(Debug)]
pub(crate) struct RawReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn into_error(self) -> ApiError {
        ApiError::from_body(self.status.as_u16(), &self.body)
    }

    pub fn into_response(self, response_type: ResponseType) -> Result<ApiResponse> {
        let body = match response_type {
            ResponseType::Json if self.body.iter().all(u8::is_ascii_whitespace) => {
                ResponseBody::Json(serde_json::Value::Null)
            }
            ResponseType::Json => {
                ResponseBody::Json(serde_json::from_slice(&self.body).map_err(invalid)?)
            }
            ResponseType::Text => ResponseBody::Text(String::from_utf8(self.body).map_err(invalid)?),
            ResponseType::Bytes => ResponseBody::Bytes(self.body),
        };

        Ok(ApiResponse {
            status: self.status,
            headers: self.headers,
            body,
        })
    }
}

/// Decoded success body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
    Bytes(Vec<u8>),
}

/// A successful response from the backend.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl ApiResponse {
    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Deserialize the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.body {
            ResponseBody::Json(value) => T::deserialize(value).map_err(invalid),
            ResponseBody::Text(text) => serde_json::from_str(text).map_err(invalid),
            ResponseBody::Bytes(bytes) => serde_json::from_slice(bytes).map_err(invalid),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Consume the response, returning the body as bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self.body {
            ResponseBody::Json(value) => value.to_string().into_bytes(),
            ResponseBody::Text(text) => text.into_bytes(),
            ResponseBody::Bytes(bytes) => bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, body: &[u8]) -> RawReply {
        RawReply {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.to_vec(),
        }
    }

    #[test]
    fn empty_json_body_is_null() {
        let response = reply(204, b"").into_response(ResponseType::Json).unwrap();
        assert_eq!(response.body(), &ResponseBody::Json(serde_json::Value::Null));
    }

    #[test]
    fn json_body_deserializes() {
        let response = reply(200, br#"{"id": 42, "title": "Rust engineer"}"#)
            .into_response(ResponseType::Json)
            .unwrap();
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["title"], "Rust engineer");
        assert_eq!(response.status(), 200);
    }

    #[test]
    fn malformed_json_is_invalid_response() {
        let err = reply(200, b"<html>").into_response(ResponseType::Json).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }));
    }

    #[test]
    fn bytes_are_kept_verbatim() {
        let data = [0x25, 0x50, 0x44, 0x46, 0xff];
        let response = reply(200, &data).into_response(ResponseType::Bytes).unwrap();
        assert_eq!(response.into_bytes(), data.to_vec());
    }

    #[test]
    fn error_reply_parses_body() {
        let err = reply(401, br#"{"msg": "Token has expired"}"#).into_error();
        assert!(err.is_unauthorized());
        assert_eq!(err.message.as_deref(), Some("Token has expired"));
    }
}
