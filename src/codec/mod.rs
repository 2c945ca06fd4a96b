pub mod xml;

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use tracing::{debug, error};

use crate::{
    error::{AppError, AppResult},
    negotiate::{Format, Negotiated},
};

/// Decodes a request body into a generic key/value mapping.
///
/// Anything that does not parse, is not a mapping, or is an empty mapping is
/// reported as a malformed payload.
pub fn decode(format: Format, body: &[u8]) -> AppResult<Map<String, Value>> {
    let malformed = || AppError::MalformedPayload(format);

    let text = std::str::from_utf8(body).map_err(|_| malformed())?;
    let value = match format {
        Format::Json => serde_json::from_str::<Value>(text).map_err(|err| {
            debug!(error = %err, "json payload rejected");
            malformed()
        })?,
        Format::Xml => xml::to_value(text).map_err(|err| {
            debug!(error = %err, "xml payload rejected");
            malformed()
        })?,
    };

    match value {
        Value::Object(map) if !map.is_empty() => Ok(map),
        _ => Err(malformed()),
    }
}

/// A successful outcome, not yet encoded.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self { status: StatusCode::OK, body: Some(body) }
    }

    pub fn created(body: Value) -> Self {
        Self { status: StatusCode::CREATED, body: Some(body) }
    }

    pub fn no_content() -> Self {
        Self { status: StatusCode::NO_CONTENT, body: None }
    }
}

pub fn encode(format: Format, status: StatusCode, body: Option<&Value>) -> Response {
    let bytes = match body {
        None => Ok(Vec::new()),
        Some(value) => match format {
            Format::Json => serde_json::to_vec(value).map_err(anyhow::Error::from),
            Format::Xml => xml::from_value(value),
        },
    };

    match bytes {
        Ok(bytes) => {
            let mut resp = (status, Body::from(bytes)).into_response();
            resp.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(format.media_type()));
            resp
        },
        Err(err) => {
            error!(error = %err, format = %format, "failed to encode response body");
            let body = json!({ "message": "An unexpected error occurred." }).to_string();
            let mut resp = (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            resp.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(Format::Json.media_type()));
            resp
        },
    }
}

impl Negotiated {
    pub fn decode(&self, body: &[u8]) -> AppResult<Map<String, Value>> {
        decode(self.input, body)
    }

    /// Turns a handler outcome into a response in the negotiated output format.
    pub fn respond(&self, result: AppResult<Reply>) -> Response {
        match result {
            Ok(reply) => encode(self.output, reply.status, reply.body.as_ref()),
            Err(err) => self.reject(err),
        }
    }

    pub fn reject(&self, err: AppError) -> Response {
        match &err {
            AppError::Internal(inner) => error!(error = ?inner, "request failed"),
            other => debug!(status = %other.status(), error = %other, "request rejected"),
        }
        encode(self.output, err.status(), Some(&err.body()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_object_decodes() {
        let map = decode(Format::Json, br#"{"title":"Action"}"#).unwrap();
        assert_eq!(map.get("title"), Some(&json!("Action")));
    }

    #[test]
    fn xml_object_decodes_to_same_shape() {
        let map = decode(Format::Xml, b"<category><title>Action</title></category>").unwrap();
        assert_eq!(map.get("title"), Some(&json!("Action")));
    }

    #[test]
    fn empty_or_non_mapping_payloads_are_malformed() {
        let bodies: [&[u8]; 7] = [b"", b"{}", b"[]", b"null", b"42", b"\"x\"", b"{not json"];
        for body in bodies {
            let err = decode(Format::Json, body).unwrap_err();
            assert!(matches!(err, AppError::MalformedPayload(Format::Json)), "{body:?}");
        }
        let bodies: [&[u8]; 4] = [b"", b"<r/>", b"<r>text</r>", b"<r><a>1</r>"];
        for body in bodies {
            let err = decode(Format::Xml, body).unwrap_err();
            assert!(matches!(err, AppError::MalformedPayload(Format::Xml)), "{body:?}");
        }
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let err = decode(Format::Json, &[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, AppError::MalformedPayload(_)));
    }

    #[test]
    fn encode_sets_media_type() {
        let resp = encode(Format::Xml, StatusCode::OK, Some(&json!({ "id": 1 })));
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/xml");

        let resp = encode(Format::Json, StatusCode::CREATED, Some(&json!({ "id": 1 })));
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn no_content_has_empty_body_and_media_type() {
        let resp = encode(Format::Xml, StatusCode::NO_CONTENT, None);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/xml");
    }
}
