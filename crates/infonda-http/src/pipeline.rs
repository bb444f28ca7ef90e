//! Response interpretation pipeline
//!
//! Peer responses are interpreted in strict stages, each with its own
//! failure: entity present, content type present, body readable, payload
//! parseable. The distinct errors let callers tell a transport fault
//! from a peer speaking the protocol wrongly.
//!
//! A get-hit that carries content octets is a `multipart/form-data`
//! body with a `record` part (the JSON wire record) and an `octets`
//! part (the raw content). This module both parses and renders that
//! shape so the client and the peer endpoint stay in agreement.

use serde_json::Value;

use crate::error::{HttpError, Result};

/// Require a content type header value.
pub fn require_content_type(header: Option<&str>) -> Result<String> {
    match header {
        Some(value) => Ok(value.to_string()),
        None => Err(HttpError::MissingContentType),
    }
}

/// Require a non-empty response entity.
pub fn require_entity(body: Vec<u8>) -> Result<Vec<u8>> {
    if body.is_empty() {
        return Err(HttpError::MissingEntity);
    }
    Ok(body)
}

/// Parse an entity as a JSON value.
pub fn parse_json(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|e| HttpError::MalformedPayload(e.to_string()))
}

/// Parse a multipart entity into its record and optional octets parts.
pub async fn parse_record_parts(
    content_type: &str,
    body: Vec<u8>,
) -> Result<(Value, Option<Vec<u8>>)> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| HttpError::MalformedPayload(e.to_string()))?;
    let stream = futures_util::stream::iter([Ok::<Vec<u8>, std::io::Error>(body)]);
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut record = None;
    let mut octets = None;
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| HttpError::MalformedPayload(e.to_string()))?;
        let field = match field {
            Some(field) => field,
            None => break,
        };
        let name = field.name().map(|name| name.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| HttpError::MalformedPayload(e.to_string()))?;
        match name.as_deref() {
            Some("record") => record = Some(parse_json(&data)?),
            Some("octets") => octets = Some(data.to_vec()),
            other => log::warn!("Ignoring unknown multipart part {:?}", other),
        }
    }

    let record = record
        .ok_or_else(|| HttpError::MalformedPayload("multipart without a record part".to_string()))?;
    Ok((record, octets))
}

/// Render a record plus content octets as a multipart entity.
///
/// Returns the body bytes and the content type announcing the boundary.
pub fn encode_record_parts(record: &Value, octets: &[u8]) -> (Vec<u8>, String) {
    let boundary = format!("infonda-{}", infonda_core::new_id());
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"record\"\r\nContent-Type: application/json\r\n\r\n",
    );
    body.extend_from_slice(record.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"octets\"\r\nContent-Type: application/octet-stream\r\n\r\n",
    );
    body.extend_from_slice(octets);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    let content_type = format!("multipart/form-data; boundary={}", boundary);
    (body, content_type)
}
