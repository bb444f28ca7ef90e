//! The JSON wire record exchanged between nodes
//!
//! A record is a JSON object with a required `uri` string and optional
//! `locators` array and `ext.meta` object. Decoding is lenient on the
//! optional parts: malformed locators or metadata are logged and
//! defaulted, a missing or unusable `uri` fails the whole record.
//! Payload bytes never travel inside the JSON; full publishes and
//! get-hits carry them out-of-band.

use serde_json::{json, Map, Value};

use crate::error::{CoreError, Result};
use crate::ndo::{Locator, Ndo};

/// Encode an NDO as a wire record.
pub fn encode(ndo: &Ndo) -> Value {
    let locators: Vec<String> = ndo.locators().iter().map(|l| l.to_string()).collect();
    let mut meta = Map::new();
    for (key, value) in ndo.metadata().iter() {
        meta.insert(key.to_string(), Value::String(value.to_string()));
    }
    json!({
        "uri": ndo.uri(),
        "locators": locators,
        "ext": { "meta": meta },
    })
}

/// Encode an NDO as wire record bytes.
pub fn encode_bytes(ndo: &Ndo) -> Vec<u8> {
    encode(ndo).to_string().into_bytes()
}

/// Decode a wire record into an NDO.
pub fn decode(value: &Value) -> Result<Ndo> {
    let uri = value
        .get("uri")
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::MissingField("uri".to_string()))?;
    let mut builder = Ndo::from_uri(uri)?;

    match value.get("locators") {
        None => {}
        Some(Value::Array(entries)) => {
            for entry in entries {
                let text = match entry.as_str() {
                    Some(text) => text,
                    None => {
                        log::warn!("Dropping non-string locator in record for {}", uri);
                        continue;
                    }
                };
                match text.parse::<Locator>() {
                    Ok(locator) => builder = builder.locator(locator),
                    Err(e) => log::warn!("Dropping locator in record for {}: {}", uri, e),
                }
            }
        }
        Some(_) => log::warn!("Ignoring non-array locators in record for {}", uri),
    }

    match value.get("ext").and_then(|ext| ext.get("meta")) {
        None => {}
        Some(Value::Object(entries)) => {
            for (key, entry) in entries {
                let text = match entry.as_str() {
                    Some(text) => text.to_string(),
                    None => entry.to_string(),
                };
                builder = builder.metadata(key.clone(), text);
            }
        }
        Some(_) => log::warn!("Ignoring non-object ext.meta in record for {}", uri),
    }

    Ok(builder.build())
}

/// Decode wire record bytes into an NDO.
pub fn decode_bytes(bytes: &[u8]) -> Result<Ndo> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| CoreError::MalformedRecord(e.to_string()))?;
    decode(&value)
}
