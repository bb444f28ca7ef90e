//! Peer-link wire messages
//!
//! Each exchange is one JSON request frame answered by one JSON response
//! frame. Payload octets never ride inside the JSON: a full publish
//! sends them as a follow-on raw frame after the request, a get-hit as a
//! follow-on raw frame after the response, announced by the `payload`
//! flag.

use infonda_services::Status;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    Publish {
        msgid: String,
        record: Value,
        full: bool,
    },
    Get {
        msgid: String,
        record: Value,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Response {
    Publish {
        msgid: String,
        status: Status,
    },
    Get {
        msgid: String,
        status: Status,
        record: Option<Value>,
        payload: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = Request::Get {
            msgid: "id123".to_string(),
            record: json!({ "uri": "ni://a/sha-256;h" }),
        };
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["type"], "get");
        assert_eq!(encoded["msgid"], "id123");
        assert_eq!(encoded["record"]["uri"], "ni://a/sha-256;h");
    }

    #[test]
    fn test_response_roundtrip() {
        let response = Response::Get {
            msgid: "id123".to_string(),
            status: Status::Ok,
            record: Some(json!({ "uri": "ni://a/sha-256;h" })),
            payload: true,
        };
        let bytes = serde_json::to_vec(&response).unwrap();
        let decoded: Response = serde_json::from_slice(&bytes).unwrap();
        match decoded {
            Response::Get {
                msgid,
                status,
                record,
                payload,
            } => {
                assert_eq!(msgid, "id123");
                assert_eq!(status, Status::Ok);
                assert!(record.is_some());
                assert!(payload);
            }
            other => panic!("expected get response, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let bad = json!({ "type": "subscribe", "msgid": "x" });
        assert!(serde_json::from_value::<Request>(bad).is_err());
    }
}
