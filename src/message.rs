//! Decoding of inbound JSON-RPC 2.0 text frames.
//!
//! Only notifications are handled here. Calls and replies are classified and
//! handed back so the request/response layer can deal with them.

use crate::error::{NotifyError, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Protocol version accepted in the `jsonrpc` member.
pub const JSONRPC_VERSION: &str = "2.0";

/// One decoded JSON-RPC message.
#[derive(Clone, Debug, PartialEq)]
pub enum InboundMessage {
    /// A message without `id`: no reply is expected.
    Notification {
        method: String,
        params: Option<Value>,
    },
    /// A message with `id` and `method`: the peer expects a reply.
    Call(CallEnvelope),
    /// A message with `id` and `result` or `error`: a reply to one of our calls.
    Reply(Value),
}

/// A call left for the request/response layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CallEnvelope {
    pub id: Value,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl InboundMessage {
    /// Decode a text frame holding a single message or a batch.
    pub fn parse_frame(raw: &str) -> Result<Vec<InboundMessage>> {
        let value: Value = serde_json::from_str(raw)?;

        match value {
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(NotifyError::InvalidMessage("empty batch".to_string()));
                }
                items.into_iter().map(Self::from_value).collect()
            }
            other => Ok(vec![Self::from_value(other)?]),
        }
    }

    /// Classify one already-decoded message.
    pub fn from_value(value: Value) -> Result<InboundMessage> {
        let Value::Object(mut obj) = value else {
            return Err(NotifyError::InvalidMessage(
                "message is not an object".to_string(),
            ));
        };

        check_version(&obj)?;

        let id = obj.remove("id");
        let method = obj.remove("method");

        match (id, method) {
            (None, Some(method)) => Ok(InboundMessage::Notification {
                method: method_name(method)?,
                params: obj.remove("params"),
            }),
            (Some(id), Some(method)) => Ok(InboundMessage::Call(CallEnvelope {
                id,
                method: method_name(method)?,
                params: obj.remove("params"),
            })),
            (Some(id), None) if obj.contains_key("result") || obj.contains_key("error") => {
                obj.insert("id".to_string(), id);
                Ok(InboundMessage::Reply(Value::Object(obj)))
            }
            _ => Err(NotifyError::InvalidMessage(
                "missing \"method\" member".to_string(),
            )),
        }
    }
}

fn check_version(obj: &Map<String, Value>) -> Result<()> {
    match obj.get("jsonrpc") {
        Some(Value::String(v)) if v == JSONRPC_VERSION => Ok(()),
        Some(other) => Err(NotifyError::InvalidMessage(format!(
            "unsupported jsonrpc version: {other}"
        ))),
        None => Err(NotifyError::InvalidMessage(
            "missing \"jsonrpc\" member".to_string(),
        )),
    }
}

fn method_name(method: Value) -> Result<String> {
    match method {
        Value::String(name) => Ok(name),
        other => Err(NotifyError::InvalidMessage(format!(
            "method must be a string, got {other}"
        ))),
    }
}
