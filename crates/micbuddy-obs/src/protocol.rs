//! obs-websocket v5 message shapes.
//!
//! Only the handful of opcodes micbuddy needs are modelled. Everything else
//! the server may send (events, batch responses) is surfaced as
//! [`Incoming::Other`] and ignored by the client.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::{MicInput, ObsError, Result};

pub(crate) const RPC_VERSION: u32 = 1;

const OP_HELLO: u8 = 0;
const OP_IDENTIFY: u8 = 1;
const OP_IDENTIFIED: u8 = 2;
const OP_REQUEST: u8 = 6;
const OP_REQUEST_RESPONSE: u8 = 7;

pub(crate) const GET_INPUT_LIST: &str = "GetInputList";
pub(crate) const GET_INPUT_MUTE: &str = "GetInputMute";

#[derive(Debug, Deserialize)]
struct Envelope {
    op: u8,
    #[serde(default)]
    d: Value,
}

#[derive(Debug, Serialize)]
struct OutgoingEnvelope<T> {
    op: u8,
    d: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Hello {
    #[serde(default)]
    pub obs_web_socket_version: Option<String>,
    pub rpc_version: u32,
    #[serde(default)]
    pub authentication: Option<AuthChallenge>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthChallenge {
    pub challenge: String,
    pub salt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Identify<'a> {
    rpc_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    authentication: Option<&'a str>,
    event_subscriptions: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Request<'a> {
    request_type: &'a str,
    request_id: &'a str,
    request_data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequestResponse {
    pub request_type: String,
    pub request_id: String,
    pub request_status: RequestStatus,
    #[serde(default)]
    pub response_data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RequestStatus {
    pub result: bool,
    pub code: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A decoded server message.
#[derive(Debug)]
pub(crate) enum Incoming {
    Hello(Hello),
    Identified,
    Response(RequestResponse),
    Other(u8),
}

pub(crate) fn decode(text: &str) -> Result<Incoming> {
    let envelope: Envelope = serde_json::from_str(text)?;
    Ok(match envelope.op {
        OP_HELLO => Incoming::Hello(serde_json::from_value(envelope.d)?),
        OP_IDENTIFIED => Incoming::Identified,
        OP_REQUEST_RESPONSE => Incoming::Response(serde_json::from_value(envelope.d)?),
        op => Incoming::Other(op),
    })
}

pub(crate) fn identify(authentication: Option<&str>) -> Result<String> {
    Ok(serde_json::to_string(&OutgoingEnvelope {
        op: OP_IDENTIFY,
        d: Identify {
            rpc_version: RPC_VERSION,
            authentication,
            event_subscriptions: 0,
        },
    })?)
}

pub(crate) fn request(request_type: &str, request_id: &str, request_data: Value) -> Result<String> {
    Ok(serde_json::to_string(&OutgoingEnvelope {
        op: OP_REQUEST,
        d: Request {
            request_type,
            request_id,
            request_data,
        },
    })?)
}

/// obs-websocket auth string: `b64(sha256(b64(sha256(password + salt)) + challenge))`.
pub(crate) fn auth_response(password: &str, challenge: &AuthChallenge) -> String {
    let secret = STANDARD.encode(Sha256::digest(
        format!("{}{}", password, challenge.salt).as_bytes(),
    ));
    STANDARD.encode(Sha256::digest(
        format!("{}{}", secret, challenge.challenge).as_bytes(),
    ))
}

impl RequestResponse {
    /// Unwraps the response data, turning a failed status into an error.
    pub(crate) fn into_data(self) -> Result<Value> {
        if !self.request_status.result {
            return Err(ObsError::Request {
                request_type: self.request_type,
                code: self.request_status.code,
                comment: self.request_status.comment.unwrap_or_default(),
            });
        }
        Ok(self.response_data.unwrap_or(Value::Null))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputListData {
    inputs: Vec<InputEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputEntry {
    input_name: String,
    #[serde(default)]
    input_kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputMuteData {
    input_muted: bool,
}

pub(crate) fn parse_input_list(data: Value) -> Result<Vec<MicInput>> {
    let list: InputListData = serde_json::from_value(data)?;
    Ok(list
        .inputs
        .into_iter()
        .map(|entry| MicInput {
            name: entry.input_name,
            kind: entry.input_kind.unwrap_or_default(),
        })
        .collect())
}

pub(crate) fn parse_input_muted(data: Value) -> Result<bool> {
    let mute: InputMuteData = serde_json::from_value(data)?;
    Ok(mute.input_muted)
}
