//! obs-websocket client.
//!
//! Requests are issued one at a time and answered in order, so the client
//! reads the socket inline instead of running separate read/write pumps.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};

use crate::protocol::{self, GET_INPUT_LIST, GET_INPUT_MUTE, Incoming, RPC_VERSION};
use crate::{ConnectParams, Connector, ControlSession, MicInput, ObsError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens sessions against a local obs-websocket server.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObsConnector;

/// An identified obs-websocket session.
pub struct ObsSession {
    stream: WsStream,
    next_id: u64,
}

#[async_trait]
impl Connector for ObsConnector {
    type Session = ObsSession;

    async fn connect(&self, params: &ConnectParams) -> Result<ObsSession> {
        let url = params.url();
        debug!(url = %url, "opening obs-websocket connection");
        let (stream, _) = tokio_tungstenite::connect_async(url.as_str()).await?;

        let mut session = ObsSession { stream, next_id: 0 };
        if let Err(e) = session.identify(params.password.as_deref()).await {
            session.close().await;
            return Err(e);
        }
        Ok(session)
    }
}

impl ObsSession {
    /// Hello -> Identify -> Identified.
    async fn identify(&mut self, password: Option<&str>) -> Result<()> {
        let hello = match self.next_message().await? {
            Incoming::Hello(hello) => hello,
            other => {
                return Err(ObsError::Handshake(format!(
                    "expected Hello, got {other:?}"
                )));
            }
        };

        if hello.rpc_version < RPC_VERSION {
            return Err(ObsError::Handshake(format!(
                "server speaks rpc version {}",
                hello.rpc_version
            )));
        }

        let authentication = match (&hello.authentication, password) {
            (Some(challenge), Some(password)) => {
                Some(protocol::auth_response(password, challenge))
            }
            (Some(_), None) => {
                return Err(ObsError::Handshake(
                    "server requires a password but none is configured".into(),
                ));
            }
            (None, _) => None,
        };

        let identify = protocol::identify(authentication.as_deref())?;
        self.stream.send(Message::text(identify)).await?;

        match self.next_message().await? {
            Incoming::Identified => {
                info!(
                    version = hello.obs_web_socket_version.as_deref().unwrap_or("unknown"),
                    "identified with obs-websocket"
                );
                Ok(())
            }
            other => Err(ObsError::Handshake(format!(
                "expected Identified, got {other:?}"
            ))),
        }
    }

    /// Reads until a message we care about arrives.
    async fn next_message(&mut self) -> Result<Incoming> {
        loop {
            let message = self.stream.next().await.ok_or(ObsError::Closed)??;
            match message {
                Message::Text(text) => match protocol::decode(text.as_str())? {
                    Incoming::Other(op) => trace!(op, "ignoring message"),
                    incoming => return Ok(incoming),
                },
                Message::Close(frame) => {
                    debug!(frame = ?frame, "server closed the connection");
                    return Err(ObsError::Closed);
                }
                Message::Binary(_) => {
                    return Err(ObsError::Protocol("unexpected binary frame".into()));
                }
                _ => {}
            }
        }
    }

    /// Sends one request and waits for its response.
    async fn call(&mut self, request_type: &str, request_data: Value) -> Result<Value> {
        self.next_id += 1;
        let request_id = self.next_id.to_string();
        let text = protocol::request(request_type, &request_id, request_data)?;
        self.stream.send(Message::text(text)).await?;

        loop {
            match self.next_message().await? {
                Incoming::Response(resp) if resp.request_id == request_id => {
                    return resp.into_data();
                }
                Incoming::Response(resp) => {
                    debug!(request_id = %resp.request_id, "dropping stale response");
                }
                other => {
                    return Err(ObsError::Protocol(format!(
                        "expected response to {request_type}, got {other:?}"
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl ControlSession for ObsSession {
    async fn list_inputs(&mut self) -> Result<Vec<MicInput>> {
        let data = self.call(GET_INPUT_LIST, json!({})).await?;
        protocol::parse_input_list(data)
    }

    async fn input_muted(&mut self, name: &str) -> Result<bool> {
        let data = self.call(GET_INPUT_MUTE, json!({ "inputName": name })).await?;
        protocol::parse_input_muted(data)
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            trace!(error = %e, "error while closing obs-websocket");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;

    fn params(port: u16, password: Option<&str>) -> ConnectParams {
        ConnectParams {
            host: "127.0.0.1".into(),
            port,
            password: password.map(str::to_owned),
            timeout: Duration::from_secs(5),
        }
    }

    async fn read_json(ws: &mut WebSocketStream<TcpStream>) -> Value {
        loop {
            match ws.next().await.unwrap().unwrap() {
                Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
                Message::Close(_) => panic!("client closed early"),
                _ => {}
            }
        }
    }

    async fn send_json(ws: &mut WebSocketStream<TcpStream>, value: Value) {
        ws.send(Message::text(value.to_string())).await.unwrap();
    }

    /// Minimal obs-websocket server: no auth, Mic1 unmuted, Mic2 muted.
    async fn serve_one(listener: TcpListener) {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();

        send_json(
            &mut ws,
            json!({"op": 0, "d": {"obsWebSocketVersion": "5.4.2", "rpcVersion": 1}}),
        )
        .await;
        let identify = read_json(&mut ws).await;
        assert_eq!(identify["op"], 1);
        send_json(&mut ws, json!({"op": 2, "d": {"negotiatedRpcVersion": 1}})).await;

        loop {
            let request = match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    serde_json::from_str::<Value>(text.as_str()).unwrap()
                }
                _ => return,
            };
            let d = &request["d"];
            let response_data = match d["requestType"].as_str().unwrap() {
                "GetInputList" => json!({"inputs": [
                    {"inputName": "Mic1", "inputKind": "pulse_input_capture"},
                    {"inputName": "Mic2", "inputKind": "pulse_input_capture"},
                ]}),
                "GetInputMute" => {
                    let muted = d["requestData"]["inputName"].as_str() == Some("Mic2");
                    json!({ "inputMuted": muted })
                }
                other => panic!("unexpected request {other}"),
            };
            // An unrelated event in between must be skipped by the client.
            send_json(&mut ws, json!({"op": 5, "d": {"eventType": "CurrentSceneChanged"}})).await;
            send_json(
                &mut ws,
                json!({"op": 7, "d": {
                    "requestType": d["requestType"],
                    "requestId": d["requestId"],
                    "requestStatus": {"result": true, "code": 100},
                    "responseData": response_data,
                }}),
            )
            .await;
        }
    }

    #[tokio::test]
    async fn test_session_against_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(serve_one(listener));

        let mut session = ObsConnector.connect(&params(port, None)).await.unwrap();
        let inputs = session.list_inputs().await.unwrap();
        assert_eq!(inputs.len(), 2);
        assert!(!session.input_muted("Mic1").await.unwrap());
        assert!(session.input_muted("Mic2").await.unwrap());
        session.close().await;

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_password_required_but_missing() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            send_json(
                &mut ws,
                json!({"op": 0, "d": {"rpcVersion": 1, "authentication": {
                    "challenge": "abc", "salt": "xyz"
                }}}),
            )
            .await;
            // Drain until the client hangs up.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let result = ObsConnector.connect(&params(port, None)).await;
        assert!(matches!(result, Err(ObsError::Handshake(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = ObsConnector.connect(&params(port, None)).await;
        assert!(matches!(result, Err(ObsError::Ws(_))));
    }
}
