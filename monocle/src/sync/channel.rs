//! Websocket event channel.
//!
//! Owns at most one physical websocket connection scoped to a project and
//! surfaces its lifecycle as an ordered stream of [`ChannelSignal`]s over
//! an mpsc channel. The channel never decides whether to reconnect; it
//! reports closes and errors and leaves the policy to its owner.
//!
//! A transport error is always followed by a `Closed` signal, so the
//! owner can key its reconnect decision off `Closed` alone and see it
//! exactly once per disconnect.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::models::PushMessage;

/// Lifecycle and message events observed on the push connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSignal {
    /// The connection is established.
    Opened,
    /// A recognized push message arrived.
    Message(PushMessage),
    /// A transport-level error. `Closed` follows.
    Error { detail: String },
    /// The connection is gone, expectedly or not.
    Closed { code: Option<u16>, reason: String },
}

/// One push-event connection scoped to a project.
pub struct EventChannel {
    endpoint: String,
    tx: mpsc::Sender<ChannelSignal>,
    connection: Option<JoinHandle<()>>,
}

impl EventChannel {
    /// Create a channel for a project together with its signal receiver.
    ///
    /// No connection is attempted until [`open`](Self::open) is called.
    pub fn new(project_id: &str, ws_base: &str) -> (Self, mpsc::Receiver<ChannelSignal>) {
        let (tx, rx) = mpsc::channel(64);
        let endpoint = format!("{ws_base}/api/ws/{project_id}");
        (
            Self {
                endpoint,
                tx,
                connection: None,
            },
            rx,
        )
    }

    /// Open the connection, tearing down any existing one first.
    ///
    /// Effects are reported asynchronously: `Opened` on success, or
    /// `Error` followed by `Closed` if the connection cannot be
    /// established.
    pub fn open(&mut self) {
        self.abort_connection();
        let endpoint = self.endpoint.clone();
        let tx = self.tx.clone();
        self.connection = Some(tokio::spawn(run_connection(endpoint, tx)));
    }

    /// Tear down the active connection, if any. Idempotent.
    pub fn close(&mut self) {
        self.abort_connection();
    }

    fn abort_connection(&mut self) {
        if let Some(handle) = self.connection.take() {
            handle.abort();
        }
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        self.abort_connection();
    }
}

/// Drive one websocket connection until it ends, forwarding signals.
async fn run_connection(endpoint: String, tx: mpsc::Sender<ChannelSignal>) {
    let stream = match connect_async(endpoint.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            warn!(endpoint = %endpoint, error = %err, "websocket connect failed");
            let _ = tx
                .send(ChannelSignal::Error {
                    detail: err.to_string(),
                })
                .await;
            let _ = tx
                .send(ChannelSignal::Closed {
                    code: None,
                    reason: "connect failed".to_string(),
                })
                .await;
            return;
        }
    };

    if tx.send(ChannelSignal::Opened).await.is_err() {
        return;
    }

    let (_write, mut read) = stream.split();

    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => match PushMessage::parse(&text) {
                Some(PushMessage::Unknown { kind }) => {
                    warn!(kind = %kind, "unknown push message type ignored");
                }
                Some(message) => {
                    if tx.send(ChannelSignal::Message(message)).await.is_err() {
                        return;
                    }
                }
                None => {
                    warn!("malformed push message dropped");
                }
            },
            Ok(Message::Close(frame)) => {
                let (code, reason) = frame
                    .map(|f| (Some(u16::from(f.code)), f.reason.to_string()))
                    .unwrap_or((None, String::new()));
                debug!(code = ?code, reason = %reason, "websocket closed by server");
                let _ = tx.send(ChannelSignal::Closed { code, reason }).await;
                return;
            }
            Ok(_) => {} // ping/pong/binary: nothing to do
            Err(err) => {
                warn!(error = %err, "websocket read error");
                let _ = tx
                    .send(ChannelSignal::Error {
                        detail: err.to_string(),
                    })
                    .await;
                let _ = tx
                    .send(ChannelSignal::Closed {
                        code: None,
                        reason: err.to_string(),
                    })
                    .await;
                return;
            }
        }
    }

    // Stream ended without a close frame.
    let _ = tx
        .send(ChannelSignal::Closed {
            code: None,
            reason: "connection ended".to_string(),
        })
        .await;
}
