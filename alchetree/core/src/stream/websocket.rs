//! WebSocket Stream Connector
//!
//! Connects to the backend's animation socket and decodes JSON text frames
//! into [`StreamMessage`]s. The socket endpoint follows the backend's route
//! shape: `{base}/ws/animation/{target}?algorithm={algorithm}`.
//!
//! The read loop runs in its own task and ends on a terminal message, a
//! close frame, a socket error, or when the receiver is dropped, whichever
//! comes first. Dropping the receiver is how the playback driver closes the
//! channel on cancellation.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::backend::escape_path_segment;
use crate::messages::StreamMessage;
use crate::sequence::Algorithm;

use super::StreamConnector;

/// Connector for the backend's animation WebSocket
#[derive(Clone, Debug)]
pub struct WebSocketConnector {
    base_url: String,
}

impl WebSocketConnector {
    /// Create a connector for a backend base URL (e.g. `ws://localhost:8080`)
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Socket URL for one target + algorithm pair
    #[must_use]
    pub fn stream_url(&self, target: &str, algorithm: Algorithm) -> String {
        format!(
            "{}/ws/animation/{}?algorithm={}",
            self.base_url,
            escape_path_segment(target),
            algorithm.as_str()
        )
    }
}

#[async_trait]
impl StreamConnector for WebSocketConnector {
    fn name(&self) -> &str {
        "websocket"
    }

    async fn connect(
        &self,
        target: &str,
        algorithm: Algorithm,
    ) -> anyhow::Result<mpsc::Receiver<StreamMessage>> {
        let url = self.stream_url(target, algorithm);
        tracing::debug!(%url, "connecting animation stream");
        let (socket, _response) = connect_async(url).await?;

        let (tx, rx) = mpsc::channel(super::STREAM_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            let (_write, mut read) = socket.split();
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<StreamMessage>(&text) {
                        Ok(message) => {
                            let terminal = message.is_terminal();
                            if tx.send(message).await.is_err() || terminal {
                                break;
                            }
                        }
                        Err(error) => {
                            tracing::warn!(%error, "undecodable stream frame dropped");
                        }
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {} // ping/pong/binary: not part of the protocol
                    Err(error) => {
                        tracing::warn!(%error, "animation stream read failed");
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }
}
