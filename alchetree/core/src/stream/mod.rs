//! Remote Reveal Stream
//!
//! Optional push channel supplying the same reveal events the local driver
//! would otherwise compute. A [`StreamConnector`] opens a channel for one
//! target + algorithm pair and hands back a plain `mpsc::Receiver` of typed
//! [`StreamMessage`]s; the playback driver owns the receiver and drops it to
//! close the channel.
//!
//! Connectors here:
//!
//! - [`ChannelConnector`]: in-process and script-driven, for headless
//!   operation; also doubles as the failure injector for fallback scenarios.
//! - `WebSocketConnector` (behind the `websocket` cargo feature): decodes
//!   JSON text frames from the backend's animation socket.

#[cfg(feature = "websocket")]
pub mod websocket;

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::messages::StreamMessage;
use crate::sequence::Algorithm;

#[cfg(feature = "websocket")]
pub use websocket::WebSocketConnector;

/// Channel capacity for connector receivers
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// Opens remote reveal streams
///
/// Implementations must resolve `connect` promptly or not at all; the
/// playback driver wraps the call in a bounded timeout and falls back to
/// local playback when it elapses.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    /// Connector name for logs and advisories
    fn name(&self) -> &str;

    /// Open a stream for one target + algorithm pair
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be established; the caller
    /// treats this as a fallback trigger, never a fatal failure.
    async fn connect(
        &self,
        target: &str,
        algorithm: Algorithm,
    ) -> anyhow::Result<mpsc::Receiver<StreamMessage>>;
}

// ============================================================================
// Channel Connector
// ============================================================================

/// Behavior of a [`ChannelConnector`]
enum ChannelMode {
    /// Feed a prepared script, one message per step delay
    Scripted {
        script: Vec<StreamMessage>,
        step_delay: Duration,
    },
    /// Refuse every connection attempt immediately
    Refusing,
    /// Never resolve the connection attempt (exercises the connect timeout)
    Unresponsive,
}

/// In-process connector feeding a prepared message script
///
/// The script is replayed in order on every successful `connect`, with a
/// configurable delay between messages.
pub struct ChannelConnector {
    mode: Mutex<ChannelMode>,
}

impl ChannelConnector {
    /// A connector that replays `script` with no inter-message delay
    #[must_use]
    pub fn scripted(script: Vec<StreamMessage>) -> Self {
        Self::scripted_with_delay(script, Duration::ZERO)
    }

    /// A connector that replays `script`, pausing `step_delay` between messages
    #[must_use]
    pub fn scripted_with_delay(script: Vec<StreamMessage>, step_delay: Duration) -> Self {
        Self {
            mode: Mutex::new(ChannelMode::Scripted { script, step_delay }),
        }
    }

    /// A connector whose every connection attempt fails immediately
    #[must_use]
    pub fn refusing() -> Self {
        Self {
            mode: Mutex::new(ChannelMode::Refusing),
        }
    }

    /// A connector whose connection attempts never resolve
    #[must_use]
    pub fn unresponsive() -> Self {
        Self {
            mode: Mutex::new(ChannelMode::Unresponsive),
        }
    }

    /// Replace the script replayed by subsequent connects
    pub fn set_script(&self, script: Vec<StreamMessage>) {
        *self.mode.lock() = ChannelMode::Scripted {
            script,
            step_delay: Duration::ZERO,
        };
    }
}

#[async_trait]
impl StreamConnector for ChannelConnector {
    fn name(&self) -> &str {
        "channel"
    }

    async fn connect(
        &self,
        target: &str,
        algorithm: Algorithm,
    ) -> anyhow::Result<mpsc::Receiver<StreamMessage>> {
        // Snapshot the mode first; the lock must not be held across an await.
        enum Plan {
            Feed(Vec<StreamMessage>, Duration),
            Refuse,
            Hang,
        }
        let plan = {
            let mode = self.mode.lock();
            match &*mode {
                ChannelMode::Scripted { script, step_delay } => {
                    Plan::Feed(script.clone(), *step_delay)
                }
                ChannelMode::Refusing => Plan::Refuse,
                ChannelMode::Unresponsive => Plan::Hang,
            }
        };
        let (script, step_delay) = match plan {
            Plan::Feed(script, step_delay) => (script, step_delay),
            Plan::Refuse => anyhow::bail!("stream refused for {target} ({algorithm})"),
            Plan::Hang => {
                futures::future::pending::<()>().await;
                unreachable!("pending never resolves")
            }
        };

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            for message in script {
                if !step_delay.is_zero() {
                    tokio::time::sleep(step_delay).await;
                }
                if tx.send(message).await.is_err() {
                    // Receiver dropped: the run was cancelled or fell back.
                    break;
                }
            }
        });
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{StreamLink, StreamNode};
    use tokio_test::{assert_err, assert_ok};

    fn short_script() -> Vec<StreamMessage> {
        vec![
            StreamMessage::Metadata {
                algorithm: "bfs".to_string(),
                element: "Brick".to_string(),
            },
            StreamMessage::Steps { total_steps: 2 },
            StreamMessage::Node {
                node: StreamNode { name: "Brick".to_string(), image_path: None },
                is_base_node: false,
                step_index: 1,
                total_steps: 2,
            },
            StreamMessage::Link {
                link: StreamLink { source: "Brick".to_string(), target: "Mud".to_string() },
                step_index: 2,
                total_steps: 2,
            },
            StreamMessage::Complete { nodes_visited: 5 },
        ]
    }

    #[tokio::test]
    async fn test_scripted_connector_replays_in_order() {
        let connector = ChannelConnector::scripted(short_script());
        let mut rx = tokio_test::assert_ok!(connector.connect("Brick", Algorithm::Bfs).await);

        let mut received = Vec::new();
        while let Some(msg) = rx.recv().await {
            received.push(msg);
        }
        assert_eq!(received, short_script());
    }

    #[tokio::test]
    async fn test_refusing_connector_errors() {
        let connector = ChannelConnector::refusing();
        tokio_test::assert_err!(connector.connect("Brick", Algorithm::Dfs).await);
    }

    #[tokio::test]
    async fn test_unresponsive_connector_times_out() {
        let connector = ChannelConnector::unresponsive();
        let attempt = tokio::time::timeout(
            Duration::from_millis(50),
            connector.connect("Brick", Algorithm::Bfs),
        )
        .await;
        assert!(attempt.is_err(), "connect must still be pending");
    }

    #[tokio::test]
    async fn test_dropping_receiver_stops_feeder() {
        let connector =
            ChannelConnector::scripted_with_delay(short_script(), Duration::from_millis(5));
        let rx = connector.connect("Brick", Algorithm::Bfs).await.unwrap();
        drop(rx);
        // Feeder notices the closed channel on its next send and exits; give
        // it a beat so the spawned task actually runs.
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
