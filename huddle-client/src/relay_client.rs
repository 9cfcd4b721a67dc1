use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientSignal, RelaySignal};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// Where client envelopes go. Delivery is fire-and-forget.
pub trait SignalSink: Send + Sync {
    fn send_signal(&self, signal: ClientSignal);
}

impl SignalSink for mpsc::UnboundedSender<ClientSignal> {
    fn send_signal(&self, signal: ClientSignal) {
        if self.send(signal).is_err() {
            debug!("Relay connection is gone, envelope dropped");
        }
    }
}

/// Both halves of a relay WebSocket connection.
pub struct RelayConnection {
    pub outbound: mpsc::UnboundedSender<ClientSignal>,
    pub inbound: mpsc::UnboundedReceiver<RelaySignal>,
}

/// Connects to the relay's `/ws` endpoint and bridges it to two channels.
///
/// `inbound` closes when the socket does; dropping every `outbound` sender
/// closes the socket.
pub async fn connect(url: &str) -> Result<RelayConnection> {
    info!(url = %url, "Connecting to relay...");

    let (ws, _) = connect_async(url)
        .await
        .with_context(|| format!("Failed to connect to relay at {}", url))?;
    let (mut sink, mut stream) = ws.split();

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientSignal>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<RelaySignal>();

    tokio::spawn(async move {
        while let Some(signal) = out_rx.recv().await {
            let text = match serde_json::to_string(&signal) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to encode {}: {}", signal.event_name(), e);
                    continue;
                }
            };
            if let Err(e) = sink.send(Message::Text(text.into())).await {
                warn!(error = %e, "Relay write failed");
                break;
            }
        }
        let _ = sink.close().await;
    });

    tokio::spawn(async move {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<RelaySignal>(text.as_str()) {
                        Ok(signal) => {
                            if in_tx.send(signal).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid envelope from relay: {}", e),
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Relay connection lost");
                    break;
                }
            }
        }
        info!("Relay connection closed");
    });

    Ok(RelayConnection {
        outbound: out_tx,
        inbound: in_rx,
    })
}
