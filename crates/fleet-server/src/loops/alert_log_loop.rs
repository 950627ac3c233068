//! Logs every alert published on the stream channel.

use tokio::sync::broadcast::{self, error::RecvError};

use crate::broadcast::{StreamEvent, StreamMessage};
use fleet_core::Alert;

pub async fn run_alert_log_loop(
    mut stream: broadcast::Receiver<StreamMessage>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Alert log loop shutting down");
                break;
            }
            message = stream.recv() => match message {
                Ok(message) if message.event == StreamEvent::Alerts => {
                    match serde_json::from_str::<Vec<Alert>>(&message.payload) {
                        Ok(alerts) => {
                            for alert in alerts {
                                tracing::warn!(
                                    vehicle = %alert.vehicle_id,
                                    kind = ?alert.kind,
                                    severity = ?alert.severity,
                                    "{}",
                                    alert.message
                                );
                            }
                        }
                        Err(e) => tracing::warn!("Unreadable alert payload: {}", e),
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Alert log lagged, skipped {} messages", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
