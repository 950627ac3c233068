//! Broadcast hand-off for per-tick fleet frames.
//!
//! The tick loop hands every frame to a [`BroadcastSink`]. The shipped
//! [`ChannelSink`] serializes frames once and fans the JSON out to any number
//! of stream subscribers over a `tokio::sync::broadcast` channel.

use chrono::{DateTime, Utc};
use fleet_core::{Alert, Geofence, VehicleSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Everything observers receive for one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickFrame {
    pub tick: u64,
    /// Wall time elapsed since the previous tick
    pub dt_secs: f64,
    pub timestamp: DateTime<Utc>,
    pub vehicles: Vec<VehicleSnapshot>,
    pub alerts: Vec<Alert>,
}

/// Initial state for a newly connected subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bootstrap {
    pub vehicles: Vec<VehicleSnapshot>,
    pub geofences: Vec<Geofence>,
}

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("no subscribers connected")]
    NoSubscribers,
    #[error("failed to serialize stream payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Receiver of per-tick frames.
pub trait BroadcastSink: Send + Sync + 'static {
    fn publish(&self, frame: &TickFrame) -> Result<(), BroadcastError>;
}

impl<S: BroadcastSink + ?Sized> BroadcastSink for Arc<S> {
    fn publish(&self, frame: &TickFrame) -> Result<(), BroadcastError> {
        (**self).publish(frame)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamEvent {
    /// Per-tick vehicle snapshots
    FleetUpdate,
    /// Per-tick alerts; only sent when at least one alert fired
    Alerts,
    /// Full vehicle list for a new subscriber
    FleetState,
    /// Active geofences for a new subscriber
    GeofenceState,
}

/// A serialized message on the stream channel.
#[derive(Debug, Clone)]
pub struct StreamMessage {
    pub event: StreamEvent,
    pub payload: Arc<str>,
}

impl StreamMessage {
    fn encode<T: Serialize + ?Sized>(event: StreamEvent, data: &T) -> Result<Self, BroadcastError> {
        let payload = serde_json::to_string(data)?;
        Ok(Self {
            event,
            payload: Arc::from(payload),
        })
    }
}

impl Bootstrap {
    /// Encode as the messages a fresh subscriber should receive first.
    pub fn to_messages(&self) -> Result<Vec<StreamMessage>, BroadcastError> {
        Ok(vec![
            StreamMessage::encode(StreamEvent::FleetState, &self.vehicles)?,
            StreamMessage::encode(StreamEvent::GeofenceState, &self.geofences)?,
        ])
    }
}

/// Fan-out sink backed by a broadcast channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: broadcast::Sender<StreamMessage>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StreamMessage> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn send(&self, message: StreamMessage) -> Result<(), BroadcastError> {
        self.tx
            .send(message)
            .map(|_| ())
            .map_err(|_| BroadcastError::NoSubscribers)
    }
}

impl BroadcastSink for ChannelSink {
    fn publish(&self, frame: &TickFrame) -> Result<(), BroadcastError> {
        if self.tx.receiver_count() == 0 {
            return Err(BroadcastError::NoSubscribers);
        }

        self.send(StreamMessage::encode(StreamEvent::FleetUpdate, &frame.vehicles)?)?;
        if !frame.alerts.is_empty() {
            self.send(StreamMessage::encode(StreamEvent::Alerts, &frame.alerts)?)?;
        }
        Ok(())
    }
}
