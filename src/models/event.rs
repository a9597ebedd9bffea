//! Scan events: server-side handles for a running scan.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::client::KonduktoClient;
use crate::error::{KdtError, Result};

/// Progress of a scan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Starting,
    Running,
    Analyzing,
    Notifying,
    Finished,
}

impl EventStatus {
    /// Decode the numeric status sent by the server.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Starting),
            1 => Some(Self::Running),
            2 => Some(Self::Analyzing),
            3 => Some(Self::Notifying),
            4 => Some(Self::Finished),
            _ => None,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Analyzing => "analyzing",
            Self::Notifying => "notifying",
            Self::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// Whether the scan run is still alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Failed,
    Inactive,
    Active,
}

impl Activity {
    /// Decode the numeric activity flag.
    ///
    /// # Errors
    ///
    /// Any value other than -1, 0 or 1 is a [`KdtError::ProtocolViolation`].
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            -1 => Ok(Self::Failed),
            0 => Ok(Self::Inactive),
            1 => Ok(Self::Active),
            other => Err(KdtError::ProtocolViolation(format!(
                "unknown event activity value {other}"
            ))),
        }
    }
}

/// A single asynchronous scan run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,

    /// Raw lifecycle status, see [`EventStatus`].
    pub status: i32,

    /// Raw activity flag, see [`Activity`].
    pub active: i32,

    #[serde(default)]
    pub scan_id: String,

    #[serde(default)]
    pub message: String,
}

impl Event {
    /// Decoded lifecycle status, if known.
    pub fn lifecycle(&self) -> Option<EventStatus> {
        EventStatus::from_code(self.status)
    }

    /// Decoded activity flag.
    pub fn activity(&self) -> Result<Activity> {
        Activity::from_code(self.active)
    }

    /// Human-readable status.
    pub fn status_label(&self) -> String {
        match self.lifecycle() {
            Some(status) => status.to_string(),
            None => format!("status {}", self.status),
        }
    }

    /// Fetch the current state of an event.
    ///
    /// # Errors
    ///
    /// Returns [`KdtError::Upstream`] on a non-2xx response.
    #[tracing::instrument(skip(client))]
    pub async fn get_status(client: &KonduktoClient, event_id: &str) -> Result<Self> {
        let path = format!("api/v2/events/{}/status", urlencoding::encode(event_id));

        let response = client.get(&path).await?;
        KonduktoClient::json(response).await
    }
}
