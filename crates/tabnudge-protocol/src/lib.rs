//! Wire and domain types shared by the tabnudge engine and its HTTP surface.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a terminal tab session.
///
/// Generated per tab per process run (UUID v4), never reused, and handed to
/// the spawned shell so it can address notifications back to its own tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_raw(value: impl Into<String>) -> Self {
        SessionId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visibility of a terminal tab, queried from the host on demand and never
/// cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabState {
    /// Tab is not selected, or its tool panel is hidden.
    NotVisible,
    /// Tab is selected but its tool panel does not have focus.
    VisibleInactive,
    /// Tab is selected and its tool panel has focus.
    VisibleActive,
}

/// Controls notification suppression based on tab state.
///
/// When the condition is met at creation time the notification is skipped
/// (never created); when it is met later, the notification is expired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Suppress {
    /// Never suppress.
    #[serde(rename = "none")]
    None,
    /// Suppress while the tab is active (selected and focused).
    #[default]
    #[serde(rename = "whenActive")]
    WhenActive,
    /// Suppress while the tab is visible (selected, panel shown).
    #[serde(rename = "whenVisible")]
    WhenVisible,
}

impl Suppress {
    pub fn matches(self, state: TabState) -> bool {
        match self {
            Suppress::None => false,
            Suppress::WhenActive => state == TabState::VisibleActive,
            Suppress::WhenVisible => {
                state == TabState::VisibleInactive || state == TabState::VisibleActive
            }
        }
    }
}

/// Controls behavior when a new notification arrives for the same session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnNext {
    /// Keep this notification when a new one arrives.
    #[serde(rename = "keep")]
    Keep,
    /// Expire this notification when a new one arrives.
    #[default]
    #[serde(rename = "expire")]
    Expire,
}

/// Why a request body was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("sessionId must be a non-empty string")]
    BlankSessionId,
    #[error("message must be a non-empty string")]
    BlankMessage,
    #[error("{0}")]
    Malformed(String),
}

/// One inbound notification request, as POSTed by a shell.
///
/// Unknown fields are ignored so old clients stay compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub session_id: SessionId,
    pub message: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub suppress: Suppress,
    #[serde(default)]
    pub on_next: OnNext,
}

impl NotificationRequest {
    /// Parse and validate a JSON request body.
    ///
    /// Violations surface as a [`RequestError`] for the transport to turn
    /// into a 400; they never propagate as panics.
    pub fn parse(body: &str) -> Result<Self, RequestError> {
        let request: NotificationRequest =
            serde_json::from_str(body).map_err(|e| RequestError::Malformed(e.to_string()))?;
        request.validate()
    }

    fn validate(self) -> Result<Self, RequestError> {
        if self.session_id.as_str().trim().is_empty() {
            return Err(RequestError::BlankSessionId);
        }
        if self.message.trim().is_empty() {
            return Err(RequestError::BlankMessage);
        }
        Ok(self)
    }
}
