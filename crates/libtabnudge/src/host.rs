//! Collaborator traits the host runtime implements.
//!
//! Implementations are non-owning proxies: the window, tab, or toast behind
//! them may be destroyed by the host at any time. Callers re-check validity
//! on every use instead of assuming liveness, and implementations answer
//! queries about disposed objects instead of panicking.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tabnudge_protocol::TabState;

/// A toast shown inside a workspace window.
///
/// The host UI owns the toast; the engine only ever keeps `Weak` references
/// to it. Must be callable from any thread.
pub trait Toast: Send + Sync {
    fn is_expired(&self) -> bool;
    fn expire(&self);
}

/// One open workspace window of the host.
pub trait WorkspaceHandle: Send + Sync {
    fn name(&self) -> String;

    fn is_disposed(&self) -> bool;

    /// Whether this workspace's window currently has OS focus.
    fn is_window_active(&self) -> bool;

    /// Bring this workspace's window to the front, stealing focus if needed.
    /// Must be called on the UI executor.
    fn focus_window(&self);

    /// Show a toast bound to this workspace, carrying one action button that
    /// runs `on_show` when clicked. Returns the host-owned toast, or `None`
    /// if the workspace cannot present one (e.g. mid-disposal).
    /// Must be called on the UI executor.
    fn show_toast(
        &self,
        title: &str,
        message: &str,
        on_show: Box<dyn Fn() + Send + Sync>,
    ) -> Option<Arc<dyn Toast>>;
}

/// One terminal tab inside a workspace.
pub trait TabHandle: Send + Sync {
    fn display_name(&self) -> String;

    /// True once the tab's widget has been torn down.
    fn is_disposed(&self) -> bool;

    /// Whether the tab is still present in its container.
    fn is_present(&self) -> bool;

    /// Current visibility. Queried on demand, never cached.
    /// Must be called on the UI executor.
    fn tab_state(&self) -> TabState;

    /// Select and reveal this tab, returning false if it is gone.
    /// Must be called on the UI executor.
    fn select(&self) -> bool;
}

/// Enumerates the host's open workspaces.
pub trait WorkspaceManager: Send + Sync {
    /// Open workspaces, excluding any that are mid-disposal.
    fn open_workspaces(&self) -> Vec<Arc<dyn WorkspaceHandle>>;
}

/// Where notifications are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Destination {
    /// Toasts inside the host's workspace windows.
    #[default]
    InApp,
    /// The OS notification center, falling back to in-app on platforms
    /// without one.
    System,
}

/// Read access to the host's persisted settings.
pub trait SettingsProvider: Send + Sync {
    fn destination(&self) -> Destination;

    /// Host pickers jump straight to the tab when only one notification is
    /// pending. Affects only the picker UI, never the engine.
    fn skip_chooser_when_single(&self) -> bool;
}
