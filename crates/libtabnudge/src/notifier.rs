//! Request routing and visibility-driven sweeps.

use std::sync::Arc;

use tracing::debug;

use tabnudge_protocol::{NotificationRequest, Suppress};

use crate::channel::{InAppChannel, NativeChannel, NotificationChannel};
use crate::executor::UiExecutor;
use crate::host::{Destination, SettingsProvider, WorkspaceHandle, WorkspaceManager};
use crate::notification::NotificationHandle;
use crate::registry::SessionRegistry;
use crate::session::Session;

/// Outcome of routing a notification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyResult {
    /// Routed to a session. Delivery may still be skipped by suppression.
    Accepted,
    SessionNotFound,
}

/// Routes notification requests to sessions and reacts to host visibility
/// transitions.
pub struct Notifier {
    registry: Arc<SessionRegistry>,
    workspaces: Arc<dyn WorkspaceManager>,
    settings: Arc<dyn SettingsProvider>,
    ui: Arc<UiExecutor>,
    in_app: Arc<InAppChannel>,
    native: Option<Arc<NativeChannel>>,
}

impl Notifier {
    /// `native` is `None` on platforms without an OS notification center;
    /// the `System` destination then falls back to in-app toasts.
    pub fn new(
        registry: Arc<SessionRegistry>,
        workspaces: Arc<dyn WorkspaceManager>,
        settings: Arc<dyn SettingsProvider>,
        ui: Arc<UiExecutor>,
        native: Option<Arc<NativeChannel>>,
    ) -> Self {
        Self {
            registry,
            workspaces,
            settings,
            ui,
            in_app: Arc::new(InAppChannel),
            native,
        }
    }

    fn channel(&self) -> Arc<dyn NotificationChannel> {
        match self.settings.destination() {
            Destination::InApp => Arc::clone(&self.in_app) as Arc<dyn NotificationChannel>,
            Destination::System => match &self.native {
                Some(native) => Arc::clone(native) as Arc<dyn NotificationChannel>,
                None => Arc::clone(&self.in_app) as Arc<dyn NotificationChannel>,
            },
        }
    }

    /// Route `request` to its session.
    ///
    /// Never blocks: the result only says whether a session was found. The
    /// suppression check, targeting, and posting run later on the UI
    /// executor, and are dropped if the owning workspace is disposed first.
    pub fn notify(&self, request: NotificationRequest) -> NotifyResult {
        let Some(session) = self.registry.find_by_id(&request.session_id) else {
            debug!(session_id = %request.session_id, "notify for unknown session");
            return NotifyResult::SessionNotFound;
        };

        let channel = self.channel();
        let workspaces = Arc::clone(&self.workspaces);
        let cancel_workspace = Arc::clone(session.workspace());
        self.ui.submit_unless(
            move || cancel_workspace.is_disposed(),
            move || {
                if Self::should_skip(&session, request.suppress) {
                    debug!(session_id = %request.session_id, "notification suppressed at creation");
                    return;
                }

                let title = request
                    .title
                    .unwrap_or_else(|| session.tab().display_name());
                let targets = workspaces.open_workspaces();
                session.post_notification(
                    channel.as_ref(),
                    title,
                    request.message,
                    request.suppress,
                    request.on_next,
                    &targets,
                );
            },
        );

        NotifyResult::Accepted
    }

    /// Creation-time suppression: skip when the workspace window is
    /// frontmost and the current tab state already satisfies the requested
    /// mode. No toast or alert is created at all.
    fn should_skip(session: &Session, suppress: Suppress) -> bool {
        if !session.workspace().is_window_active() {
            return false;
        }
        suppress.matches(session.tab().tab_state())
    }

    /// Force-expire everything `session` still holds. Called on tab
    /// disposal.
    pub fn expire_session_notifications(&self, session: &Session) {
        for handle in session.take_all_notifications() {
            handle.expire();
        }
    }

    /// Sweep every session belonging to `workspace` against its current tab
    /// state, expiring entries whose suppression condition is now met.
    /// Wired to workspace (re)activation and tool-panel show/activate
    /// transitions.
    pub fn expire_suppressed_notifications(&self, workspace: &Arc<dyn WorkspaceHandle>) {
        let registry = Arc::clone(&self.registry);
        let workspace = Arc::clone(workspace);
        let cancel_workspace = Arc::clone(&workspace);
        self.ui.submit_unless(
            move || cancel_workspace.is_disposed(),
            move || {
                for session in registry.all_sessions() {
                    if !Arc::ptr_eq(session.workspace(), &workspace) {
                        continue;
                    }
                    let state = session.tab().tab_state();
                    for handle in session.take_suppressed_notifications(state) {
                        handle.expire();
                    }
                }
            },
        );
    }

    /// The application regained focus: sweep every open workspace.
    pub fn on_application_activated(&self) {
        for workspace in self.workspaces.open_workspaces() {
            self.expire_suppressed_notifications(&workspace);
        }
    }

    /// Live notifications across all sessions, for host-side pickers. Pair
    /// with [`SettingsProvider::skip_chooser_when_single`] to decide whether
    /// a single entry should navigate directly.
    pub fn unexpired_notifications(&self) -> Vec<Arc<dyn NotificationHandle>> {
        self.registry
            .all_sessions()
            .iter()
            .flat_map(|session| session.unexpired_notifications())
            .collect()
    }
}
