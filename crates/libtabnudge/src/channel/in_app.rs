//! Toast delivery inside the host's workspace windows.

use std::sync::{Arc, Weak};

use tracing::debug;

use crate::channel::NotificationChannel;
use crate::host::{Toast, WorkspaceHandle};
use crate::notification::{Notification, NotificationHandle};

/// Shows one toast per target workspace, each carrying a "show" action that
/// navigates back to the originating tab.
pub struct InAppChannel;

impl NotificationChannel for InAppChannel {
    fn post(
        &self,
        notification: Arc<Notification>,
        targets: &[Arc<dyn WorkspaceHandle>],
    ) -> Arc<dyn NotificationHandle> {
        let toasts: Vec<Weak<dyn Toast>> = targets
            .iter()
            .filter(|workspace| !workspace.is_disposed())
            .filter_map(|workspace| {
                let on_show = {
                    let notification = Arc::clone(&notification);
                    Box::new(move || {
                        if let Some(session) = notification.session() {
                            session.navigate_to_tab();
                        }
                    }) as Box<dyn Fn() + Send + Sync>
                };

                workspace
                    .show_toast(&notification.title_for(workspace), notification.message(), on_show)
                    // The host owns the toast; we only track it weakly.
                    .map(|toast| Arc::downgrade(&toast))
            })
            .collect();

        debug!(
            session_id = %notification.session_id(),
            toasts = toasts.len(),
            "posted in-app notification"
        );

        Arc::new(InAppHandle {
            notification,
            toasts,
        })
    }
}

/// Handle spanning the per-workspace toasts of one logical notification.
struct InAppHandle {
    notification: Arc<Notification>,
    toasts: Vec<Weak<dyn Toast>>,
}

impl NotificationHandle for InAppHandle {
    fn notification(&self) -> &Notification {
        &self.notification
    }

    /// True only when every per-workspace toast was dismissed, expired, or
    /// collected by its owner.
    fn is_expired(&self) -> bool {
        self.toasts
            .iter()
            .all(|toast| toast.upgrade().is_none_or(|t| t.is_expired()))
    }

    fn expire(&self) {
        for toast in &self.toasts {
            if let Some(toast) = toast.upgrade() {
                toast.expire();
            }
        }
    }
}
