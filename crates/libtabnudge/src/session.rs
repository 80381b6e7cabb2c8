//! One terminal tab session and its notification store.

use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use tabnudge_protocol::{OnNext, SessionId, Suppress, TabState};

use crate::channel::NotificationChannel;
use crate::host::{TabHandle, WorkspaceHandle};
use crate::notification::{Notification, NotificationHandle};

/// The 1:1 binding between one terminal tab and the notifications in flight
/// for it.
///
/// The workspace and tab references are non-owning proxies; either may be
/// disposed by the host at any time, so every operation re-checks validity
/// instead of assuming liveness. The store is mutated only under the
/// per-session lock, held for the duration of one scan-and-mutate pass.
pub struct Session {
    id: SessionId,
    weak_self: Weak<Session>,
    workspace: Arc<dyn WorkspaceHandle>,
    tab: Arc<dyn TabHandle>,
    notifications: Mutex<Vec<Arc<dyn NotificationHandle>>>,
}

impl Session {
    pub fn new(workspace: Arc<dyn WorkspaceHandle>, tab: Arc<dyn TabHandle>) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            id: SessionId::generate(),
            weak_self: weak_self.clone(),
            workspace,
            tab,
            notifications: Mutex::new(Vec::new()),
        })
    }

    /// Weak back-reference handed to notifications, so they never keep a
    /// disposed session alive.
    pub(crate) fn weak_self(&self) -> Weak<Session> {
        self.weak_self.clone()
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn workspace(&self) -> &Arc<dyn WorkspaceHandle> {
        &self.workspace
    }

    pub fn tab(&self) -> &Arc<dyn TabHandle> {
        &self.tab
    }

    pub fn add_notification(&self, handle: Arc<dyn NotificationHandle>) {
        self.notifications.lock().unwrap().push(handle);
    }

    /// Remove and return every stored notification.
    pub fn take_all_notifications(&self) -> Vec<Arc<dyn NotificationHandle>> {
        self.take_notifications_if(|_| true)
    }

    /// Remove and return the notifications whose suppression mode matches
    /// `state`.
    pub fn take_suppressed_notifications(
        &self,
        state: TabState,
    ) -> Vec<Arc<dyn NotificationHandle>> {
        self.take_notifications_if(|handle| handle.notification().suppress().matches(state))
    }

    /// Remove and return the notifications posted with [`OnNext::Expire`].
    pub fn take_expired_by_next(&self) -> Vec<Arc<dyn NotificationHandle>> {
        self.take_notifications_if(|handle| handle.notification().on_next() == OnNext::Expire)
    }

    /// The current live notifications, in insertion order, without removing
    /// them. Entries that already expired are dropped along the way; that
    /// removal is not observable by callers.
    pub fn unexpired_notifications(&self) -> Vec<Arc<dyn NotificationHandle>> {
        let mut store = self.notifications.lock().unwrap();
        Self::take_if(&mut store, |_| false);
        store.clone()
    }

    fn take_notifications_if(
        &self,
        predicate: impl Fn(&dyn NotificationHandle) -> bool,
    ) -> Vec<Arc<dyn NotificationHandle>> {
        Self::take_if(&mut self.notifications.lock().unwrap(), predicate)
    }

    /// The one scan primitive behind every store operation: a single pass
    /// that unconditionally drops entries whose handle already expired, and
    /// removes-and-returns the remainder matching `predicate`.
    fn take_if(
        store: &mut Vec<Arc<dyn NotificationHandle>>,
        predicate: impl Fn(&dyn NotificationHandle) -> bool,
    ) -> Vec<Arc<dyn NotificationHandle>> {
        let mut taken = Vec::new();
        store.retain(|handle| {
            if handle.is_expired() {
                return false;
            }
            if predicate(handle.as_ref()) {
                taken.push(Arc::clone(handle));
                return false;
            }
            true
        });
        taken
    }

    /// Deliver a new notification for this session through `channel`.
    ///
    /// Entries posted with [`OnNext::Expire`] are taken and expired first,
    /// so they never outlive this one. Posting is a no-op once the tab
    /// widget has been torn down.
    ///
    /// Must be called on the UI executor.
    pub fn post_notification(
        &self,
        channel: &dyn NotificationChannel,
        title: String,
        message: String,
        suppress: Suppress,
        on_next: OnNext,
        targets: &[Arc<dyn WorkspaceHandle>],
    ) {
        if self.tab.is_disposed() {
            return;
        }

        for stale in self.take_expired_by_next() {
            stale.expire();
        }

        let notification = Notification::new(self, title, message, suppress, on_next);
        let handle = channel.post(notification, targets);
        self.add_notification(handle);
        debug!(session_id = %self.id, "notification posted");
    }

    /// Focus the owning workspace window and select this session's tab.
    ///
    /// Returns false if the workspace or tab is gone. On success, the
    /// notifications suppressed for [`TabState::VisibleActive`] are expired:
    /// navigating just made the tab active, satisfying their condition
    /// retroactively.
    ///
    /// Must be called on the UI executor.
    pub fn navigate_to_tab(&self) -> bool {
        if !self.activate_tab() {
            return false;
        }

        for handle in self.take_suppressed_notifications(TabState::VisibleActive) {
            handle.expire();
        }

        true
    }

    fn activate_tab(&self) -> bool {
        if self.workspace.is_disposed() {
            return false;
        }
        if !self.tab.is_present() {
            return false;
        }

        self.workspace.focus_window();
        self.tab.select()
    }
}
