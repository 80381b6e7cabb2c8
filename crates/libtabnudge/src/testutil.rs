//! In-memory fakes for the host collaborator traits.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tabnudge_protocol::{OnNext, SessionId, Suppress, TabState};

use crate::channel::{AlertCenter, AlertSpec};
use crate::host::{
    Destination, SettingsProvider, TabHandle, Toast, WorkspaceHandle, WorkspaceManager,
};
use crate::notification::{Notification, NotificationHandle};
use crate::session::Session;

pub(crate) struct FakeToast {
    title: String,
    expired: AtomicBool,
    on_show: Box<dyn Fn() + Send + Sync>,
}

impl FakeToast {
    pub(crate) fn title(&self) -> &str {
        &self.title
    }

    /// Simulate the user clicking the toast's "show" action.
    pub(crate) fn click(&self) {
        (self.on_show)();
    }
}

impl Toast for FakeToast {
    fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    fn expire(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }
}

pub(crate) struct FakeWorkspace {
    name: String,
    disposed: AtomicBool,
    window_active: AtomicBool,
    focused: AtomicBool,
    toasts: Mutex<Vec<Arc<FakeToast>>>,
}

impl FakeWorkspace {
    pub(crate) fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            disposed: AtomicBool::new(false),
            window_active: AtomicBool::new(false),
            focused: AtomicBool::new(false),
            toasts: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn set_window_active(&self, active: bool) {
        self.window_active.store(active, Ordering::SeqCst);
    }

    pub(crate) fn focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    pub(crate) fn toasts(&self) -> Vec<Arc<FakeToast>> {
        self.toasts.lock().unwrap().clone()
    }

    pub(crate) fn toast_titles(&self) -> Vec<String> {
        self.toasts()
            .iter()
            .map(|toast| toast.title().to_string())
            .collect()
    }

    /// Drop the host-side ownership of all toasts, as if they were garbage
    /// collected.
    pub(crate) fn drop_toasts(&self) {
        self.toasts.lock().unwrap().clear();
    }
}

impl WorkspaceHandle for FakeWorkspace {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn is_window_active(&self) -> bool {
        self.window_active.load(Ordering::SeqCst)
    }

    fn focus_window(&self) {
        self.focused.store(true, Ordering::SeqCst);
    }

    fn show_toast(
        &self,
        title: &str,
        message: &str,
        on_show: Box<dyn Fn() + Send + Sync>,
    ) -> Option<Arc<dyn Toast>> {
        if self.is_disposed() {
            return None;
        }
        let _ = message;
        let toast = Arc::new(FakeToast {
            title: title.to_string(),
            expired: AtomicBool::new(false),
            on_show,
        });
        self.toasts.lock().unwrap().push(Arc::clone(&toast));
        Some(toast)
    }
}

pub(crate) struct FakeTab {
    name: String,
    disposed: AtomicBool,
    present: AtomicBool,
    selected: AtomicBool,
    state: Mutex<TabState>,
}

impl FakeTab {
    pub(crate) fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            disposed: AtomicBool::new(false),
            present: AtomicBool::new(true),
            selected: AtomicBool::new(false),
            state: Mutex::new(TabState::NotVisible),
        })
    }

    pub(crate) fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.present.store(false, Ordering::SeqCst);
    }

    pub(crate) fn remove_from_container(&self) {
        self.present.store(false, Ordering::SeqCst);
    }

    pub(crate) fn set_state(&self, state: TabState) {
        *self.state.lock().unwrap() = state;
    }

    pub(crate) fn selected(&self) -> bool {
        self.selected.load(Ordering::SeqCst)
    }
}

impl TabHandle for FakeTab {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn is_present(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }

    fn tab_state(&self) -> TabState {
        *self.state.lock().unwrap()
    }

    fn select(&self) -> bool {
        if !self.is_present() {
            return false;
        }
        self.selected.store(true, Ordering::SeqCst);
        true
    }
}

pub(crate) struct FakeWorkspaceManager {
    workspaces: Mutex<Vec<Arc<dyn WorkspaceHandle>>>,
}

impl FakeWorkspaceManager {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            workspaces: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn add(&self, workspace: Arc<FakeWorkspace>) {
        self.workspaces.lock().unwrap().push(workspace);
    }
}

impl WorkspaceManager for FakeWorkspaceManager {
    fn open_workspaces(&self) -> Vec<Arc<dyn WorkspaceHandle>> {
        self.workspaces
            .lock()
            .unwrap()
            .iter()
            .filter(|workspace| !workspace.is_disposed())
            .cloned()
            .collect()
    }
}

pub(crate) struct FakeSettings {
    destination: Destination,
}

impl FakeSettings {
    pub(crate) fn in_app() -> Arc<Self> {
        Arc::new(Self {
            destination: Destination::InApp,
        })
    }

    pub(crate) fn system() -> Arc<Self> {
        Arc::new(Self {
            destination: Destination::System,
        })
    }
}

impl SettingsProvider for FakeSettings {
    fn destination(&self) -> Destination {
        self.destination
    }

    fn skip_chooser_when_single(&self) -> bool {
        false
    }
}

#[derive(Default)]
pub(crate) struct FakeAlertCenter {
    delivered: Mutex<Vec<AlertSpec>>,
    handler: Mutex<Option<Arc<dyn Fn(SessionId) + Send + Sync>>>,
    installs: AtomicUsize,
}

impl FakeAlertCenter {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Simulate the user dismissing the alert in the center directly.
    pub(crate) fn dismiss(&self, session_id: &SessionId) {
        self.delivered
            .lock()
            .unwrap()
            .retain(|alert| alert.session_id != *session_id);
    }

    /// Simulate the user clicking a delivered alert.
    pub(crate) fn activate(&self, session_id: &SessionId) {
        let handler = self.handler.lock().unwrap().clone();
        if let Some(handler) = handler {
            handler(session_id.clone());
        }
    }

    pub(crate) fn install_count(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }
}

impl AlertCenter for FakeAlertCenter {
    fn deliver(&self, alert: AlertSpec) {
        self.delivered.lock().unwrap().push(alert);
    }

    fn delivered_sessions(&self) -> Vec<SessionId> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|alert| alert.session_id.clone())
            .collect()
    }

    fn withdraw(&self, session_id: &SessionId) {
        self.dismiss(session_id);
    }

    fn install_activation_handler(&self, handler: Arc<dyn Fn(SessionId) + Send + Sync>) {
        *self.handler.lock().unwrap() = Some(handler);
        self.installs.fetch_add(1, Ordering::SeqCst);
    }
}

/// Plain in-memory notification handle for store-level tests.
pub(crate) struct FakeHandle {
    notification: Arc<Notification>,
    expired: AtomicBool,
}

impl FakeHandle {
    pub(crate) fn new(
        session: &Arc<Session>,
        title: &str,
        suppress: Suppress,
        on_next: OnNext,
    ) -> Arc<Self> {
        Arc::new(Self {
            notification: Notification::new(
                session,
                title.to_string(),
                "message".to_string(),
                suppress,
                on_next,
            ),
            expired: AtomicBool::new(false),
        })
    }

    /// Mark expired without going through `expire`, as if the artifact
    /// vanished out from under the handle.
    pub(crate) fn force_expired(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }
}

impl NotificationHandle for FakeHandle {
    fn notification(&self) -> &Notification {
        &self.notification
    }

    fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    fn expire(&self) {
        self.expired.store(true, Ordering::SeqCst);
    }
}
