//! Delivery through the OS notification center.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use tabnudge_protocol::SessionId;

use crate::channel::NotificationChannel;
use crate::executor::UiExecutor;
use crate::host::WorkspaceHandle;
use crate::notification::{Notification, NotificationHandle};
use crate::registry::SessionRegistry;

/// One alert as handed to the OS notification center.
pub struct AlertSpec {
    pub title: String,
    pub message: String,
    /// Embedded as opaque metadata; the activation handler routes on it.
    pub session_id: SessionId,
}

/// The host's OS notification center.
///
/// Implementations must be callable from any thread. The engine funnels
/// `deliver` and the withdrawal after expiry through its UI executor, which
/// is all the serialization the delivery lifecycle relies on;
/// `delivered_sessions` may race against both and is only used for
/// opportunistic self-healing.
pub trait AlertCenter: Send + Sync {
    /// Show one alert.
    fn deliver(&self, alert: AlertSpec);

    /// Session ids embedded in the alerts currently sitting in the center.
    fn delivered_sessions(&self) -> Vec<SessionId>;

    /// Remove the delivered alert carrying `session_id`, if any.
    fn withdraw(&self, session_id: &SessionId);

    /// Install the process-wide activation callback, invoked with the
    /// session id of whichever alert the user clicked. Called at most once
    /// per process.
    fn install_activation_handler(&self, handler: Arc<dyn Fn(SessionId) + Send + Sync>);
}

// Handle lifecycle. Delivery to the center is asynchronous relative to the
// post that requested it, so each handle moves Created -> Delivered (CAS,
// one-way) and Created|Delivered -> Expired (unconditional). An expire that
// lands before delivery wins: deliver observes Expired and never shows the
// alert.
const CREATED: u8 = 0;
const DELIVERED: u8 = 1;
const EXPIRED: u8 = 2;

/// Delivers one OS alert per notification and routes activation clicks back
/// to the originating tab.
pub struct NativeChannel {
    center: Arc<dyn AlertCenter>,
    registry: Arc<SessionRegistry>,
    ui: Arc<UiExecutor>,
    delegate_installed: Mutex<bool>,
}

impl NativeChannel {
    pub fn new(
        center: Arc<dyn AlertCenter>,
        registry: Arc<SessionRegistry>,
        ui: Arc<UiExecutor>,
    ) -> Self {
        Self {
            center,
            registry,
            ui,
            delegate_installed: Mutex::new(false),
        }
    }

    /// Idempotent: the first post wires the center's activation callback to
    /// registry lookup plus tab navigation on the UI executor.
    fn ensure_delegate_installed(&self) {
        let mut installed = self.delegate_installed.lock().unwrap();
        if *installed {
            return;
        }

        let registry = Arc::clone(&self.registry);
        let ui = Arc::clone(&self.ui);
        self.center
            .install_activation_handler(Arc::new(move |session_id: SessionId| {
                let registry = Arc::clone(&registry);
                ui.submit(move || {
                    if let Some(session) = registry.find_by_id(&session_id) {
                        session.navigate_to_tab();
                    }
                });
            }));

        *installed = true;
        debug!("installed notification center delegate");
    }
}

impl NotificationChannel for NativeChannel {
    fn post(
        &self,
        notification: Arc<Notification>,
        _targets: &[Arc<dyn WorkspaceHandle>],
    ) -> Arc<dyn NotificationHandle> {
        self.ensure_delegate_installed();

        let handle = Arc::new(NativeHandle {
            notification,
            state: AtomicU8::new(CREATED),
            center: Arc::clone(&self.center),
            ui: Arc::clone(&self.ui),
        });

        let delivery = Arc::clone(&handle);
        self.ui.submit(move || {
            delivery.deliver();
        });

        handle
    }
}

/// Handle for one OS alert.
pub struct NativeHandle {
    notification: Arc<Notification>,
    state: AtomicU8,
    center: Arc<dyn AlertCenter>,
    ui: Arc<UiExecutor>,
}

impl NativeHandle {
    /// Show the alert unless an expire raced ahead. Runs on the UI executor.
    ///
    /// Returns whether the alert was actually handed to the center.
    pub fn deliver(&self) -> bool {
        if self
            .state
            .compare_exchange(CREATED, DELIVERED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(session_id = %self.notification.session_id(), "alert expired before delivery");
            return false;
        }

        self.center.deliver(AlertSpec {
            title: self.notification.title().to_string(),
            message: self.notification.message().to_string(),
            session_id: self.notification.session_id().clone(),
        });
        true
    }
}

impl NotificationHandle for NativeHandle {
    fn notification(&self) -> &Notification {
        &self.notification
    }

    fn is_expired(&self) -> bool {
        match self.state.load(Ordering::SeqCst) {
            EXPIRED => true,
            CREATED => false,
            _ => {
                // Delivered, but the user may have dismissed the alert in the
                // center directly; self-heal when the scan no longer sees it.
                let gone = !self
                    .center
                    .delivered_sessions()
                    .contains(self.notification.session_id());
                if gone {
                    self.state.store(EXPIRED, Ordering::SeqCst);
                }
                gone
            }
        }
    }

    fn expire(&self) {
        // Mark first so a pending deliver is suppressed, then withdraw the
        // alert if one already reached the center.
        let previous = self.state.swap(EXPIRED, Ordering::SeqCst);
        if previous == DELIVERED {
            let center = Arc::clone(&self.center);
            let session_id = self.notification.session_id().clone();
            self.ui.submit(move || center.withdraw(&session_id));
        }
    }
}

#[cfg(test)]
mod tests {
    use tabnudge_protocol::{OnNext, Suppress};

    use super::*;
    use crate::session::Session;
    use crate::testutil::{FakeAlertCenter, FakeTab, FakeWorkspace};

    struct Fixture {
        center: Arc<FakeAlertCenter>,
        registry: Arc<SessionRegistry>,
        ui: Arc<UiExecutor>,
        channel: NativeChannel,
    }

    fn fixture() -> Fixture {
        let center = FakeAlertCenter::new();
        let registry = Arc::new(SessionRegistry::new());
        let ui = Arc::new(UiExecutor::new());
        let channel = NativeChannel::new(
            center.clone(),
            Arc::clone(&registry),
            Arc::clone(&ui),
        );
        Fixture {
            center,
            registry,
            ui,
            channel,
        }
    }

    fn notification_for(session: &Arc<Session>) -> Arc<Notification> {
        Notification::new(
            session,
            "Build finished".to_string(),
            "exit 0".to_string(),
            Suppress::WhenActive,
            OnNext::Expire,
        )
    }

    #[test]
    fn post_delivers_one_alert_with_session_metadata() {
        let f = fixture();
        let session = Session::new(FakeWorkspace::new("w"), FakeTab::new("t"));

        let handle = f.channel.post(notification_for(&session), &[]);
        f.ui.flush();

        assert_eq!(f.center.delivered_sessions(), [session.id().clone()]);
        assert!(!handle.is_expired());
    }

    #[test]
    fn expire_before_delivery_suppresses_the_alert() {
        let f = fixture();
        let session = Session::new(FakeWorkspace::new("w"), FakeTab::new("t"));
        let notification = notification_for(&session);

        // Drive the handle directly so expire can land before deliver.
        let handle = NativeHandle {
            notification,
            state: AtomicU8::new(CREATED),
            center: f.center.clone(),
            ui: Arc::clone(&f.ui),
        };

        handle.expire();
        assert!(!handle.deliver());

        f.ui.flush();
        assert!(f.center.delivered_sessions().is_empty());
        assert!(handle.is_expired());
    }

    #[test]
    fn expire_after_delivery_withdraws_the_alert() {
        let f = fixture();
        let session = Session::new(FakeWorkspace::new("w"), FakeTab::new("t"));

        let handle = f.channel.post(notification_for(&session), &[]);
        f.ui.flush();
        assert_eq!(f.center.delivered_sessions().len(), 1);

        handle.expire();
        f.ui.flush();

        assert!(f.center.delivered_sessions().is_empty());
        assert!(handle.is_expired());
    }

    #[test]
    fn is_expired_self_heals_when_alert_was_dismissed_in_center() {
        let f = fixture();
        let session = Session::new(FakeWorkspace::new("w"), FakeTab::new("t"));

        let handle = f.channel.post(notification_for(&session), &[]);
        f.ui.flush();
        assert!(!handle.is_expired());

        // User swipes the alert away in the center itself.
        f.center.dismiss(session.id());

        assert!(handle.is_expired());
        // Healed state sticks without another scan.
        f.center.deliver(AlertSpec {
            title: "t".into(),
            message: "m".into(),
            session_id: session.id().clone(),
        });
        assert!(handle.is_expired());
    }

    #[test]
    fn delegate_installs_once_across_posts() {
        let f = fixture();
        let session = Session::new(FakeWorkspace::new("w"), FakeTab::new("t"));

        f.channel.post(notification_for(&session), &[]);
        f.channel.post(notification_for(&session), &[]);
        f.ui.flush();

        assert_eq!(f.center.install_count(), 1);
    }

    #[test]
    fn activation_navigates_to_the_registered_session() {
        let f = fixture();
        let workspace = FakeWorkspace::new("w");
        let tab = FakeTab::new("t");
        let session = Session::new(workspace.clone(), tab.clone());
        f.registry.register(Arc::clone(&session));

        f.channel.post(notification_for(&session), &[]);
        f.ui.flush();

        f.center.activate(session.id());
        f.ui.flush();

        assert!(tab.selected());
        assert!(workspace.focused());
    }

    #[test]
    fn activation_for_unregistered_session_is_a_noop() {
        let f = fixture();
        let tab = FakeTab::new("t");
        let session = Session::new(FakeWorkspace::new("w"), tab.clone());
        // Never registered.

        f.channel.post(notification_for(&session), &[]);
        f.ui.flush();
        f.center.activate(session.id());
        f.ui.flush();

        assert!(!tab.selected());
    }
}
