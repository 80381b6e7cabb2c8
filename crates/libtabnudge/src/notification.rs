//! The logical notification and the handle capability.

use std::sync::{Arc, Weak};

use tabnudge_protocol::{OnNext, SessionId, Suppress};

use crate::host::WorkspaceHandle;
use crate::session::Session;

/// Content and lifecycle attributes of one notification, independent of the
/// channel that delivers it. Immutable after creation.
///
/// Holds only a weak back-reference to its session: once the tab is disposed
/// and its session unregistered, anything still pointing at this notification
/// degrades to a no-op instead of keeping the session alive.
pub struct Notification {
    session: Weak<Session>,
    session_id: SessionId,
    title: String,
    message: String,
    suppress: Suppress,
    on_next: OnNext,
}

impl Notification {
    pub(crate) fn new(
        session: &Session,
        title: String,
        message: String,
        suppress: Suppress,
        on_next: OnNext,
    ) -> Arc<Self> {
        Arc::new(Self {
            session: session.weak_self(),
            session_id: session.id().clone(),
            title,
            message,
            suppress,
            on_next,
        })
    }

    /// The owning session, if it is still registered.
    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.upgrade()
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suppress(&self) -> Suppress {
        self.suppress
    }

    pub fn on_next(&self) -> OnNext {
        self.on_next
    }

    /// Title as displayed in `target`: notifications shown in a workspace
    /// other than the one owning the session get that workspace's name as a
    /// prefix.
    pub fn title_for(&self, target: &Arc<dyn WorkspaceHandle>) -> String {
        match self.session.upgrade() {
            Some(session) if !Arc::ptr_eq(session.workspace(), target) => {
                format!("[{}] {}", session.workspace().name(), self.title)
            }
            _ => self.title.clone(),
        }
    }
}

/// Capability for observing and forcing the expiration of one delivered
/// notification.
///
/// Implementations wrap weak or state-tagged references to the delivered
/// artifact, so both operations stay safe after the artifact was dismissed
/// or collected independently. Callable from any thread; implementations
/// never take a session lock.
pub trait NotificationHandle: Send + Sync {
    fn notification(&self) -> &Notification;

    fn is_expired(&self) -> bool;

    fn expire(&self);
}
