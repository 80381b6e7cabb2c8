//! Delivery channels.
//!
//! A channel turns a logical notification into a delivered artifact and
//! returns the handle tracking it. Channels only display; routing,
//! suppression, and lifecycle bookkeeping live in the notifier and the
//! session store.

mod in_app;
mod native;

pub use in_app::InAppChannel;
pub use native::{AlertCenter, AlertSpec, NativeChannel};

use std::sync::Arc;

use crate::host::WorkspaceHandle;
use crate::notification::{Notification, NotificationHandle};

pub trait NotificationChannel: Send + Sync {
    /// Deliver `notification` to `targets` and return the handle tracking
    /// the delivery. One logical notification fans out to every target
    /// behind a single handle.
    ///
    /// Must be called on the UI executor.
    fn post(
        &self,
        notification: Arc<Notification>,
        targets: &[Arc<dyn WorkspaceHandle>],
    ) -> Arc<dyn NotificationHandle>;
}
