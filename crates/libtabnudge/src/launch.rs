//! Binding freshly spawned terminals to sessions.
//!
//! The host calls [`bind_terminal`] while assembling the environment for a
//! new shell process, and [`release_terminal`] from the tab's disposal hook.

use std::sync::Arc;

use tracing::info;

use crate::host::{TabHandle, WorkspaceHandle};
use crate::notifier::Notifier;
use crate::registry::SessionRegistry;
use crate::session::Session;

/// Environment variable carrying the notify endpoint URL.
pub const ENV_ENDPOINT: &str = "TABNUDGE_ENDPOINT";
/// Environment variable carrying the shell's own session id.
pub const ENV_SESSION_ID: &str = "TABNUDGE_SESSION_ID";

/// Create and register a session for a newly created tab, returning it
/// together with the environment the spawned shell needs to call home.
pub fn bind_terminal(
    registry: &SessionRegistry,
    workspace: Arc<dyn WorkspaceHandle>,
    tab: Arc<dyn TabHandle>,
    endpoint_url: &str,
) -> (Arc<Session>, Vec<(String, String)>) {
    let session = Session::new(workspace, tab);
    registry.register(Arc::clone(&session));

    let envs = vec![
        (ENV_ENDPOINT.to_string(), endpoint_url.to_string()),
        (ENV_SESSION_ID.to_string(), session.id().to_string()),
    ];

    info!(session_id = %session.id(), "terminal bound");
    (session, envs)
}

/// Tear down a disposed tab's session: unregister it and force-expire
/// whatever it still holds.
pub fn release_terminal(registry: &SessionRegistry, notifier: &Notifier, session: &Session) {
    registry.unregister(session);
    notifier.expire_session_notifications(session);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::UiExecutor;
    use crate::host::{Toast, WorkspaceManager};
    use crate::testutil::{FakeSettings, FakeTab, FakeWorkspace, FakeWorkspaceManager};

    #[test]
    fn bind_registers_and_produces_env() {
        let registry = SessionRegistry::new();
        let (session, envs) = bind_terminal(
            &registry,
            FakeWorkspace::new("home"),
            FakeTab::new("zsh"),
            "http://127.0.0.1:8099/api/notify",
        );

        assert!(registry.find_by_id(session.id()).is_some());
        assert_eq!(
            envs,
            vec![
                (
                    ENV_ENDPOINT.to_string(),
                    "http://127.0.0.1:8099/api/notify".to_string()
                ),
                (ENV_SESSION_ID.to_string(), session.id().to_string()),
            ]
        );
    }

    #[test]
    fn release_unregisters_and_expires() {
        let registry = Arc::new(SessionRegistry::new());
        let workspaces = FakeWorkspaceManager::new();
        let ui = Arc::new(UiExecutor::new());
        let notifier = Notifier::new(
            Arc::clone(&registry),
            workspaces.clone(),
            FakeSettings::in_app(),
            Arc::clone(&ui),
            None,
        );

        let home = FakeWorkspace::new("home");
        workspaces.add(home.clone());
        let (session, _envs) = bind_terminal(
            &registry,
            home.clone(),
            FakeTab::new("zsh"),
            "http://127.0.0.1:0/api/notify",
        );

        ui.run_and_wait({
            let session = Arc::clone(&session);
            let targets = workspaces.open_workspaces();
            move || {
                session.post_notification(
                    &crate::channel::InAppChannel,
                    "t".to_string(),
                    "m".to_string(),
                    tabnudge_protocol::Suppress::WhenActive,
                    tabnudge_protocol::OnNext::Expire,
                    &targets,
                );
            }
        });
        assert_eq!(session.unexpired_notifications().len(), 1);

        release_terminal(&registry, &notifier, &session);

        assert!(registry.find_by_id(session.id()).is_none());
        assert!(session.unexpired_notifications().is_empty());
        assert!(home.toasts().iter().all(|t| t.is_expired()));
    }
}
