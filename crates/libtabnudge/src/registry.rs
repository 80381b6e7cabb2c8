//! Process-wide session registry.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use tabnudge_protocol::SessionId;

use crate::host::TabHandle;
use crate::session::Session;

/// Map of live sessions, keyed by session id.
///
/// Entries are added when a tab is created and removed when the tab is
/// disposed. `DashMap` keeps insert/remove/lookup-by-id O(1) and safe under
/// arbitrary concurrent callers without a global lock. Lookup by tab is a
/// linear scan over a snapshot; tab counts stay small in practice (well
/// under 100), so O(n) is acceptable there.
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn register(&self, session: Arc<Session>) {
        info!(session_id = %session.id(), "session registered");
        self.sessions.insert(session.id().clone(), session);
    }

    pub fn unregister(&self, session: &Session) {
        self.sessions.remove(session.id());
        info!(session_id = %session.id(), "session unregistered");
    }

    pub fn find_by_id(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Identity lookup: matches the exact tab handle, never an equal-looking
    /// one.
    pub fn find_by_tab(&self, tab: &Arc<dyn TabHandle>) -> Option<Arc<Session>> {
        self.all_sessions()
            .into_iter()
            .find(|session| Arc::ptr_eq(session.tab(), tab))
    }

    /// Point-in-time snapshot, in no particular order.
    pub fn all_sessions(&self) -> Vec<Arc<Session>> {
        self.sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::WorkspaceHandle;
    use crate::testutil::{FakeTab, FakeWorkspace};

    fn session_with_tab(tab: Arc<dyn TabHandle>) -> Arc<Session> {
        Session::new(FakeWorkspace::new("alpha"), tab)
    }

    #[test]
    fn register_then_find_by_id() {
        let registry = SessionRegistry::new();
        let session = session_with_tab(FakeTab::new("zsh"));
        registry.register(Arc::clone(&session));

        let found = registry.find_by_id(session.id()).unwrap();
        assert!(Arc::ptr_eq(&found, &session));
    }

    #[test]
    fn find_by_id_returns_none_for_unknown() {
        let registry = SessionRegistry::new();
        assert!(registry.find_by_id(&SessionId::generate()).is_none());
    }

    #[test]
    fn unregister_removes_only_that_session() {
        let registry = SessionRegistry::new();
        let one = session_with_tab(FakeTab::new("zsh"));
        let two = session_with_tab(FakeTab::new("bash"));
        registry.register(Arc::clone(&one));
        registry.register(Arc::clone(&two));

        registry.unregister(&one);

        assert!(registry.find_by_id(one.id()).is_none());
        assert!(registry.find_by_id(two.id()).is_some());
    }

    #[test]
    fn find_by_tab_uses_reference_identity() {
        let registry = SessionRegistry::new();
        let tab: Arc<dyn TabHandle> = FakeTab::new("zsh");
        let lookalike: Arc<dyn TabHandle> = FakeTab::new("zsh");
        let session = session_with_tab(Arc::clone(&tab));
        registry.register(Arc::clone(&session));

        assert!(registry.find_by_tab(&tab).is_some());
        assert!(registry.find_by_tab(&lookalike).is_none());
    }

    #[test]
    fn all_sessions_snapshots_current_entries() {
        let registry = SessionRegistry::new();
        assert!(registry.all_sessions().is_empty());

        let session = session_with_tab(FakeTab::new("zsh"));
        registry.register(Arc::clone(&session));
        assert_eq!(registry.all_sessions().len(), 1);

        registry.unregister(&session);
        assert!(registry.all_sessions().is_empty());
    }

    #[test]
    fn concurrent_register_and_lookup() {
        let registry = Arc::new(SessionRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let session = Session::new(FakeWorkspace::new("w"), FakeTab::new("t"));
                        registry.register(Arc::clone(&session));
                        assert!(registry.find_by_id(session.id()).is_some());
                        registry.unregister(&session);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(registry.all_sessions().is_empty());
    }

    #[test]
    fn registered_sessions_expose_their_workspace() {
        let workspace = FakeWorkspace::new("alpha");
        let registry = SessionRegistry::new();
        let session = Session::new(workspace.clone(), FakeTab::new("zsh"));
        registry.register(Arc::clone(&session));

        let found = registry.find_by_id(session.id()).unwrap();
        assert_eq!(found.workspace().name(), "alpha");
    }
}
