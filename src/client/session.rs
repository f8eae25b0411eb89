//! Auth session and equipment-browse state, persisted through a
//! [`StateStore`].

use std::sync::Arc;

use super::store::StateStore;

const TOKEN_KEY: &str = "token";
const USER_ID_KEY: &str = "userId";
const USER_NAME_KEY: &str = "userName";

const SEARCH_TERM_KEY: &str = "equipmentSearchTerm";
const CURRENT_PAGE_KEY: &str = "equipmentCurrentPage";

/// The signed-in user's identity and bearer token. Loaded from the store on
/// construction, written back on every change.
pub struct AuthSession {
    store: Arc<dyn StateStore>,
    token: Option<String>,
    user_id: Option<String>,
    user_name: Option<String>,
}

impl AuthSession {
    /// Load any persisted session from the store.
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        let token = store.get(TOKEN_KEY);
        let user_id = store.get(USER_ID_KEY);
        let user_name = store.get(USER_NAME_KEY);

        Self {
            store,
            token,
            user_id,
            user_name,
        }
    }

    /// Record a successful login and persist it.
    pub fn login(&mut self, token: &str, user_id: &str, user_name: &str) {
        self.store.set(TOKEN_KEY, token);
        self.store.set(USER_ID_KEY, user_id);
        self.store.set(USER_NAME_KEY, user_name);
        self.token = Some(token.to_string());
        self.user_id = Some(user_id.to_string());
        self.user_name = Some(user_name.to_string());
    }

    /// Clear the session, both locally and in the store.
    pub fn logout(&mut self) {
        self.store.remove(TOKEN_KEY);
        self.store.remove(USER_ID_KEY);
        self.store.remove(USER_NAME_KEY);
        self.token = None;
        self.user_id = None;
        self.user_name = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user_id.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }
}

/// In-progress search term and pagination cursor for the equipment listing.
/// Persisted under session keys, cleared when the listing unmounts.
pub struct EquipmentBrowser {
    store: Arc<dyn StateStore>,
    search_term: String,
    current_page: u32,
}

impl EquipmentBrowser {
    /// Restore any persisted browse state.
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        let search_term = store.get(SEARCH_TERM_KEY).unwrap_or_default();
        let current_page = store
            .get(CURRENT_PAGE_KEY)
            .and_then(|p| p.parse().ok())
            .unwrap_or(1);

        Self {
            store,
            search_term,
            current_page,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
        self.store.set(SEARCH_TERM_KEY, term);
    }

    pub fn set_current_page(&mut self, page: u32) {
        self.current_page = page.max(1);
        self.store
            .set(CURRENT_PAGE_KEY, &self.current_page.to_string());
    }

    /// Drop the persisted browse state. Called when the listing unmounts.
    pub fn unmount(self) {
        self.store.remove(SEARCH_TERM_KEY);
        self.store.remove(CURRENT_PAGE_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryStore;

    #[test]
    fn test_session_persists_across_loads() {
        let store = Arc::new(MemoryStore::new());

        let mut session = AuthSession::load(store.clone());
        assert!(!session.is_authenticated());

        session.login("tok", "user-1", "aragorn");
        assert!(session.is_authenticated());

        // A new session over the same store sees the login
        let reloaded = AuthSession::load(store.clone());
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.user_id(), Some("user-1"));
        assert_eq!(reloaded.user_name(), Some("aragorn"));
        assert_eq!(reloaded.token(), Some("tok"));
    }

    #[test]
    fn test_logout_clears_store() {
        let store = Arc::new(MemoryStore::new());

        let mut session = AuthSession::load(store.clone());
        session.login("tok", "user-1", "aragorn");
        session.logout();

        let reloaded = AuthSession::load(store);
        assert!(!reloaded.is_authenticated());
    }

    #[test]
    fn test_browser_state_cleared_on_unmount() {
        let store = Arc::new(MemoryStore::new());

        let mut browser = EquipmentBrowser::load(store.clone());
        browser.set_search_term("sword");
        browser.set_current_page(3);

        let restored = EquipmentBrowser::load(store.clone());
        assert_eq!(restored.search_term(), "sword");
        assert_eq!(restored.current_page(), 3);

        restored.unmount();
        let cleared = EquipmentBrowser::load(store);
        assert_eq!(cleared.search_term(), "");
        assert_eq!(cleared.current_page(), 1);
    }
}
