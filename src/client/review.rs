//! Review dialog state machine.
//!
//! Per monster: Closed → Viewing (pre-filled | blank) → Editing →
//! Submitting → Closed. Opening queries for the caller's existing review
//! and pre-fills it (edit mode); submitting updates by review id when
//! editing and creates otherwise, merging the result into the cache so the
//! next open needs no refetch.

use std::sync::{Arc, Mutex};

use super::api::CharacterApi;
use super::cache::NormalizedCache;
use super::session::AuthSession;
use super::ClientError;
use crate::models::{truncate_description, Review, ReviewInput};

/// Dialog lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Viewing,
    Editing,
    Submitting,
}

/// In-progress form values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewDraft {
    pub difficulty: i32,
    pub description: String,
}

impl From<&Review> for ReviewDraft {
    fn from(review: &Review) -> Self {
        Self {
            difficulty: review.difficulty,
            description: review.description.clone(),
        }
    }
}

/// One monster's review dialog.
pub struct ReviewDialog {
    api: Arc<dyn CharacterApi>,
    cache: Arc<Mutex<NormalizedCache>>,
    monster_id: String,
    state: DialogState,
    saved: Option<Review>,
    draft: ReviewDraft,
}

impl ReviewDialog {
    pub fn new(
        api: Arc<dyn CharacterApi>,
        cache: Arc<Mutex<NormalizedCache>>,
        monster_id: &str,
    ) -> Self {
        Self {
            api,
            cache,
            monster_id: monster_id.to_string(),
            state: DialogState::Closed,
            saved: None,
            draft: ReviewDraft::default(),
        }
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn draft(&self) -> &ReviewDraft {
        &self.draft
    }

    /// True when the dialog holds an existing review, i.e. submit will
    /// update rather than create.
    pub fn is_edit_mode(&self) -> bool {
        self.saved.is_some()
    }

    /// Open the dialog: look up the caller's existing review (cache first,
    /// then server) and pre-fill the form with it, or start blank.
    pub async fn open(&mut self, session: &AuthSession) -> Result<(), ClientError> {
        let existing = match session.user_id() {
            Some(user_id) => {
                let cached = self
                    .cache
                    .lock()
                    .ok()
                    .and_then(|cache| cache.user_review(&self.monster_id, user_id));

                match cached {
                    Some(review) => Some(review),
                    None => {
                        let fetched = self
                            .api
                            .fetch_user_review(&self.monster_id, user_id)
                            .await?;
                        if let (Some(review), Ok(mut cache)) = (&fetched, self.cache.lock()) {
                            cache.merge_monster_review(&self.monster_id, review);
                        }
                        fetched
                    }
                }
            }
            None => None,
        };

        self.draft = existing.as_ref().map(ReviewDraft::from).unwrap_or_default();
        self.saved = existing;
        self.state = DialogState::Viewing;
        Ok(())
    }

    /// Set the difficulty, constrained to [0, 100] in steps of 10.
    pub fn set_difficulty(&mut self, value: i32) {
        self.draft.difficulty = snap_difficulty(value);
        self.touch();
    }

    /// Set the description, truncated to the maximum stored length.
    pub fn set_description(&mut self, text: &str) {
        self.draft.description = truncate_description(text);
        self.touch();
    }

    /// Submit the form. Rejected before any network call when the session
    /// is unauthenticated; server failures leave the dialog open (editing)
    /// for retry.
    pub async fn submit(&mut self, session: &AuthSession) -> Result<Review, ClientError> {
        if !session.is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }

        self.state = DialogState::Submitting;
        let input = ReviewInput {
            difficulty: self.draft.difficulty,
            description: self.draft.description.clone(),
        };

        let result = match &self.saved {
            Some(existing) => self.api.update_review(&existing.id, input).await,
            None => self.api.add_review(&self.monster_id, input).await,
        };

        match result {
            Ok(review) => {
                if let Ok(mut cache) = self.cache.lock() {
                    cache.merge_monster_review(&self.monster_id, &review);
                }
                self.draft = ReviewDraft::from(&review);
                self.saved = Some(review.clone());
                self.state = DialogState::Closed;
                Ok(review)
            }
            Err(e) => {
                self.state = DialogState::Editing;
                Err(e)
            }
        }
    }

    /// Discard in-progress edits: the form goes back to the last-saved
    /// values, or blank if nothing was ever saved.
    pub fn cancel(&mut self) {
        self.draft = self
            .saved
            .as_ref()
            .map(ReviewDraft::from)
            .unwrap_or_default();
        self.state = DialogState::Closed;
    }

    fn touch(&mut self) {
        if self.state == DialogState::Viewing {
            self.state = DialogState::Editing;
        }
    }
}

/// Clamp to [0, 100] and snap to the nearest step of 10.
fn snap_difficulty(value: i32) -> i32 {
    let clamped = value.clamp(0, 100);
    ((clamped + 5) / 10) * 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{test_user, MockApi};
    use crate::client::{AuthSession, MemoryStore};

    fn logged_in_session(user_id: &str, user_name: &str) -> AuthSession {
        let store = Arc::new(MemoryStore::new());
        let mut session = AuthSession::load(store);
        session.login("tok", user_id, user_name);
        session
    }

    fn dialog_with(api: Arc<MockApi>) -> ReviewDialog {
        let cache = Arc::new(Mutex::new(NormalizedCache::new()));
        ReviewDialog::new(api, cache, "monster-1")
    }

    #[tokio::test]
    async fn test_submit_then_reopen_prefills_edit_mode() {
        let api = MockApi::new();
        api.put_user(test_user("u1", "frodo"));
        api.set_current_user("u1", "frodo");

        let mut dialog = dialog_with(api);
        let session = logged_in_session("u1", "frodo");

        dialog.open(&session).await.unwrap();
        assert_eq!(dialog.state(), DialogState::Viewing);
        assert!(!dialog.is_edit_mode());

        dialog.set_difficulty(50);
        dialog.set_description("New review");
        assert_eq!(dialog.state(), DialogState::Editing);

        dialog.submit(&session).await.unwrap();
        assert_eq!(dialog.state(), DialogState::Closed);

        // Reopening pre-fills from the merged cache entry, in edit mode
        dialog.open(&session).await.unwrap();
        assert!(dialog.is_edit_mode());
        assert_eq!(dialog.draft().difficulty, 50);
        assert_eq!(dialog.draft().description, "New review");
    }

    #[tokio::test]
    async fn test_unauthenticated_submit_rejected_before_network() {
        let api = MockApi::new();
        api.put_user(test_user("u1", "frodo"));

        let mut dialog = dialog_with(api.clone());
        let store = Arc::new(MemoryStore::new());
        let session = AuthSession::load(store); // never logged in

        dialog.open(&session).await.unwrap();
        dialog.set_difficulty(30);
        dialog.set_description("should not reach the server");

        let result = dialog.submit(&session).await;
        assert_eq!(result, Err(ClientError::NotAuthenticated));
        assert_eq!(api.review_count("monster-1"), 0);
    }

    #[tokio::test]
    async fn test_server_failure_leaves_dialog_open_for_retry() {
        let api = MockApi::new();
        api.put_user(test_user("u1", "frodo"));
        api.set_current_user("u1", "frodo");

        let mut dialog = dialog_with(api.clone());
        let session = logged_in_session("u1", "frodo");

        dialog.open(&session).await.unwrap();
        dialog.set_difficulty(40);
        dialog.set_description("flaky network");

        api.fail_next();
        let result = dialog.submit(&session).await;
        assert!(matches!(result, Err(ClientError::Network(_))));
        assert_eq!(dialog.state(), DialogState::Editing);

        // Retry succeeds without re-entering anything
        dialog.submit(&session).await.unwrap();
        assert_eq!(dialog.state(), DialogState::Closed);
        assert_eq!(api.review_count("monster-1"), 1);
    }

    #[tokio::test]
    async fn test_cancel_restores_last_saved_values() {
        let api = MockApi::new();
        api.put_user(test_user("u1", "frodo"));
        api.set_current_user("u1", "frodo");

        let mut dialog = dialog_with(api);
        let session = logged_in_session("u1", "frodo");

        dialog.open(&session).await.unwrap();
        dialog.set_difficulty(50);
        dialog.set_description("keeper");
        dialog.submit(&session).await.unwrap();

        dialog.open(&session).await.unwrap();
        dialog.set_difficulty(90);
        dialog.set_description("discarded edit");
        dialog.cancel();

        assert_eq!(dialog.draft().difficulty, 50);
        assert_eq!(dialog.draft().description, "keeper");
    }

    #[test]
    fn test_snap_difficulty() {
        assert_eq!(snap_difficulty(47), 50);
        assert_eq!(snap_difficulty(44), 40);
        assert_eq!(snap_difficulty(-5), 0);
        assert_eq!(snap_difficulty(120), 100);
        assert_eq!(snap_difficulty(95), 100);
    }

    #[tokio::test]
    async fn test_description_truncated_to_limit() {
        let api = MockApi::new();
        api.put_user(test_user("u1", "frodo"));
        api.set_current_user("u1", "frodo");

        let mut dialog = dialog_with(api);
        let session = logged_in_session("u1", "frodo");

        dialog.open(&session).await.unwrap();
        dialog.set_description(&"y".repeat(450));
        assert_eq!(dialog.draft().description.chars().count(), 300);

        dialog.set_difficulty(10);
        let review = dialog.submit(&session).await.unwrap();
        assert_eq!(review.description.chars().count(), 300);
    }
}
