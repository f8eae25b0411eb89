//! Character context: single source of truth for the signed-in user's
//! customization state during a session.
//!
//! Race/class/ability selections are server-first: the local value changes
//! only after the server confirms. Equipment operations are optimistic:
//! the pre-mutation list is recorded, the new value applied immediately,
//! and the recorded value restored if the persist call fails.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::api::CharacterApi;
use super::cache::NormalizedCache;
use super::toast::{ToastBus, ToastKind};
use super::undo::{UndoBuffer, UndoSlot};
use super::ClientError;
use crate::models::{AbilityScoreEntry, Class, Equipment, Race, User, MAX_EQUIPMENTS};

const TOAST_SHORT: Duration = Duration::from_secs(2);
const TOAST_MEDIUM: Duration = Duration::from_secs(3);
const TOAST_UNDO_WINDOW: Duration = Duration::from_secs(5);

/// Reactive character state plus the toast/undo machinery the equipment
/// flows are built on.
pub struct CharacterContext {
    api: Arc<dyn CharacterApi>,
    cache: Arc<Mutex<NormalizedCache>>,
    user_id: String,
    race: Option<Race>,
    class: Option<Class>,
    ability_scores: Vec<AbilityScoreEntry>,
    equipments: Vec<Equipment>,
    toasts: ToastBus,
    undo: UndoSlot,
}

impl CharacterContext {
    /// Build a context from an already-fetched user (the login response).
    pub fn new(api: Arc<dyn CharacterApi>, cache: Arc<Mutex<NormalizedCache>>, user: &User) -> Self {
        let mut context = Self {
            api,
            cache,
            user_id: user.id.clone(),
            race: None,
            class: None,
            ability_scores: Vec::new(),
            equipments: Vec::new(),
            toasts: ToastBus::new(),
            undo: UndoSlot::new(),
        };
        context.reconcile(user);
        context
    }

    /// Refetch the user and reconcile local state.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let user = self
            .api
            .fetch_user(&self.user_id)
            .await?
            .ok_or_else(|| ClientError::Server("User not found".to_string()))?;
        self.reconcile(&user);
        Ok(())
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn race(&self) -> Option<&Race> {
        self.race.as_ref()
    }

    pub fn class(&self) -> Option<&Class> {
        self.class.as_ref()
    }

    pub fn ability_scores(&self) -> &[AbilityScoreEntry] {
        &self.ability_scores
    }

    pub fn equipments(&self) -> &[Equipment] {
        &self.equipments
    }

    pub fn toasts(&self) -> &ToastBus {
        &self.toasts
    }

    pub fn undo_slot(&self) -> &UndoSlot {
        &self.undo
    }

    // ==================== SELECTION OPERATIONS ====================

    /// Change the race selection. On failure the prior selection stays.
    pub async fn update_race(&mut self, race_id: &str) -> Result<(), ClientError> {
        let user = self.api.update_race(&self.user_id, race_id).await?;
        self.reconcile(&user);
        Ok(())
    }

    /// Change the class selection. On failure the prior selection stays.
    pub async fn update_class(&mut self, class_id: &str) -> Result<(), ClientError> {
        let user = self.api.update_class(&self.user_id, class_id).await?;
        self.reconcile(&user);
        Ok(())
    }

    /// Set one ability score.
    pub async fn set_ability_score(
        &mut self,
        ability_id: &str,
        score: i32,
    ) -> Result<(), ClientError> {
        let user = self
            .api
            .update_ability_score(&self.user_id, ability_id, score)
            .await?;
        self.reconcile(&user);
        Ok(())
    }

    // ==================== EQUIPMENT OPERATIONS ====================

    /// Equip an item, optimistically. A full inventory is rejected before
    /// any state change or network call.
    pub async fn add_to_equipments(&mut self, equipment: Equipment) -> Result<(), ClientError> {
        if self.equipments.iter().any(|e| e.id == equipment.id) {
            return Ok(());
        }
        if self.equipments.len() >= MAX_EQUIPMENTS {
            return Err(ClientError::InventoryFull);
        }

        let snapshot = self.equipments.clone();
        self.equipments.push(equipment.clone());

        match self.api.add_equipment(&self.user_id, &equipment.id).await {
            Ok(user) => {
                self.reconcile(&user);
                Ok(())
            }
            Err(e) => {
                self.equipments = snapshot;
                Err(e)
            }
        }
    }

    /// Unequip an item, optimistically. Returns the removed item so the
    /// caller can offer it for undo.
    pub async fn remove_from_equipments(
        &mut self,
        equipment: &Equipment,
    ) -> Result<Equipment, ClientError> {
        let snapshot = self.equipments.clone();
        self.equipments.retain(|e| e.id != equipment.id);

        match self
            .api
            .remove_equipment(&self.user_id, &equipment.id)
            .await
        {
            Ok(user) => {
                self.reconcile(&user);
                Ok(equipment.clone())
            }
            Err(e) => {
                self.equipments = snapshot;
                Err(e)
            }
        }
    }

    /// Clear the equipment list, optimistically. Returns the prior list so
    /// the caller can offer it for undo.
    pub async fn remove_all_equipments(&mut self) -> Result<Vec<Equipment>, ClientError> {
        let snapshot = self.equipments.clone();
        self.equipments.clear();

        match self.api.remove_all_equipments(&self.user_id).await {
            Ok(user) => {
                self.reconcile(&user);
                Ok(snapshot)
            }
            Err(e) => {
                self.equipments = snapshot;
                Err(e)
            }
        }
    }

    // ==================== EQUIPMENT PAGE FLOWS ====================

    /// Checkbox handler for an equipment card: equip when checked, unequip
    /// (arming undo) when unchecked.
    pub async fn handle_equipment_toggle(
        &mut self,
        equipment: Equipment,
        checked: bool,
    ) -> Result<(), ClientError> {
        if checked {
            if self.equipments.len() >= MAX_EQUIPMENTS {
                self.toasts.show(
                    "Cannot add any more items, inventory is full",
                    ToastKind::Warning,
                    TOAST_SHORT,
                );
                return Ok(());
            }

            let name = equipment.name.clone();
            self.add_to_equipments(equipment).await?;
            self.toasts.show(
                format!("{} was added to your equipments", name),
                ToastKind::Success,
                TOAST_MEDIUM,
            );
        } else {
            let removed = self.remove_from_equipments(&equipment).await?;
            let message = format!("{} removed from equipments", removed.name);
            self.undo.arm(UndoBuffer::Single(removed));
            self.toasts
                .show_with_undo(message, ToastKind::Info, TOAST_UNDO_WINDOW);
        }

        Ok(())
    }

    /// "Remove all" button handler. A no-op on an empty inventory.
    pub async fn handle_remove_all(&mut self) -> Result<(), ClientError> {
        if self.equipments.is_empty() {
            return Ok(());
        }

        match self.remove_all_equipments().await {
            Ok(snapshot) => {
                self.undo.arm(UndoBuffer::All(snapshot));
                self.toasts.show_with_undo(
                    "All equipments removed",
                    ToastKind::Info,
                    TOAST_UNDO_WINDOW,
                );
                Ok(())
            }
            Err(e) => {
                self.toasts.show(
                    "Failed to remove all equipments",
                    ToastKind::Error,
                    TOAST_MEDIUM,
                );
                Err(e)
            }
        }
    }

    /// Undo button handler. Reinserts the captured buffer with one
    /// compensating call per item; bulk restore tolerates and reports
    /// individual failures without further rollback.
    pub async fn handle_undo(&mut self) -> Result<(), ClientError> {
        match self.undo.consume() {
            Some(UndoBuffer::Single(equipment)) => {
                let name = equipment.name.clone();
                self.add_to_equipments(equipment).await?;
                self.toasts.show(
                    format!("{} restored to equipments", name),
                    ToastKind::Success,
                    TOAST_MEDIUM,
                );
                Ok(())
            }
            Some(UndoBuffer::All(items)) => {
                let mut failed = 0usize;
                for equipment in items {
                    if self.add_to_equipments(equipment).await.is_err() {
                        failed += 1;
                    }
                }

                if failed == 0 {
                    self.toasts
                        .show("All equipments restored", ToastKind::Success, TOAST_MEDIUM);
                    Ok(())
                } else {
                    self.toasts
                        .show("Error adding back equipment", ToastKind::Error, TOAST_MEDIUM);
                    Err(ClientError::Server(format!(
                        "{} equipment(s) could not be restored",
                        failed
                    )))
                }
            }
            None => Ok(()),
        }
    }

    /// The undo window closed without the button being clicked. The removal
    /// was already persisted, so this only retires the buffer.
    pub fn expire_undo(&mut self) {
        self.undo.expire();
    }

    /// Overwrite local state with the server's authoritative user and merge
    /// it into the normalized cache.
    fn reconcile(&mut self, user: &User) {
        self.race = Some(user.race.clone());
        self.class = Some(user.class.clone());
        self.ability_scores = user.ability_scores.clone();
        self.equipments = user.equipments.clone();

        if let Ok(mut cache) = self.cache.lock() {
            cache.write_user(user);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{catalog_item, test_user, MockApi};
    use crate::client::{ToastKind, UndoState};

    fn context_with(api: Arc<MockApi>, user: &User) -> CharacterContext {
        let cache = Arc::new(Mutex::new(NormalizedCache::new()));
        CharacterContext::new(api, cache, user)
    }

    #[tokio::test]
    async fn test_add_rejected_when_inventory_full() {
        let api = MockApi::new();
        let mut user = test_user("u1", "frodo");
        for i in 0..MAX_EQUIPMENTS {
            user.equipments.push(catalog_item(&format!("item-{}", i)));
        }
        api.put_user(user.clone());

        let mut context = context_with(api, &user);
        let result = context
            .add_to_equipments(catalog_item("one-too-many"))
            .await;

        assert_eq!(result, Err(ClientError::InventoryFull));
        assert_eq!(context.equipments().len(), MAX_EQUIPMENTS);
    }

    #[tokio::test]
    async fn test_full_inventory_toggle_shows_warning_toast() {
        let api = MockApi::new();
        let mut user = test_user("u1", "frodo");
        for i in 0..MAX_EQUIPMENTS {
            user.equipments.push(catalog_item(&format!("item-{}", i)));
        }
        api.put_user(user.clone());

        let mut context = context_with(api, &user);
        context
            .handle_equipment_toggle(catalog_item("one-too-many"), true)
            .await
            .unwrap();

        let toast = context.toasts().latest().unwrap();
        assert_eq!(toast.message, "Cannot add any more items, inventory is full");
        assert_eq!(toast.kind, ToastKind::Warning);
        assert_eq!(context.equipments().len(), MAX_EQUIPMENTS);
    }

    #[tokio::test]
    async fn test_add_rolls_back_on_server_failure() {
        let api = MockApi::new();
        let user = test_user("u1", "frodo");
        api.put_user(user.clone());
        api.register_equipment(catalog_item("dagger"));

        let mut context = context_with(api.clone(), &user);
        api.fail_next();

        let result = context.add_to_equipments(catalog_item("dagger")).await;
        assert!(matches!(result, Err(ClientError::Network(_))));
        // Rolled back to the recorded pre-mutation value
        assert!(context.equipments().is_empty());
    }

    #[tokio::test]
    async fn test_remove_then_undo_restores_pre_removal_state() {
        let api = MockApi::new();
        let dagger = catalog_item("dagger");
        let mut user = test_user("u1", "frodo");
        user.equipments.push(dagger.clone());
        api.put_user(user.clone());
        api.register_equipment(dagger.clone());

        let mut context = context_with(api, &user);
        let before: Vec<Equipment> = context.equipments().to_vec();

        context
            .handle_equipment_toggle(dagger.clone(), false)
            .await
            .unwrap();
        assert!(context.equipments().is_empty());
        assert!(context.undo_slot().is_armed());
        let toast = context.toasts().latest().unwrap();
        assert!(toast.offers_undo);
        assert_eq!(toast.message, "Dagger removed from equipments");

        context.handle_undo().await.unwrap();
        assert_eq!(context.equipments(), before.as_slice());
        assert_eq!(
            context.toasts().latest().unwrap().message,
            "Dagger restored to equipments"
        );
    }

    #[tokio::test]
    async fn test_remove_all_then_undo_restores_everything() {
        let api = MockApi::new();
        let mut user = test_user("u1", "frodo");
        for name in ["dagger", "mace", "shield"] {
            let item = catalog_item(name);
            api.register_equipment(item.clone());
            user.equipments.push(item);
        }
        api.put_user(user.clone());

        let mut context = context_with(api, &user);
        let before: Vec<Equipment> = context.equipments().to_vec();

        context.handle_remove_all().await.unwrap();
        assert!(context.equipments().is_empty());

        context.handle_undo().await.unwrap();
        let mut restored: Vec<String> =
            context.equipments().iter().map(|e| e.id.clone()).collect();
        let mut expected: Vec<String> = before.iter().map(|e| e.id.clone()).collect();
        restored.sort();
        expected.sort();
        assert_eq!(restored, expected);
        assert_eq!(
            context.toasts().latest().unwrap().message,
            "All equipments restored"
        );
    }

    #[tokio::test]
    async fn test_expired_undo_leaves_removal_permanent() {
        let api = MockApi::new();
        let dagger = catalog_item("dagger");
        let mut user = test_user("u1", "frodo");
        user.equipments.push(dagger.clone());
        api.put_user(user.clone());
        api.register_equipment(dagger.clone());

        let mut context = context_with(api, &user);
        context
            .handle_equipment_toggle(dagger, false)
            .await
            .unwrap();

        context.expire_undo();
        context.handle_undo().await.unwrap();

        assert!(context.equipments().is_empty());
        assert_eq!(context.undo_slot().state(), Some(UndoState::Expired));
    }

    #[tokio::test]
    async fn test_second_removal_discards_prior_undo() {
        let api = MockApi::new();
        let dagger = catalog_item("dagger");
        let mace = catalog_item("mace");
        let mut user = test_user("u1", "frodo");
        user.equipments.push(dagger.clone());
        user.equipments.push(mace.clone());
        api.put_user(user.clone());
        api.register_equipment(dagger.clone());
        api.register_equipment(mace.clone());

        let mut context = context_with(api, &user);
        context
            .handle_equipment_toggle(dagger, false)
            .await
            .unwrap();
        context
            .handle_equipment_toggle(mace.clone(), false)
            .await
            .unwrap();

        // Undo restores only the mace; the dagger's buffer was discarded
        context.handle_undo().await.unwrap();
        let names: Vec<&str> = context.equipments().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Mace"]);
    }

    #[tokio::test]
    async fn test_update_race_keeps_prior_selection_on_failure() {
        let api = MockApi::new();
        let user = test_user("u1", "frodo");
        api.put_user(user.clone());

        let mut context = context_with(api.clone(), &user);
        let prior = context.race().unwrap().name.clone();

        api.fail_next();
        let result = context.update_race("race-elf").await;

        assert!(result.is_err());
        assert_eq!(context.race().unwrap().name, prior);
    }
}
