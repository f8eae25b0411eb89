//! Transport seam between the client layer and the server.
//!
//! The state layer never speaks HTTP directly; it calls this trait. The
//! integration suite implements it over reqwest against the live GraphQL
//! endpoint, unit tests over an in-memory fake with failure injection.

use async_trait::async_trait;

use super::ClientError;
use crate::models::{Review, ReviewInput, User};

/// Server operations the client state layer depends on. Mutations return
/// the freshly persisted user so local state can reconcile against the
/// server's authoritative value.
#[async_trait]
pub trait CharacterApi: Send + Sync {
    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, ClientError>;

    async fn update_race(&self, user_id: &str, race_id: &str) -> Result<User, ClientError>;

    async fn update_class(&self, user_id: &str, class_id: &str) -> Result<User, ClientError>;

    async fn update_ability_score(
        &self,
        user_id: &str,
        ability_id: &str,
        score: i32,
    ) -> Result<User, ClientError>;

    async fn add_equipment(&self, user_id: &str, equipment_id: &str) -> Result<User, ClientError>;

    async fn remove_equipment(
        &self,
        user_id: &str,
        equipment_id: &str,
    ) -> Result<User, ClientError>;

    async fn remove_all_equipments(&self, user_id: &str) -> Result<User, ClientError>;

    async fn add_favorite_monster(
        &self,
        user_id: &str,
        monster_id: &str,
    ) -> Result<User, ClientError>;

    async fn remove_favorite_monster(
        &self,
        user_id: &str,
        monster_id: &str,
    ) -> Result<User, ClientError>;

    /// The caller's existing review of a monster, if any.
    async fn fetch_user_review(
        &self,
        monster_id: &str,
        user_id: &str,
    ) -> Result<Option<Review>, ClientError>;

    async fn add_review(
        &self,
        monster_id: &str,
        review: ReviewInput,
    ) -> Result<Review, ClientError>;

    async fn update_review(
        &self,
        review_id: &str,
        review: ReviewInput,
    ) -> Result<Review, ClientError>;
}
