//! GraphQL mutation resolvers.
//!
//! Every user-mutating operation requires a bearer token whose subject
//! matches the target user. Registration, login and the username check are
//! open.

use async_graphql::{Context, Object, Result, ID};

use super::{authorize, require_auth};
use crate::errors::AppError;
use crate::models::{AuthPayload, Review, ReviewInput, User};
use crate::AppState;

/// Root mutation resolver.
pub struct Mutation;

#[Object]
impl Mutation {
    /// Register a new user with the default race and class, returning the
    /// user plus a signed bearer token.
    async fn create_user(&self, ctx: &Context<'_>, user_name: String) -> Result<AuthPayload> {
        let state = ctx.data::<AppState>()?;

        let user_name = user_name.trim().to_string();
        if user_name.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()).into());
        }

        let user = state.repo.create_user(&user_name).await?;
        let token = state.tokens.sign(&user.id, &user.user_name)?;

        Ok(AuthPayload { user, token })
    }

    /// Log an existing user in, returning the user plus a fresh token.
    async fn login_user(&self, ctx: &Context<'_>, user_name: String) -> Result<AuthPayload> {
        let state = ctx.data::<AppState>()?;

        let record = state
            .repo
            .find_user_by_name(user_name.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let user = state
            .repo
            .get_user(&record.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let token = state.tokens.sign(&user.id, &user.user_name)?;

        Ok(AuthPayload { user, token })
    }

    /// Change the user's race selection.
    async fn update_user_race(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        race_id: ID,
    ) -> Result<User> {
        let state = ctx.data::<AppState>()?;
        authorize(ctx, &user_id)?;
        Ok(state.repo.update_user_race(&user_id, &race_id).await?)
    }

    /// Change the user's class selection.
    async fn update_user_class(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        class_id: ID,
    ) -> Result<User> {
        let state = ctx.data::<AppState>()?;
        authorize(ctx, &user_id)?;
        Ok(state.repo.update_user_class(&user_id, &class_id).await?)
    }

    /// Set one of the user's ability scores.
    async fn update_ability_score(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        ability_id: ID,
        score: i32,
    ) -> Result<User> {
        let state = ctx.data::<AppState>()?;
        authorize(ctx, &user_id)?;
        Ok(state
            .repo
            .update_ability_score(&user_id, &ability_id, score)
            .await?)
    }

    /// Equip an item. Rejects an 11th item with a validation error.
    async fn add_equipment(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        equipment_id: ID,
    ) -> Result<User> {
        let state = ctx.data::<AppState>()?;
        authorize(ctx, &user_id)?;
        Ok(state.repo.add_equipment(&user_id, &equipment_id).await?)
    }

    /// Unequip an item.
    async fn remove_equipment(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        equipment_id: ID,
    ) -> Result<User> {
        let state = ctx.data::<AppState>()?;
        authorize(ctx, &user_id)?;
        Ok(state.repo.remove_equipment(&user_id, &equipment_id).await?)
    }

    /// Clear the user's equipment list.
    async fn remove_all_equipments(&self, ctx: &Context<'_>, user_id: ID) -> Result<User> {
        let state = ctx.data::<AppState>()?;
        authorize(ctx, &user_id)?;
        Ok(state.repo.remove_all_equipments(&user_id).await?)
    }

    /// Add a monster to the user's favorites. Idempotent.
    async fn add_favorite_monster(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        monster_id: ID,
    ) -> Result<User> {
        let state = ctx.data::<AppState>()?;
        authorize(ctx, &user_id)?;
        Ok(state
            .repo
            .add_favorite_monster(&user_id, &monster_id)
            .await?)
    }

    /// Remove a monster from the user's favorites.
    async fn remove_favorite_monster(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        monster_id: ID,
    ) -> Result<User> {
        let state = ctx.data::<AppState>()?;
        authorize(ctx, &user_id)?;
        Ok(state
            .repo
            .remove_favorite_monster(&user_id, &monster_id)
            .await?)
    }

    /// Rename the user's dungeon.
    async fn update_dungeon_name(
        &self,
        ctx: &Context<'_>,
        user_id: ID,
        dungeon_name: String,
    ) -> Result<User> {
        let state = ctx.data::<AppState>()?;
        authorize(ctx, &user_id)?;
        Ok(state
            .repo
            .update_dungeon_name(&user_id, &dungeon_name)
            .await?)
    }

    /// Create the caller's review of a monster. A second create for the
    /// same (user, monster) pair replaces the first.
    async fn add_review(
        &self,
        ctx: &Context<'_>,
        monster_id: ID,
        review: ReviewInput,
    ) -> Result<Review> {
        let state = ctx.data::<AppState>()?;
        let identity = require_auth(ctx)?;

        Ok(state
            .repo
            .upsert_review(
                &monster_id,
                &identity.user_id,
                review.difficulty,
                &review.description,
            )
            .await?)
    }

    /// Update an existing review by ID. Only the authoring user may update.
    async fn update_review(
        &self,
        ctx: &Context<'_>,
        review_id: ID,
        review: ReviewInput,
    ) -> Result<Review> {
        let state = ctx.data::<AppState>()?;
        let identity = require_auth(ctx)?;

        Ok(state
            .repo
            .update_review(
                &review_id,
                &identity.user_id,
                review.difficulty,
                &review.description,
            )
            .await?)
    }

    /// Delete the caller's review.
    async fn delete_review(&self, ctx: &Context<'_>, review_id: ID) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let identity = require_auth(ctx)?;

        state
            .repo
            .delete_review(&review_id, &identity.user_id)
            .await?;
        Ok(true)
    }
}
