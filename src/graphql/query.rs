//! GraphQL query resolvers.

use async_graphql::{Context, Object, Result, ID};

use crate::models::{
    AbilityResult, Class, ClassResult, Equipment, EquipmentResult, Monster, MonsterResult,
    MonsterTypeCount, Race, RaceResult, User,
};
use crate::AppState;

/// Cap on how many search hits are considered when paginating a search.
const MAX_SEARCH_HITS: usize = 1000;

fn default_limit(limit: Option<i32>) -> i64 {
    limit.unwrap_or(20).max(0) as i64
}

fn default_offset(offset: Option<i32>) -> i64 {
    offset.unwrap_or(0).max(0) as i64
}

/// Root query resolver.
pub struct Query;

#[Object]
impl Query {
    /// Get a user by ID with race, class, ability scores, equipments and
    /// favorited monsters populated.
    async fn user(&self, ctx: &Context<'_>, id: ID) -> Result<Option<User>> {
        let state = ctx.data::<AppState>()?;
        Ok(state.repo.get_user(&id).await?)
    }

    /// True iff the username is not taken yet.
    async fn check_username(&self, ctx: &Context<'_>, user_name: String) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        Ok(state.repo.check_username(&user_name).await?)
    }

    /// List races with pagination.
    async fn races(
        &self,
        ctx: &Context<'_>,
        offset: Option<i32>,
        limit: Option<i32>,
    ) -> Result<RaceResult> {
        let state = ctx.data::<AppState>()?;
        let races = state
            .repo
            .list_races(default_offset(offset), default_limit(limit))
            .await?;
        let total = state.repo.count_races().await?;

        Ok(RaceResult {
            races,
            total_races: total as i32,
        })
    }

    /// Get a single race by ID.
    async fn race(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Race>> {
        let state = ctx.data::<AppState>()?;
        Ok(state.repo.get_race(&id).await?)
    }

    /// List classes with pagination.
    async fn classes(
        &self,
        ctx: &Context<'_>,
        offset: Option<i32>,
        limit: Option<i32>,
    ) -> Result<ClassResult> {
        let state = ctx.data::<AppState>()?;
        let classes = state
            .repo
            .list_classes(default_offset(offset), default_limit(limit))
            .await?;
        let total = state.repo.count_classes().await?;

        Ok(ClassResult {
            classes,
            total_classes: total as i32,
        })
    }

    /// Get a single class by ID.
    #[graphql(name = "class")]
    async fn class_by_id(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Class>> {
        let state = ctx.data::<AppState>()?;
        Ok(state.repo.get_class(&id).await?)
    }

    /// List the six ability scores.
    async fn abilities(
        &self,
        ctx: &Context<'_>,
        offset: Option<i32>,
        limit: Option<i32>,
    ) -> Result<AbilityResult> {
        let state = ctx.data::<AppState>()?;
        let abilities = state
            .repo
            .list_abilities(default_offset(offset), default_limit(limit))
            .await?;
        let total = state.repo.count_abilities().await?;

        Ok(AbilityResult {
            abilities,
            total_abilities: total as i32,
        })
    }

    /// Filtered, sorted, paginated monster listing.
    #[allow(clippy::too_many_arguments)]
    async fn monsters(
        &self,
        ctx: &Context<'_>,
        search_term: Option<String>,
        offset: Option<i32>,
        limit: Option<i32>,
        types: Option<Vec<String>>,
        min_hp: Option<i32>,
        max_hp: Option<i32>,
        sort_option: Option<String>,
    ) -> Result<MonsterResult> {
        let state = ctx.data::<AppState>()?;
        let result = state
            .repo
            .list_monsters(
                search_term.as_deref(),
                default_offset(offset),
                default_limit(limit),
                &types.unwrap_or_default(),
                min_hp,
                max_hp,
                sort_option.as_deref().unwrap_or("name-asc"),
            )
            .await?;

        Ok(result)
    }

    /// Get a single monster by ID, with its reviews.
    async fn monster(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Monster>> {
        let state = ctx.data::<AppState>()?;
        Ok(state.repo.get_monster_with_reviews(&id).await?)
    }

    /// Number of monsters per type within an optional HP range.
    async fn monster_type_counts(
        &self,
        ctx: &Context<'_>,
        min_hp: Option<i32>,
        max_hp: Option<i32>,
    ) -> Result<Vec<MonsterTypeCount>> {
        let state = ctx.data::<AppState>()?;
        Ok(state.repo.monster_type_counts(min_hp, max_hp).await?)
    }

    /// Equipment listing: full-text search when a term is given, plain
    /// catalog paging otherwise.
    async fn equipments(
        &self,
        ctx: &Context<'_>,
        search_term: Option<String>,
        offset: Option<i32>,
        limit: Option<i32>,
    ) -> Result<EquipmentResult> {
        let state = ctx.data::<AppState>()?;
        let offset = default_offset(offset) as usize;
        let limit = default_limit(limit) as usize;

        match search_term.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let hits = state.search.search(term, MAX_SEARCH_HITS, 0)?;
                let total = hits.len();
                let ids: Vec<String> = hits
                    .into_iter()
                    .skip(offset)
                    .take(limit)
                    .map(|hit| hit.equipment_id)
                    .collect();
                let equipments = state.repo.get_equipments_by_ids(&ids).await?;

                Ok(EquipmentResult {
                    equipments,
                    total_equipments: total as i32,
                })
            }
            _ => {
                let equipments = state
                    .repo
                    .list_equipments(offset as i64, limit as i64)
                    .await?;
                let total = state.repo.count_equipments().await?;

                Ok(EquipmentResult {
                    equipments,
                    total_equipments: total as i32,
                })
            }
        }
    }

    /// Prefix suggestions for the equipment search bar.
    async fn equipment_suggestions(
        &self,
        ctx: &Context<'_>,
        search_term: String,
    ) -> Result<Vec<Equipment>> {
        let state = ctx.data::<AppState>()?;
        let hits = state.search.suggest(&search_term, 5)?;
        let ids: Vec<String> = hits.into_iter().map(|hit| hit.equipment_id).collect();
        Ok(state.repo.get_equipments_by_ids(&ids).await?)
    }
}
