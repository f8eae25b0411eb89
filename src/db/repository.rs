//! Database repository for CRUD operations.
//!
//! Resolvers are stateless; every operation here is an independent
//! read-modify-write against the store. User-document writers are
//! last-write-wins at the document level.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    clamp_difficulty, truncate_description, AbilityScore, AbilityScoreEntry, Class, Equipment,
    Monster, MonsterResult, MonsterTypeCount, Race, Review, Reviewer, StoredAbilityScore, User,
    UserRecord, DEFAULT_DUNGEON_NAME, MAX_EQUIPMENTS,
};

/// Stable slugs for the defaults assigned at registration.
const DEFAULT_RACE_INDEX: &str = "human";
const DEFAULT_CLASS_INDEX: &str = "barbarian";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// Get a user by ID with all references populated.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        match self.get_user_record(id).await? {
            Some(record) => Ok(Some(self.populate_user(record).await?)),
            None => Ok(None),
        }
    }

    /// Get the raw user row by ID.
    pub async fn get_user_record(&self, id: &str) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_name, race_id, class_id, ability_scores, equipment_ids, favorite_monster_ids, dungeon_name FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_record_from_row))
    }

    /// Find a user by username.
    pub async fn find_user_by_name(&self, user_name: &str) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_name, race_id, class_id, ability_scores, equipment_ids, favorite_monster_ids, dungeon_name FROM users WHERE user_name = ?",
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_record_from_row))
    }

    /// True iff the username is free.
    pub async fn check_username(&self, user_name: &str) -> Result<bool, AppError> {
        Ok(self.find_user_by_name(user_name).await?.is_none())
    }

    /// Create a new user with the default race and class. The six ability
    /// scores start at zero. Fails with a conflict when the name is taken
    /// and a setup error when the defaults are missing from the store.
    pub async fn create_user(&self, user_name: &str) -> Result<User, AppError> {
        if self.find_user_by_name(user_name).await?.is_some() {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }

        let default_race = self
            .get_race_by_index(DEFAULT_RACE_INDEX)
            .await?
            .ok_or_else(|| {
                AppError::Setup("Default race or class not found in the database".to_string())
            })?;
        let default_class = self
            .get_class_by_index(DEFAULT_CLASS_INDEX)
            .await?
            .ok_or_else(|| {
                AppError::Setup("Default race or class not found in the database".to_string())
            })?;

        let abilities = self.list_abilities(0, i64::MAX).await?;
        let ability_scores: Vec<StoredAbilityScore> = abilities
            .iter()
            .map(|a| StoredAbilityScore {
                ability_id: a.id.clone(),
                score: 0,
            })
            .collect();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let scores_json = serde_json::to_string(&ability_scores)?;

        sqlx::query(
            "INSERT INTO users (id, user_name, race_id, class_id, ability_scores, equipment_ids, favorite_monster_ids, dungeon_name, created_at) VALUES (?, ?, ?, ?, ?, '[]', '[]', ?, ?)",
        )
        .bind(&id)
        .bind(user_name)
        .bind(&default_race.id)
        .bind(&default_class.id)
        .bind(&scores_json)
        .bind(DEFAULT_DUNGEON_NAME)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_user(&id)
            .await?
            .ok_or_else(|| AppError::Internal("User vanished after insert".to_string()))
    }

    /// Change the user's race selection.
    pub async fn update_user_race(&self, user_id: &str, race_id: &str) -> Result<User, AppError> {
        let record = self.require_user_record(user_id).await?;
        self.get_race(race_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Race {} not found", race_id)))?;

        sqlx::query("UPDATE users SET race_id = ? WHERE id = ?")
            .bind(race_id)
            .bind(&record.id)
            .execute(&self.pool)
            .await?;

        self.require_user(user_id).await
    }

    /// Change the user's class selection.
    pub async fn update_user_class(&self, user_id: &str, class_id: &str) -> Result<User, AppError> {
        let record = self.require_user_record(user_id).await?;
        self.get_class(class_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Class {} not found", class_id)))?;

        sqlx::query("UPDATE users SET class_id = ? WHERE id = ?")
            .bind(class_id)
            .bind(&record.id)
            .execute(&self.pool)
            .await?;

        self.require_user(user_id).await
    }

    /// Set one ability score. The entry for the ability is replaced, never
    /// appended; the score is clamped to [0, 100].
    pub async fn update_ability_score(
        &self,
        user_id: &str,
        ability_id: &str,
        score: i32,
    ) -> Result<User, AppError> {
        let mut record = self.require_user_record(user_id).await?;
        self.get_ability(ability_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ability {} not found", ability_id)))?;

        let score = score.clamp(0, 100);
        match record
            .ability_scores
            .iter_mut()
            .find(|entry| entry.ability_id == ability_id)
        {
            Some(entry) => entry.score = score,
            None => record.ability_scores.push(StoredAbilityScore {
                ability_id: ability_id.to_string(),
                score,
            }),
        }

        let scores_json = serde_json::to_string(&record.ability_scores)?;
        sqlx::query("UPDATE users SET ability_scores = ? WHERE id = ?")
            .bind(&scores_json)
            .bind(&record.id)
            .execute(&self.pool)
            .await?;

        self.require_user(user_id).await
    }

    /// Add an equipment reference to the user. Idempotent for items already
    /// equipped; rejects an 11th item.
    pub async fn add_equipment(&self, user_id: &str, equipment_id: &str) -> Result<User, AppError> {
        let mut record = self.require_user_record(user_id).await?;
        self.get_equipment(equipment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", equipment_id)))?;

        if !record.equipment_ids.iter().any(|id| id == equipment_id) {
            if record.equipment_ids.len() >= MAX_EQUIPMENTS {
                return Err(AppError::Validation("Inventory is full".to_string()));
            }
            record.equipment_ids.push(equipment_id.to_string());
            self.save_equipment_ids(&record).await?;
        }

        self.require_user(user_id).await
    }

    /// Remove an equipment reference from the user.
    pub async fn remove_equipment(
        &self,
        user_id: &str,
        equipment_id: &str,
    ) -> Result<User, AppError> {
        let mut record = self.require_user_record(user_id).await?;
        record.equipment_ids.retain(|id| id != equipment_id);
        self.save_equipment_ids(&record).await?;

        self.require_user(user_id).await
    }

    /// Clear the user's equipment list.
    pub async fn remove_all_equipments(&self, user_id: &str) -> Result<User, AppError> {
        let mut record = self.require_user_record(user_id).await?;
        record.equipment_ids.clear();
        self.save_equipment_ids(&record).await?;

        self.require_user(user_id).await
    }

    /// Add a monster to the user's favorites. Idempotent.
    pub async fn add_favorite_monster(
        &self,
        user_id: &str,
        monster_id: &str,
    ) -> Result<User, AppError> {
        let mut record = self.require_user_record(user_id).await?;
        self.get_monster(monster_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Monster {} not found", monster_id)))?;

        if !record.favorite_monster_ids.iter().any(|id| id == monster_id) {
            record.favorite_monster_ids.push(monster_id.to_string());
            self.save_favorite_ids(&record).await?;
        }

        self.require_user(user_id).await
    }

    /// Remove a monster from the user's favorites.
    pub async fn remove_favorite_monster(
        &self,
        user_id: &str,
        monster_id: &str,
    ) -> Result<User, AppError> {
        let mut record = self.require_user_record(user_id).await?;
        record.favorite_monster_ids.retain(|id| id != monster_id);
        self.save_favorite_ids(&record).await?;

        self.require_user(user_id).await
    }

    /// Rename the user's dungeon.
    pub async fn update_dungeon_name(
        &self,
        user_id: &str,
        dungeon_name: &str,
    ) -> Result<User, AppError> {
        let record = self.require_user_record(user_id).await?;
        if dungeon_name.trim().is_empty() {
            return Err(AppError::Validation(
                "Dungeon name cannot be empty".to_string(),
            ));
        }

        sqlx::query("UPDATE users SET dungeon_name = ? WHERE id = ?")
            .bind(dungeon_name)
            .bind(&record.id)
            .execute(&self.pool)
            .await?;

        self.require_user(user_id).await
    }

    async fn require_user_record(&self, user_id: &str) -> Result<UserRecord, AppError> {
        self.get_user_record(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn require_user(&self, user_id: &str) -> Result<User, AppError> {
        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn save_equipment_ids(&self, record: &UserRecord) -> Result<(), AppError> {
        let json = serde_json::to_string(&record.equipment_ids)?;
        sqlx::query("UPDATE users SET equipment_ids = ? WHERE id = ?")
            .bind(&json)
            .bind(&record.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_favorite_ids(&self, record: &UserRecord) -> Result<(), AppError> {
        let json = serde_json::to_string(&record.favorite_monster_ids)?;
        sqlx::query("UPDATE users SET favorite_monster_ids = ? WHERE id = ?")
            .bind(&json)
            .bind(&record.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Resolve a raw user row into a fully populated user. A dangling race
    /// or class reference is data corruption, not a caller error.
    async fn populate_user(&self, record: UserRecord) -> Result<User, AppError> {
        let race = self.get_race(&record.race_id).await?.ok_or_else(|| {
            AppError::Internal(format!("User {} references missing race", record.id))
        })?;
        let class = self.get_class(&record.class_id).await?.ok_or_else(|| {
            AppError::Internal(format!("User {} references missing class", record.id))
        })?;

        let mut ability_scores = Vec::with_capacity(record.ability_scores.len());
        for stored in &record.ability_scores {
            if let Some(ability) = self.get_ability(&stored.ability_id).await? {
                ability_scores.push(AbilityScoreEntry {
                    ability,
                    score: stored.score,
                });
            }
        }

        let mut equipments = Vec::with_capacity(record.equipment_ids.len());
        for id in &record.equipment_ids {
            if let Some(equipment) = self.get_equipment(id).await? {
                equipments.push(equipment);
            }
        }

        let mut favorited_monsters = Vec::with_capacity(record.favorite_monster_ids.len());
        for id in &record.favorite_monster_ids {
            if let Some(monster) = self.get_monster(id).await? {
                favorited_monsters.push(monster);
            }
        }

        Ok(User {
            id: record.id,
            user_name: record.user_name,
            race,
            class,
            ability_scores,
            equipments,
            favorited_monsters,
            dungeon_name: record.dungeon_name,
        })
    }

    // ==================== CATALOG OPERATIONS ====================

    /// List races with pagination.
    pub async fn list_races(&self, offset: i64, limit: i64) -> Result<Vec<Race>, AppError> {
        let rows = sqlx::query(
            "SELECT id, idx, name, speed, alignment, size, size_description FROM races ORDER BY name LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(race_from_row).collect())
    }

    /// Count all races.
    pub async fn count_races(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM races")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Get a race by ID.
    pub async fn get_race(&self, id: &str) -> Result<Option<Race>, AppError> {
        let row = sqlx::query(
            "SELECT id, idx, name, speed, alignment, size, size_description FROM races WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(race_from_row))
    }

    /// Get a race by its stable slug.
    pub async fn get_race_by_index(&self, index: &str) -> Result<Option<Race>, AppError> {
        let row = sqlx::query(
            "SELECT id, idx, name, speed, alignment, size, size_description FROM races WHERE idx = ?",
        )
        .bind(index)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(race_from_row))
    }

    /// List classes with pagination.
    pub async fn list_classes(&self, offset: i64, limit: i64) -> Result<Vec<Class>, AppError> {
        let rows = sqlx::query(
            "SELECT id, idx, name, hit_die, skills FROM classes ORDER BY name LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(class_from_row).collect())
    }

    /// Count all classes.
    pub async fn count_classes(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM classes")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Get a class by ID.
    pub async fn get_class(&self, id: &str) -> Result<Option<Class>, AppError> {
        let row = sqlx::query("SELECT id, idx, name, hit_die, skills FROM classes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(class_from_row))
    }

    /// Get a class by its stable slug.
    pub async fn get_class_by_index(&self, index: &str) -> Result<Option<Class>, AppError> {
        let row = sqlx::query("SELECT id, idx, name, hit_die, skills FROM classes WHERE idx = ?")
            .bind(index)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(class_from_row))
    }

    /// List abilities with pagination.
    pub async fn list_abilities(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AbilityScore>, AppError> {
        let rows =
            sqlx::query("SELECT id, idx, full_name FROM abilities ORDER BY idx LIMIT ? OFFSET ?")
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.iter().map(ability_from_row).collect())
    }

    /// Count all abilities.
    pub async fn count_abilities(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM abilities")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Get an ability by ID.
    pub async fn get_ability(&self, id: &str) -> Result<Option<AbilityScore>, AppError> {
        let row = sqlx::query("SELECT id, idx, full_name FROM abilities WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(ability_from_row))
    }

    // ==================== EQUIPMENT OPERATIONS ====================

    /// List equipment with pagination.
    pub async fn list_equipments(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Equipment>, AppError> {
        let rows = sqlx::query(
            "SELECT id, idx, name, value FROM equipments ORDER BY name LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(equipment_from_row).collect())
    }

    /// Count all equipment.
    pub async fn count_equipments(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM equipments")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Get an equipment item by ID.
    pub async fn get_equipment(&self, id: &str) -> Result<Option<Equipment>, AppError> {
        let row = sqlx::query("SELECT id, idx, name, value FROM equipments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(equipment_from_row))
    }

    /// Fetch equipment items by ID, preserving the given order. Unknown ids
    /// are skipped.
    pub async fn get_equipments_by_ids(&self, ids: &[String]) -> Result<Vec<Equipment>, AppError> {
        let mut equipments = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(equipment) = self.get_equipment(id).await? {
                equipments.push(equipment);
            }
        }
        Ok(equipments)
    }

    /// All equipment, for index rebuilds.
    pub async fn all_equipments(&self) -> Result<Vec<Equipment>, AppError> {
        let rows = sqlx::query("SELECT id, idx, name, value FROM equipments ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(equipment_from_row).collect())
    }

    // ==================== MONSTER OPERATIONS ====================

    /// Get a monster by ID, without reviews.
    pub async fn get_monster(&self, id: &str) -> Result<Option<Monster>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, size, type, alignment, hit_points, image FROM monsters WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(monster_from_row))
    }

    /// Get a monster by ID with its reviews attached.
    pub async fn get_monster_with_reviews(&self, id: &str) -> Result<Option<Monster>, AppError> {
        match self.get_monster(id).await? {
            Some(mut monster) => {
                monster.reviews = self.list_reviews(id).await?;
                Ok(Some(monster))
            }
            None => Ok(None),
        }
    }

    /// Filtered, sorted, paginated monster listing. The HP bounds in the
    /// result are computed over the search/type-filtered set without the HP
    /// constraint so range controls keep stable endpoints.
    pub async fn list_monsters(
        &self,
        search_term: Option<&str>,
        offset: i64,
        limit: i64,
        types: &[String],
        min_hp: Option<i32>,
        max_hp: Option<i32>,
        sort_option: &str,
    ) -> Result<MonsterResult, AppError> {
        let pattern = search_term
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let mut where_clauses = vec!["1=1".to_string()];
        if pattern.is_some() {
            where_clauses.push("m.name LIKE ?".to_string());
        }
        if !types.is_empty() {
            let placeholders = vec!["?"; types.len()].join(", ");
            where_clauses.push(format!("m.type IN ({})", placeholders));
        }
        let base_where = where_clauses.join(" AND ");

        let mut hp_clauses = Vec::new();
        if min_hp.is_some() {
            hp_clauses.push("m.hit_points >= ?");
        }
        if max_hp.is_some() {
            hp_clauses.push("m.hit_points <= ?");
        }
        let full_where = if hp_clauses.is_empty() {
            base_where.clone()
        } else {
            format!("{} AND {}", base_where, hp_clauses.join(" AND "))
        };

        let order_by = monster_order_clause(sort_option);

        let list_sql = format!(
            "SELECT m.id, m.name, m.size, m.type, m.alignment, m.hit_points, m.image \
             FROM monsters m LEFT JOIN reviews r ON r.monster_id = m.id \
             WHERE {} GROUP BY m.id ORDER BY {} LIMIT ? OFFSET ?",
            full_where, order_by
        );

        let mut query = sqlx::query(&list_sql);
        if let Some(p) = &pattern {
            query = query.bind(p);
        }
        for t in types {
            query = query.bind(t);
        }
        if let Some(min) = min_hp {
            query = query.bind(min);
        }
        if let Some(max) = max_hp {
            query = query.bind(max);
        }
        query = query.bind(limit).bind(offset);

        let rows = query.fetch_all(&self.pool).await?;
        let monsters: Vec<Monster> = rows.iter().map(monster_from_row).collect();

        // Total respects the HP filter; bounds intentionally do not.
        let count_sql = format!("SELECT COUNT(*) AS n FROM monsters m WHERE {}", full_where);
        let mut count_query = sqlx::query(&count_sql);
        if let Some(p) = &pattern {
            count_query = count_query.bind(p);
        }
        for t in types {
            count_query = count_query.bind(t);
        }
        if let Some(min) = min_hp {
            count_query = count_query.bind(min);
        }
        if let Some(max) = max_hp {
            count_query = count_query.bind(max);
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?.get("n");

        let bounds_sql = format!(
            "SELECT COALESCE(MIN(m.hit_points), 1) AS min_hp, COALESCE(MAX(m.hit_points), 1000) AS max_hp FROM monsters m WHERE {}",
            base_where
        );
        let mut bounds_query = sqlx::query(&bounds_sql);
        if let Some(p) = &pattern {
            bounds_query = bounds_query.bind(p);
        }
        for t in types {
            bounds_query = bounds_query.bind(t);
        }
        let bounds = bounds_query.fetch_one(&self.pool).await?;

        Ok(MonsterResult {
            monsters,
            total_monsters: total as i32,
            min_hp: bounds.get("min_hp"),
            max_hp: bounds.get("max_hp"),
        })
    }

    /// Number of monsters per type, within an optional HP range.
    pub async fn monster_type_counts(
        &self,
        min_hp: Option<i32>,
        max_hp: Option<i32>,
    ) -> Result<Vec<MonsterTypeCount>, AppError> {
        let mut clauses = vec!["1=1"];
        if min_hp.is_some() {
            clauses.push("hit_points >= ?");
        }
        if max_hp.is_some() {
            clauses.push("hit_points <= ?");
        }
        let sql = format!(
            "SELECT type, COUNT(*) AS n FROM monsters WHERE {} GROUP BY type ORDER BY type",
            clauses.join(" AND ")
        );

        let mut query = sqlx::query(&sql);
        if let Some(min) = min_hp {
            query = query.bind(min);
        }
        if let Some(max) = max_hp {
            query = query.bind(max);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(|row| MonsterTypeCount {
                type_: row.get("type"),
                count: row.get::<i64, _>("n") as i32,
            })
            .collect())
    }

    // ==================== REVIEW OPERATIONS ====================

    /// List all reviews for a monster, newest first.
    pub async fn list_reviews(&self, monster_id: &str) -> Result<Vec<Review>, AppError> {
        let rows = sqlx::query(
            "SELECT r.id, r.user_id, u.user_name, r.difficulty, r.description, r.created_at \
             FROM reviews r JOIN users u ON u.id = r.user_id \
             WHERE r.monster_id = ? ORDER BY r.created_at DESC",
        )
        .bind(monster_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(review_from_row).collect())
    }

    /// Get the review a user wrote for a monster, if any.
    pub async fn get_user_review(
        &self,
        monster_id: &str,
        user_id: &str,
    ) -> Result<Option<Review>, AppError> {
        let row = sqlx::query(
            "SELECT r.id, r.user_id, u.user_name, r.difficulty, r.description, r.created_at \
             FROM reviews r JOIN users u ON u.id = r.user_id \
             WHERE r.monster_id = ? AND r.user_id = ?",
        )
        .bind(monster_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(review_from_row))
    }

    /// Create or replace the user's review of a monster. The uniqueness
    /// constraint on (user, monster) makes this an upsert: a second create
    /// replaces the first rather than appending a duplicate.
    pub async fn upsert_review(
        &self,
        monster_id: &str,
        user_id: &str,
        difficulty: i32,
        description: &str,
    ) -> Result<Review, AppError> {
        self.get_monster(monster_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Monster {} not found", monster_id)))?;

        let difficulty = clamp_difficulty(difficulty);
        let description = truncate_description(description);
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO reviews (id, monster_id, user_id, difficulty, description, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(user_id, monster_id) DO UPDATE SET \
             difficulty = excluded.difficulty, description = excluded.description, created_at = excluded.created_at",
        )
        .bind(&id)
        .bind(monster_id)
        .bind(user_id)
        .bind(difficulty)
        .bind(&description)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_user_review(monster_id, user_id)
            .await?
            .ok_or_else(|| AppError::Internal("Review vanished after upsert".to_string()))
    }

    /// Update an existing review by ID. Only the authoring user may update.
    pub async fn update_review(
        &self,
        review_id: &str,
        user_id: &str,
        difficulty: i32,
        description: &str,
    ) -> Result<Review, AppError> {
        let difficulty = clamp_difficulty(difficulty);
        let description = truncate_description(description);

        let result = sqlx::query(
            "UPDATE reviews SET difficulty = ?, description = ? WHERE id = ? AND user_id = ?",
        )
        .bind(difficulty)
        .bind(&description)
        .bind(review_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Review {} not found",
                review_id
            )));
        }

        let row = sqlx::query(
            "SELECT r.id, r.user_id, u.user_name, r.difficulty, r.description, r.created_at \
             FROM reviews r JOIN users u ON u.id = r.user_id WHERE r.id = ?",
        )
        .bind(review_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(review_from_row(&row))
    }

    /// Delete a review by ID. Only the authoring user may delete.
    pub async fn delete_review(&self, review_id: &str, user_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ? AND user_id = ?")
            .bind(review_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Review {} not found",
                review_id
            )));
        }

        Ok(())
    }
}

/// Map a sort option to an ORDER BY clause. Unknown options fall back to
/// name ascending.
fn monster_order_clause(sort_option: &str) -> &'static str {
    match sort_option {
        "name-desc" => "m.name COLLATE NOCASE DESC",
        "hp-asc" => "m.hit_points ASC, m.name COLLATE NOCASE ASC",
        "hp-desc" => "m.hit_points DESC, m.name COLLATE NOCASE ASC",
        "difficulty-asc" => "AVG(r.difficulty) ASC NULLS LAST, m.name COLLATE NOCASE ASC",
        "difficulty-desc" => "AVG(r.difficulty) DESC NULLS LAST, m.name COLLATE NOCASE ASC",
        _ => "m.name COLLATE NOCASE ASC",
    }
}

// Helper functions for row conversion

fn user_record_from_row(row: &sqlx::sqlite::SqliteRow) -> UserRecord {
    let scores_str: String = row.get("ability_scores");
    let equipment_str: String = row.get("equipment_ids");
    let favorites_str: String = row.get("favorite_monster_ids");

    UserRecord {
        id: row.get("id"),
        user_name: row.get("user_name"),
        race_id: row.get("race_id"),
        class_id: row.get("class_id"),
        ability_scores: serde_json::from_str(&scores_str).unwrap_or_default(),
        equipment_ids: parse_json_array(&equipment_str),
        favorite_monster_ids: parse_json_array(&favorites_str),
        dungeon_name: row.get("dungeon_name"),
    }
}

fn race_from_row(row: &sqlx::sqlite::SqliteRow) -> Race {
    Race {
        id: row.get("id"),
        index: row.get("idx"),
        name: row.get("name"),
        speed: row.get("speed"),
        alignment: row.get("alignment"),
        size: row.get("size"),
        size_description: row.get("size_description"),
    }
}

fn class_from_row(row: &sqlx::sqlite::SqliteRow) -> Class {
    let skills_str: String = row.get("skills");
    Class {
        id: row.get("id"),
        index: row.get("idx"),
        name: row.get("name"),
        hit_die: row.get("hit_die"),
        skills: parse_json_array(&skills_str),
    }
}

fn ability_from_row(row: &sqlx::sqlite::SqliteRow) -> AbilityScore {
    AbilityScore {
        id: row.get("id"),
        index: row.get("idx"),
        full_name: row.get("full_name"),
    }
}

fn equipment_from_row(row: &sqlx::sqlite::SqliteRow) -> Equipment {
    Equipment {
        id: row.get("id"),
        index: row.get("idx"),
        name: row.get("name"),
        value: row.get("value"),
    }
}

fn monster_from_row(row: &sqlx::sqlite::SqliteRow) -> Monster {
    Monster {
        id: row.get("id"),
        name: row.get("name"),
        size: row.get("size"),
        type_: row.get("type"),
        alignment: row.get("alignment"),
        hit_points: row.get("hit_points"),
        image: row.get("image"),
        reviews: Vec::new(),
    }
}

fn review_from_row(row: &sqlx::sqlite::SqliteRow) -> Review {
    Review {
        id: row.get("id"),
        user: Reviewer {
            id: row.get("user_id"),
            user_name: row.get("user_name"),
        },
        difficulty: row.get("difficulty"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}
