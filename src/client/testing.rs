//! In-memory fake of [`CharacterApi`] with failure injection, shared by the
//! client-layer unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::api::CharacterApi;
use super::ClientError;
use crate::models::{
    clamp_difficulty, truncate_description, AbilityScore, AbilityScoreEntry, Class, Equipment,
    Monster, Race, Review, ReviewInput, Reviewer, User, DEFAULT_DUNGEON_NAME, MAX_EQUIPMENTS,
};

/// Fake server: a user table, an equipment catalog and per-monster reviews.
/// `fail_next` makes the next call fail with a network error.
pub(crate) struct MockApi {
    users: Mutex<HashMap<String, User>>,
    equipments: Mutex<HashMap<String, Equipment>>,
    reviews: Mutex<HashMap<String, Vec<Review>>>,
    current_user: Mutex<Reviewer>,
    fail_next: AtomicBool,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            users: Mutex::new(HashMap::new()),
            equipments: Mutex::new(HashMap::new()),
            reviews: Mutex::new(HashMap::new()),
            current_user: Mutex::new(Reviewer {
                id: "u1".to_string(),
                user_name: "frodo".to_string(),
            }),
            fail_next: AtomicBool::new(false),
        })
    }

    pub fn put_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.id.clone(), user);
    }

    pub fn register_equipment(&self, equipment: Equipment) {
        self.equipments
            .lock()
            .unwrap()
            .insert(equipment.id.clone(), equipment);
    }

    pub fn set_current_user(&self, id: &str, user_name: &str) {
        *self.current_user.lock().unwrap() = Reviewer {
            id: id.to_string(),
            user_name: user_name.to_string(),
        };
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn review_count(&self, monster_id: &str) -> usize {
        self.reviews
            .lock()
            .unwrap()
            .get(monster_id)
            .map(|r| r.len())
            .unwrap_or(0)
    }

    fn check_failure(&self) -> Result<(), ClientError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            Err(ClientError::Network("connection reset".to_string()))
        } else {
            Ok(())
        }
    }

    fn with_user<F>(&self, user_id: &str, mutate: F) -> Result<User, ClientError>
    where
        F: FnOnce(&mut User) -> Result<(), ClientError>,
    {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| ClientError::Server("User not found".to_string()))?;
        mutate(user)?;
        Ok(user.clone())
    }
}

#[async_trait]
impl CharacterApi for MockApi {
    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, ClientError> {
        self.check_failure()?;
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }

    async fn update_race(&self, user_id: &str, race_id: &str) -> Result<User, ClientError> {
        self.check_failure()?;
        self.with_user(user_id, |user| {
            user.race = test_race(race_id);
            Ok(())
        })
    }

    async fn update_class(&self, user_id: &str, class_id: &str) -> Result<User, ClientError> {
        self.check_failure()?;
        self.with_user(user_id, |user| {
            user.class = test_class(class_id);
            Ok(())
        })
    }

    async fn update_ability_score(
        &self,
        user_id: &str,
        ability_id: &str,
        score: i32,
    ) -> Result<User, ClientError> {
        self.check_failure()?;
        self.with_user(user_id, |user| {
            let score = score.clamp(0, 100);
            match user
                .ability_scores
                .iter_mut()
                .find(|entry| entry.ability.id == ability_id)
            {
                Some(entry) => entry.score = score,
                None => user.ability_scores.push(AbilityScoreEntry {
                    ability: AbilityScore {
                        id: ability_id.to_string(),
                        index: ability_id.to_string(),
                        full_name: ability_id.to_string(),
                    },
                    score,
                }),
            }
            Ok(())
        })
    }

    async fn add_equipment(&self, user_id: &str, equipment_id: &str) -> Result<User, ClientError> {
        self.check_failure()?;
        let equipment = self
            .equipments
            .lock()
            .unwrap()
            .get(equipment_id)
            .cloned()
            .ok_or_else(|| ClientError::Server("Equipment not found".to_string()))?;

        self.with_user(user_id, |user| {
            if !user.equipments.iter().any(|e| e.id == equipment_id) {
                if user.equipments.len() >= MAX_EQUIPMENTS {
                    return Err(ClientError::Server("Inventory is full".to_string()));
                }
                user.equipments.push(equipment);
            }
            Ok(())
        })
    }

    async fn remove_equipment(
        &self,
        user_id: &str,
        equipment_id: &str,
    ) -> Result<User, ClientError> {
        self.check_failure()?;
        self.with_user(user_id, |user| {
            user.equipments.retain(|e| e.id != equipment_id);
            Ok(())
        })
    }

    async fn remove_all_equipments(&self, user_id: &str) -> Result<User, ClientError> {
        self.check_failure()?;
        self.with_user(user_id, |user| {
            user.equipments.clear();
            Ok(())
        })
    }

    async fn add_favorite_monster(
        &self,
        user_id: &str,
        monster_id: &str,
    ) -> Result<User, ClientError> {
        self.check_failure()?;
        self.with_user(user_id, |user| {
            if !user.favorited_monsters.iter().any(|m| m.id == monster_id) {
                user.favorited_monsters.push(test_monster(monster_id));
            }
            Ok(())
        })
    }

    async fn remove_favorite_monster(
        &self,
        user_id: &str,
        monster_id: &str,
    ) -> Result<User, ClientError> {
        self.check_failure()?;
        self.with_user(user_id, |user| {
            user.favorited_monsters.retain(|m| m.id != monster_id);
            Ok(())
        })
    }

    async fn fetch_user_review(
        &self,
        monster_id: &str,
        user_id: &str,
    ) -> Result<Option<Review>, ClientError> {
        self.check_failure()?;
        Ok(self
            .reviews
            .lock()
            .unwrap()
            .get(monster_id)
            .and_then(|reviews| reviews.iter().find(|r| r.user.id == user_id).cloned()))
    }

    async fn add_review(
        &self,
        monster_id: &str,
        review: ReviewInput,
    ) -> Result<Review, ClientError> {
        self.check_failure()?;
        let author = self.current_user.lock().unwrap().clone();
        let stored = Review {
            id: uuid::Uuid::new_v4().to_string(),
            user: author.clone(),
            difficulty: clamp_difficulty(review.difficulty),
            description: truncate_description(&review.description),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let mut reviews = self.reviews.lock().unwrap();
        let entries = reviews.entry(monster_id.to_string()).or_default();
        // One review per (user, monster): a second create replaces the first
        entries.retain(|r| r.user.id != author.id);
        entries.push(stored.clone());

        Ok(stored)
    }

    async fn update_review(
        &self,
        review_id: &str,
        review: ReviewInput,
    ) -> Result<Review, ClientError> {
        self.check_failure()?;
        let mut reviews = self.reviews.lock().unwrap();
        for entries in reviews.values_mut() {
            if let Some(entry) = entries.iter_mut().find(|r| r.id == review_id) {
                entry.difficulty = clamp_difficulty(review.difficulty);
                entry.description = truncate_description(&review.description);
                return Ok(entry.clone());
            }
        }

        Err(ClientError::Server("Review not found".to_string()))
    }
}

// Fixtures

pub(crate) fn test_race(id: &str) -> Race {
    Race {
        id: id.to_string(),
        index: "human".to_string(),
        name: "Human".to_string(),
        speed: 30,
        alignment: "neutral".to_string(),
        size: "Medium".to_string(),
        size_description: "Medium-sized".to_string(),
    }
}

pub(crate) fn test_class(id: &str) -> Class {
    Class {
        id: id.to_string(),
        index: "barbarian".to_string(),
        name: "Barbarian".to_string(),
        hit_die: 12,
        skills: vec!["Athletics".to_string()],
    }
}

pub(crate) fn test_monster(id: &str) -> Monster {
    Monster {
        id: id.to_string(),
        name: format!("Monster {}", id),
        size: "Medium".to_string(),
        type_: "humanoid".to_string(),
        alignment: "neutral".to_string(),
        hit_points: 10,
        image: None,
        reviews: Vec::new(),
    }
}

pub(crate) fn test_user(id: &str, user_name: &str) -> User {
    User {
        id: id.to_string(),
        user_name: user_name.to_string(),
        race: test_race("race-human"),
        class: test_class("class-barbarian"),
        ability_scores: Vec::new(),
        equipments: Vec::new(),
        favorited_monsters: Vec::new(),
        dungeon_name: DEFAULT_DUNGEON_NAME.to_string(),
    }
}

pub(crate) fn catalog_item(slug: &str) -> Equipment {
    let mut chars = slug.chars();
    let name = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };

    Equipment {
        id: slug.to_string(),
        index: slug.to_string(),
        name,
        value: 5,
    }
}
