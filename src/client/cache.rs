//! Normalized entity cache with type-specific merge policy.
//!
//! Entities are keyed by typename plus a stable key field: `id` for most
//! types, `name` for Class and Race since those are immutable catalog
//! entries. Incoming data is merged at field granularity: each incoming
//! field overwrites the existing one wholesale. That makes list-valued
//! fields (favorited monsters, equipments, reviews) and reference fields
//! (class, race) replace rather than element-wise merge, so removed entries
//! can never be resurrected by a partial merge.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::models::{Review, User};

/// Cache key: typename plus key-field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub typename: String,
    pub key: String,
}

/// Key field for a typename. Catalog entries are keyed by name.
fn key_field(typename: &str) -> &'static str {
    match typename {
        "Class" | "Race" => "name",
        _ => "id",
    }
}

/// The normalized client cache.
#[derive(Debug, Default)]
pub struct NormalizedCache {
    entities: HashMap<CacheKey, Map<String, Value>>,
}

impl NormalizedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an incoming entity into the cache. Returns the key it was
    /// stored under, or `None` when the object lacks its key field.
    pub fn write(&mut self, typename: &str, value: &Value) -> Option<CacheKey> {
        let object = value.as_object()?;
        let key = object.get(key_field(typename))?.as_str()?.to_string();

        let cache_key = CacheKey {
            typename: typename.to_string(),
            key,
        };

        let entry = self.entities.entry(cache_key.clone()).or_default();
        for (field, incoming) in object {
            entry.insert(field.clone(), incoming.clone());
        }

        Some(cache_key)
    }

    /// Read an entity back out of the cache.
    pub fn read(&self, typename: &str, key: &str) -> Option<Value> {
        self.entities
            .get(&CacheKey {
                typename: typename.to_string(),
                key: key.to_string(),
            })
            .map(|object| Value::Object(object.clone()))
    }

    /// Number of cached entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Write a user response: the nested catalog entries and monsters are
    /// normalized into their own cache entries, then the user object itself
    /// is merged (its lists replacing any cached ones wholesale).
    pub fn write_user(&mut self, user: &User) {
        if let Ok(race) = serde_json::to_value(&user.race) {
            self.write("Race", &race);
        }
        if let Ok(class) = serde_json::to_value(&user.class) {
            self.write("Class", &class);
        }
        for equipment in &user.equipments {
            if let Ok(value) = serde_json::to_value(equipment) {
                self.write("Equipment", &value);
            }
        }
        for monster in &user.favorited_monsters {
            if let Ok(value) = serde_json::to_value(monster) {
                self.write("Monster", &value);
            }
        }
        if let Ok(value) = serde_json::to_value(user) {
            self.write("User", &value);
        }
    }

    /// Merge a review mutation result into the cached monster, replacing
    /// the author's previous review or appending a new one. Subsequent
    /// dialog opens read this without a refetch. A monster not cached yet
    /// gets a stub entry holding just the review list.
    pub fn merge_monster_review(&mut self, monster_id: &str, review: &Review) {
        let Ok(review_value) = serde_json::to_value(review) else {
            return;
        };

        let mut monster = match self.read("Monster", monster_id) {
            Some(Value::Object(object)) => object,
            _ => {
                let mut object = Map::new();
                object.insert("id".to_string(), Value::String(monster_id.to_string()));
                object
            }
        };

        let reviews = monster
            .entry("reviews".to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(entries) = reviews {
            let existing = entries.iter_mut().find(|entry| {
                entry.get("id").and_then(Value::as_str) == Some(review.id.as_str())
                    || entry
                        .get("user")
                        .and_then(|u| u.get("id"))
                        .and_then(Value::as_str)
                        == Some(review.user.id.as_str())
            });

            match existing {
                Some(entry) => *entry = review_value,
                None => entries.push(review_value),
            }
        }

        self.write("Monster", &Value::Object(monster));
    }

    /// The review a user has in the cached monster entry, if any. Takes the
    /// first match.
    pub fn user_review(&self, monster_id: &str, user_id: &str) -> Option<Review> {
        let monster = self.read("Monster", monster_id)?;
        let reviews = monster.get("reviews")?.as_array()?;

        reviews
            .iter()
            .find(|entry| {
                entry
                    .get("user")
                    .and_then(|u| u.get("id"))
                    .and_then(Value::as_str)
                    == Some(user_id)
            })
            .and_then(|entry| serde_json::from_value(entry.clone()).ok())
    }
}
