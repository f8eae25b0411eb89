//! User model and the auth payload returned by login/registration.

use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

use super::{AbilityScore, Class, Equipment, Monster, Race};

/// Maximum number of items a user can have equipped at once.
pub const MAX_EQUIPMENTS: usize = 10;

/// Default dungeon name assigned at registration.
pub const DEFAULT_DUNGEON_NAME: &str = "My Dungeon";

/// A registered user with populated references. A user always has exactly
/// one race and one class after creation.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub user_name: String,
    pub race: Race,
    pub class: Class,
    #[serde(default)]
    pub ability_scores: Vec<AbilityScoreEntry>,
    #[serde(default)]
    pub equipments: Vec<Equipment>,
    #[serde(default)]
    pub favorited_monsters: Vec<Monster>,
    pub dungeon_name: String,
}

/// One ability-score entry on a user: an ability reference plus the score.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct AbilityScoreEntry {
    pub ability: AbilityScore,
    pub score: i32,
}

/// Result of `createUser` / `loginUser`: the user plus a signed bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}

/// The raw user row as stored. Reference lists are kept as id lists and
/// populated by the repository when building a [`User`].
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub user_name: String,
    pub race_id: String,
    pub class_id: String,
    pub ability_scores: Vec<StoredAbilityScore>,
    pub equipment_ids: Vec<String>,
    pub favorite_monster_ids: Vec<String>,
    pub dungeon_name: String,
}

/// Stored form of an ability-score entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAbilityScore {
    pub ability_id: String,
    pub score: i32,
}
