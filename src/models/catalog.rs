//! Immutable catalog models: races, classes and ability scores.

use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

/// A playable race. Catalog entries are keyed by `name` in the client
/// cache since they never change after seeding.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: String,
    pub index: String,
    pub name: String,
    pub speed: i32,
    pub alignment: String,
    pub size: String,
    pub size_description: String,
}

/// A playable class.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub index: String,
    pub name: String,
    pub hit_die: i32,
    pub skills: Vec<String>,
}

/// One of the six ability scores (str, dex, con, int, wis, cha).
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct AbilityScore {
    pub id: String,
    pub index: String,
    pub full_name: String,
}

/// Paginated race listing.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub races: Vec<Race>,
    pub total_races: i32,
}

/// Paginated class listing.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ClassResult {
    pub classes: Vec<Class>,
    pub total_classes: i32,
}

/// Paginated ability listing.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct AbilityResult {
    pub abilities: Vec<AbilityScore>,
    pub total_abilities: i32,
}
