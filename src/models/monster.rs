//! Monster and review models.

use async_graphql::{InputObject, SimpleObject};
use serde::{Deserialize, Serialize};

/// Maximum length of a review description. Longer input is truncated to
/// exactly this many characters, both client-side and server-side.
pub const MAX_REVIEW_DESCRIPTION_LEN: usize = 300;

/// A monster from the bestiary. Catalog data plus attached reviews.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    pub id: String,
    pub name: String,
    pub size: String,
    #[graphql(name = "type")]
    #[serde(rename = "type")]
    pub type_: String,
    pub alignment: String,
    pub hit_points: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// A user's difficulty review of a monster. At most one per (user, monster).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub user: Reviewer,
    pub difficulty: i32,
    pub description: String,
    pub created_at: String,
}

/// The authoring user of a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Reviewer {
    pub id: String,
    pub user_name: String,
}

/// Input for creating or updating a review. The authoring user comes from
/// the bearer token, not the input.
#[derive(Debug, Clone, Serialize, Deserialize, InputObject)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub difficulty: i32,
    pub description: String,
}

/// Paginated monster listing with HP bounds over the filtered set.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct MonsterResult {
    pub monsters: Vec<Monster>,
    pub total_monsters: i32,
    pub min_hp: i32,
    pub max_hp: i32,
}

/// Number of monsters of a given type within an optional HP range.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct MonsterTypeCount {
    #[graphql(name = "type")]
    #[serde(rename = "type")]
    pub type_: String,
    pub count: i32,
}

/// Clamp a difficulty value to the allowed [0, 100] range.
pub fn clamp_difficulty(value: i32) -> i32 {
    value.clamp(0, 100)
}

/// Truncate a review description to the maximum stored length, respecting
/// character boundaries.
pub fn truncate_description(description: &str) -> String {
    description.chars().take(MAX_REVIEW_DESCRIPTION_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_description_short_input_unchanged() {
        assert_eq!(truncate_description("fearsome"), "fearsome");
    }

    #[test]
    fn test_truncate_description_long_input() {
        let long = "x".repeat(450);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), MAX_REVIEW_DESCRIPTION_LEN);
        assert_eq!(truncated, "x".repeat(300));
    }

    #[test]
    fn test_clamp_difficulty() {
        assert_eq!(clamp_difficulty(-10), 0);
        assert_eq!(clamp_difficulty(50), 50);
        assert_eq!(clamp_difficulty(250), 100);
    }
}
