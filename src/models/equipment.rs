//! Equipment model. Equipment is reference data owned by the catalog and
//! referenced, never owned, by users.

use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

/// A piece of equipment a character can carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: String,
    pub index: String,
    pub name: String,
    pub value: i32,
}

/// Paginated equipment listing.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentResult {
    pub equipments: Vec<Equipment>,
    pub total_equipments: i32,
}
