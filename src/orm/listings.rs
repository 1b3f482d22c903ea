//! SeaORM Entity for listings table (marketplace moderation subset)
//!
//! Moderation only transitions into/out of `frozen` or forces
//! `cancelled`/`active`; `sold` belongs to the marketplace lifecycle and is
//! never produced by a moderation action.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "frozen")]
    Frozen,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Sold => "sold",
            ListingStatus::Cancelled => "cancelled",
            ListingStatus::Frozen => "frozen",
        }
    }

    /// Restore is valid only for listings a moderator previously took down.
    pub fn can_restore(&self) -> bool {
        matches!(self, ListingStatus::Frozen | ListingStatus::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub status: ListingStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::ListingStatus;

    #[test]
    fn restore_only_from_moderated_states() {
        assert!(ListingStatus::Frozen.can_restore());
        assert!(ListingStatus::Cancelled.can_restore());
        assert!(!ListingStatus::Active.can_restore());
        assert!(!ListingStatus::Sold.can_restore());
    }
}
