//! SeaORM Entity for users table (moderation subset)
//!
//! The moderation flags are independent booleans, not mutually exclusive.
//! `warnings_count` is increment-only; `admin_notes` always carries the
//! reason of the most recent moderation action.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub is_banned: bool,
    pub is_suspended: bool,
    pub is_restricted: bool,
    pub warnings_count: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cases::Entity")]
    Cases,
    #[sea_orm(has_many = "super::listings::Entity")]
    Listings,
}

impl Related<super::cases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cases.def()
    }
}

impl Related<super::listings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
