//! SeaORM Entity for audit_log table
//!
//! Append-only record of every privileged action. No update or delete
//! operation exists anywhere in the crate; every moderation action writes
//! exactly one row in the same transaction as its entity mutation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    #[sea_orm(string_value = "user_warned")]
    UserWarned,
    #[sea_orm(string_value = "user_restricted")]
    UserRestricted,
    #[sea_orm(string_value = "user_suspended")]
    UserSuspended,
    #[sea_orm(string_value = "user_banned")]
    UserBanned,
    #[sea_orm(string_value = "user_restored")]
    UserRestored,
    #[sea_orm(string_value = "listing_frozen")]
    ListingFrozen,
    #[sea_orm(string_value = "listing_removed")]
    ListingRemoved,
    #[sea_orm(string_value = "listing_restored")]
    ListingRestored,
    #[sea_orm(string_value = "case_escalated")]
    CaseEscalated,
    #[sea_orm(string_value = "case_resolved")]
    CaseResolved,
    #[sea_orm(string_value = "case_closed")]
    CaseClosed,
    #[sea_orm(string_value = "user_role_changed")]
    UserRoleChanged,
    #[sea_orm(string_value = "setting_updated")]
    SettingUpdated,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "listing")]
    Listing,
    #[sea_orm(string_value = "case")]
    Case,
    #[sea_orm(string_value = "system")]
    System,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub actor_id: i32,
    pub actor_role: super::user_roles::Role,
    pub action: AuditAction,
    pub target_type: TargetType,
    pub target_id: i32,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub metadata: Option<Json>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ActorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Actor,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
