//! SeaORM Entity for cases table
//!
//! A case is a support ticket opened by a user. Status transitions are
//! monotonic; `resolved_at`/`resolved_by` are set exactly when the case
//! reaches resolved or closed. Rows are never hard-deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    #[sea_orm(string_value = "dispute")]
    Dispute,
    #[sea_orm(string_value = "refund")]
    Refund,
    #[sea_orm(string_value = "report")]
    Report,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "escalated")]
    Escalated,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::New => "new",
            CaseStatus::Open => "open",
            CaseStatus::Escalated => "escalated",
            CaseStatus::Resolved => "resolved",
            CaseStatus::Closed => "closed",
        }
    }

    /// Escalation is legal only from the working states.
    pub fn can_escalate(&self) -> bool {
        matches!(self, CaseStatus::New | CaseStatus::Open)
    }

    /// Resolution is legal from any state before resolved.
    pub fn can_resolve(&self) -> bool {
        matches!(
            self,
            CaseStatus::New | CaseStatus::Open | CaseStatus::Escalated
        )
    }

    /// `closed` is reachable only from resolved and is terminal.
    pub fn can_close(&self) -> bool {
        matches!(self, CaseStatus::Resolved)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum CasePriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "urgent")]
    Urgent,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: i32,
    pub case_type: CaseType,
    #[sea_orm(column_type = "Text")]
    pub subject: String,
    pub status: CaseStatus,
    pub priority: CasePriority,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub resolved_at: Option<DateTime>,
    pub resolved_by: Option<i32>,
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
    #[sea_orm(has_many = "super::case_messages::Entity")]
    Messages,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::case_messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::CaseStatus;

    #[test]
    fn transition_guards_follow_state_machine() {
        assert!(CaseStatus::New.can_escalate());
        assert!(CaseStatus::Open.can_escalate());
        assert!(!CaseStatus::Escalated.can_escalate());
        assert!(!CaseStatus::Resolved.can_escalate());
        assert!(!CaseStatus::Closed.can_escalate());

        assert!(CaseStatus::New.can_resolve());
        assert!(CaseStatus::Open.can_resolve());
        assert!(CaseStatus::Escalated.can_resolve());
        assert!(!CaseStatus::Resolved.can_resolve());
        assert!(!CaseStatus::Closed.can_resolve());

        assert!(CaseStatus::Resolved.can_close());
        assert!(!CaseStatus::New.can_close());
        assert!(!CaseStatus::Closed.can_close());
    }
}
