//! Read-only reporting for staff dashboards.
//!
//! Counts run against committed snapshots; nothing here takes locks or
//! writes.

use crate::db::get_db_pool;
use crate::orm::audit_log::{self, AuditAction};
use crate::orm::cases::{self, CaseStatus};
use crate::orm::listings::{self, ListingStatus};
use crate::orm::users;
use sea_orm::{entity::*, query::*, DbErr, Iterable};
use serde::Serialize;

/// Case queue sizes per status.
#[derive(Debug, Clone, Serialize)]
pub struct CaseQueueCounts {
    pub new: usize,
    pub open: usize,
    pub escalated: usize,
    pub resolved: usize,
    pub closed: usize,
}

pub async fn case_queue_counts() -> Result<CaseQueueCounts, DbErr> {
    let db = get_db_pool();

    let count_for = |status: CaseStatus| {
        cases::Entity::find()
            .filter(cases::Column::Status.eq(status))
            .count(db)
    };

    Ok(CaseQueueCounts {
        new: count_for(CaseStatus::New).await?,
        open: count_for(CaseStatus::Open).await?,
        escalated: count_for(CaseStatus::Escalated).await?,
        resolved: count_for(CaseStatus::Resolved).await?,
        closed: count_for(CaseStatus::Closed).await?,
    })
}

/// Audit entry counts per action since a timestamp. Actions with zero
/// entries are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationActivity {
    pub action: AuditAction,
    pub count: usize,
}

pub async fn moderation_activity(
    since: chrono::NaiveDateTime,
) -> Result<Vec<ModerationActivity>, DbErr> {
    let db = get_db_pool();
    let mut activity = Vec::new();

    for action in AuditAction::iter() {
        let count = audit_log::Entity::find()
            .filter(audit_log::Column::Action.eq(action.clone()))
            .filter(audit_log::Column::CreatedAt.gte(since))
            .count(db)
            .await?;

        if count > 0 {
            activity.push(ModerationActivity { action, count });
        }
    }

    Ok(activity)
}

/// Standing moderation state across the site.
#[derive(Debug, Clone, Serialize)]
pub struct SiteHealthCounts {
    pub banned_users: usize,
    pub suspended_users: usize,
    pub restricted_users: usize,
    pub frozen_listings: usize,
}

pub async fn site_health_counts() -> Result<SiteHealthCounts, DbErr> {
    let db = get_db_pool();

    Ok(SiteHealthCounts {
        banned_users: users::Entity::find()
            .filter(users::Column::IsBanned.eq(true))
            .count(db)
            .await?,
        suspended_users: users::Entity::find()
            .filter(users::Column::IsSuspended.eq(true))
            .count(db)
            .await?,
        restricted_users: users::Entity::find()
            .filter(users::Column::IsRestricted.eq(true))
            .count(db)
            .await?,
        frozen_listings: listings::Entity::find()
            .filter(listings::Column::Status.eq(ListingStatus::Frozen))
            .count(db)
            .await?,
    })
}
