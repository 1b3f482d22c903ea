//! Append-only audit log for privileged actions.
//!
//! `append` is the only write path; querying is read-only and newest-first.
//! Audit rows record successful actions only — a denied or failed operation
//! never leaves a partial trail.

use crate::app_config::APP_CONFIG;
use crate::db::get_db_pool;
use crate::orm::audit_log::{self, AuditAction, TargetType};
use crate::orm::user_roles::Role;
use chrono::Utc;
use sea_orm::{entity::*, query::*, ActiveValue::Set, ConnectionTrait, DbErr};

/// A privileged action about to be recorded.
#[derive(Debug, Clone)]
pub struct NewAuditEntry<'a> {
    pub actor_id: i32,
    pub actor_role: Role,
    pub action: AuditAction,
    pub target_type: TargetType,
    pub target_id: i32,
    pub reason: &'a str,
    pub metadata: Option<serde_json::Value>,
}

/// Insert an audit row. Generic over the connection so callers pair it with
/// their entity mutation inside a single transaction.
pub async fn append<C: ConnectionTrait>(
    conn: &C,
    entry: NewAuditEntry<'_>,
) -> Result<audit_log::Model, DbErr> {
    audit_log::ActiveModel {
        actor_id: Set(entry.actor_id),
        actor_role: Set(entry.actor_role),
        action: Set(entry.action),
        target_type: Set(entry.target_type),
        target_id: Set(entry.target_id),
        reason: Set(entry.reason.trim().to_string()),
        metadata: Set(entry.metadata),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Filters for the audit log query. All fields are optional and combined
/// with AND.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub action: Option<AuditAction>,
    pub target_type: Option<TargetType>,
    pub target_id: Option<i32>,
    pub actor_id: Option<i32>,
    /// Substring match against the reason text.
    pub text_search: Option<String>,
    pub since: Option<chrono::NaiveDateTime>,
    pub until: Option<chrono::NaiveDateTime>,
    pub limit: Option<u64>,
}

/// Query the audit log, newest first. The result size is capped by the
/// configured audit_query_limit.
pub async fn query(filter: AuditFilter) -> Result<Vec<audit_log::Model>, DbErr> {
    let db = get_db_pool();
    let max_limit = APP_CONFIG
        .read()
        .expect("Config lock poisoned")
        .moderation
        .audit_query_limit;

    let mut query = audit_log::Entity::find()
        .order_by_desc(audit_log::Column::CreatedAt)
        .order_by_desc(audit_log::Column::Id);

    if let Some(action) = filter.action {
        query = query.filter(audit_log::Column::Action.eq(action));
    }
    if let Some(target_type) = filter.target_type {
        query = query.filter(audit_log::Column::TargetType.eq(target_type));
    }
    if let Some(target_id) = filter.target_id {
        query = query.filter(audit_log::Column::TargetId.eq(target_id));
    }
    if let Some(actor_id) = filter.actor_id {
        query = query.filter(audit_log::Column::ActorId.eq(actor_id));
    }
    if let Some(text) = filter.text_search {
        query = query.filter(audit_log::Column::Reason.contains(&text));
    }
    if let Some(since) = filter.since {
        query = query.filter(audit_log::Column::CreatedAt.gte(since));
    }
    if let Some(until) = filter.until {
        query = query.filter(audit_log::Column::CreatedAt.lte(until));
    }

    let limit = filter.limit.map(|l| l.min(max_limit)).unwrap_or(max_limit);

    query.limit(limit).all(db).await
}
