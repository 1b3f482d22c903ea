//! Audit log query endpoint (staff only)

use crate::audit::{self, AuditFilter};
use crate::error::ServiceError;
use crate::middleware::Actor;
use crate::orm::audit_log::{self, AuditAction, TargetType};
use crate::orm::user_roles::Role;
use actix_web::{get, web, Error, HttpResponse};
use serde::{Deserialize, Serialize};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(query_audit_log);
}

#[derive(Deserialize)]
struct AuditLogQuery {
    action: Option<AuditAction>,
    target_type: Option<TargetType>,
    target_id: Option<i32>,
    actor_id: Option<i32>,
    search: Option<String>,
    since: Option<chrono::NaiveDateTime>,
    until: Option<chrono::NaiveDateTime>,
    limit: Option<u64>,
}

#[derive(Serialize)]
struct AuditEntryResponse {
    id: i32,
    actor_id: i32,
    actor_role: Role,
    action: AuditAction,
    target_type: TargetType,
    target_id: i32,
    reason: String,
    metadata: Option<serde_json::Value>,
    created_at: chrono::NaiveDateTime,
}

impl From<audit_log::Model> for AuditEntryResponse {
    fn from(entry: audit_log::Model) -> Self {
        Self {
            id: entry.id,
            actor_id: entry.actor_id,
            actor_role: entry.actor_role,
            action: entry.action,
            target_type: entry.target_type,
            target_id: entry.target_id,
            reason: entry.reason,
            metadata: entry.metadata,
            created_at: entry.created_at,
        }
    }
}

/// Filtered audit log query, newest first.
#[get("/admin/audit-log")]
async fn query_audit_log(
    actor: Actor,
    query: web::Query<AuditLogQuery>,
) -> Result<HttpResponse, Error> {
    actor.require_staff().map_err(ServiceError::from)?;

    let query = query.into_inner();
    let entries = audit::query(AuditFilter {
        action: query.action,
        target_type: query.target_type,
        target_id: query.target_id,
        actor_id: query.actor_id,
        text_search: query.search,
        since: query.since,
        until: query.until,
        limit: query.limit,
    })
    .await
    .map_err(ServiceError::from)?;

    let response: Vec<AuditEntryResponse> =
        entries.into_iter().map(AuditEntryResponse::from).collect();

    Ok(HttpResponse::Ok().json(response))
}
