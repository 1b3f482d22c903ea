//! Case workflow engine: ticket lifecycle, message thread, visibility rules.
//!
//! Status transitions are guarded against the stored status inside the
//! UPDATE itself, so two concurrent resolve calls can never both succeed.
//! Transitions that must be audited commit the status change and the audit
//! row in one transaction.

use crate::audit::{self, NewAuditEntry};
use crate::db::get_db_pool;
use crate::error::ServiceError;
use crate::middleware::Actor;
use crate::orm::audit_log::{AuditAction, TargetType};
use crate::orm::case_messages;
use crate::orm::cases::{self, CasePriority, CaseStatus, CaseType};
use chrono::Utc;
use sea_orm::{entity::*, query::*, sea_query::Expr, ActiveValue::Set, TransactionTrait};

/// Open a new case. The caller is the owner; no further permission check.
pub async fn open_case(
    owner: &Actor,
    case_type: CaseType,
    subject: &str,
    priority: CasePriority,
) -> Result<cases::Model, ServiceError> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(ServiceError::Validation("Subject is required".to_string()));
    }

    let now = Utc::now().naive_utc();
    let case = cases::ActiveModel {
        owner_id: Set(owner.id),
        case_type: Set(case_type),
        subject: Set(subject.to_string()),
        status: Set(CaseStatus::New),
        priority: Set(priority),
        created_at: Set(now),
        updated_at: Set(now),
        resolved_at: Set(None),
        resolved_by: Set(None),
        ..Default::default()
    }
    .insert(get_db_pool())
    .await?;

    log::info!("Case {} opened by user {}", case.id, owner.id);

    Ok(case)
}

/// Fetch a case. Visible to its owner and to staff.
pub async fn get_case(case_id: i32, caller: &Actor) -> Result<cases::Model, ServiceError> {
    let case = cases::Entity::find_by_id(case_id)
        .one(get_db_pool())
        .await?
        .ok_or(ServiceError::NotFound("case"))?;

    if case.owner_id != caller.id && !caller.is_staff() {
        return Err(ServiceError::PermissionDenied);
    }

    Ok(case)
}

/// Post a message into a case thread.
///
/// Internal notes require a staff role. The first public staff reply moves a
/// fresh case from `new` into the `open` working queue.
pub async fn post_message(
    case_id: i32,
    sender: &Actor,
    content: &str,
    is_internal: bool,
) -> Result<case_messages::Model, ServiceError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ServiceError::Validation(
            "Message content is required".to_string(),
        ));
    }
    if is_internal && !sender.is_staff() {
        return Err(ServiceError::PermissionDenied);
    }

    let db = get_db_pool();
    let txn = db.begin().await?;

    let case = cases::Entity::find_by_id(case_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound("case"))?;

    if case.owner_id != sender.id && !sender.is_staff() {
        return Err(ServiceError::PermissionDenied);
    }

    let now = Utc::now().naive_utc();
    let message = case_messages::ActiveModel {
        case_id: Set(case_id),
        sender_id: Set(sender.id),
        content: Set(content.to_string()),
        is_internal: Set(is_internal),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    cases::Entity::update_many()
        .col_expr(cases::Column::UpdatedAt, Expr::value(now))
        .filter(cases::Column::Id.eq(case_id))
        .exec(&txn)
        .await?;

    if sender.is_staff() && !is_internal && case.status == CaseStatus::New {
        // Guarded against the stored status; a concurrent transition wins.
        cases::Entity::update_many()
            .col_expr(cases::Column::Status, Expr::value(CaseStatus::Open))
            .filter(cases::Column::Id.eq(case_id))
            .filter(cases::Column::Status.eq(CaseStatus::New))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    Ok(message)
}

/// List a case's messages, ascending by creation time.
///
/// The central confidentiality guarantee of the subsystem: internal notes
/// are filtered out at the query boundary for non-staff callers, never by
/// client trust.
pub async fn list_messages(
    case_id: i32,
    caller: &Actor,
) -> Result<Vec<case_messages::Model>, ServiceError> {
    let db = get_db_pool();

    let case = cases::Entity::find_by_id(case_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("case"))?;

    if case.owner_id != caller.id && !caller.is_staff() {
        return Err(ServiceError::PermissionDenied);
    }

    let mut query = case_messages::Entity::find()
        .filter(case_messages::Column::CaseId.eq(case_id))
        .order_by_asc(case_messages::Column::CreatedAt)
        .order_by_asc(case_messages::Column::Id);

    if !caller.is_staff() {
        query = query.filter(case_messages::Column::IsInternal.eq(false));
    }

    Ok(query.all(db).await?)
}

/// Escalate a case: new|open -> escalated. Staff only; reason required.
pub async fn escalate(
    case_id: i32,
    actor: &Actor,
    reason: &str,
) -> Result<cases::Model, ServiceError> {
    actor.require_staff()?;
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ServiceError::Validation("Reason is required".to_string()));
    }

    let db = get_db_pool();
    let txn = db.begin().await?;
    let now = Utc::now().naive_utc();

    let updated = cases::Entity::update_many()
        .col_expr(cases::Column::Status, Expr::value(CaseStatus::Escalated))
        .col_expr(cases::Column::UpdatedAt, Expr::value(now))
        .filter(cases::Column::Id.eq(case_id))
        .filter(cases::Column::Status.is_in([CaseStatus::New, CaseStatus::Open]))
        .exec(&txn)
        .await?;

    if updated.rows_affected == 0 {
        return Err(transition_failure(&txn, case_id, "escalate").await?);
    }

    audit::append(
        &txn,
        NewAuditEntry {
            actor_id: actor.id,
            actor_role: actor.role.clone(),
            action: AuditAction::CaseEscalated,
            target_type: TargetType::Case,
            target_id: case_id,
            reason,
            metadata: None,
        },
    )
    .await?;

    let case = cases::Entity::find_by_id(case_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound("case"))?;
    txn.commit().await?;

    log::info!("Case {} escalated by {}: {}", case_id, actor.id, reason);

    Ok(case)
}

/// Resolve a case: new|open|escalated -> resolved.
///
/// A second resolve call is rejected with `InvalidTransition`, never
/// silently accepted.
pub async fn resolve(
    case_id: i32,
    actor: &Actor,
    note: Option<&str>,
) -> Result<cases::Model, ServiceError> {
    actor.require_staff()?;

    let db = get_db_pool();
    let txn = db.begin().await?;
    let now = Utc::now().naive_utc();

    let updated = cases::Entity::update_many()
        .col_expr(cases::Column::Status, Expr::value(CaseStatus::Resolved))
        .col_expr(cases::Column::ResolvedAt, Expr::value(Some(now)))
        .col_expr(cases::Column::ResolvedBy, Expr::value(Some(actor.id)))
        .col_expr(cases::Column::UpdatedAt, Expr::value(now))
        .filter(cases::Column::Id.eq(case_id))
        .filter(cases::Column::Status.is_in([
            CaseStatus::New,
            CaseStatus::Open,
            CaseStatus::Escalated,
        ]))
        .exec(&txn)
        .await?;

    if updated.rows_affected == 0 {
        return Err(transition_failure(&txn, case_id, "resolve").await?);
    }

    let reason = note
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Case resolved");

    audit::append(
        &txn,
        NewAuditEntry {
            actor_id: actor.id,
            actor_role: actor.role.clone(),
            action: AuditAction::CaseResolved,
            target_type: TargetType::Case,
            target_id: case_id,
            reason,
            metadata: None,
        },
    )
    .await?;

    let case = cases::Entity::find_by_id(case_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound("case"))?;
    txn.commit().await?;

    log::info!("Case {} resolved by {}", case_id, actor.id);

    Ok(case)
}

/// Close a resolved case. Terminal; no further transitions exist.
pub async fn close_case(
    case_id: i32,
    actor: &Actor,
    note: Option<&str>,
) -> Result<cases::Model, ServiceError> {
    actor.require_staff()?;

    let db = get_db_pool();
    let txn = db.begin().await?;
    let now = Utc::now().naive_utc();

    let updated = cases::Entity::update_many()
        .col_expr(cases::Column::Status, Expr::value(CaseStatus::Closed))
        .col_expr(cases::Column::UpdatedAt, Expr::value(now))
        .filter(cases::Column::Id.eq(case_id))
        .filter(cases::Column::Status.eq(CaseStatus::Resolved))
        .exec(&txn)
        .await?;

    if updated.rows_affected == 0 {
        return Err(transition_failure(&txn, case_id, "close").await?);
    }

    let reason = note
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Case closed");

    audit::append(
        &txn,
        NewAuditEntry {
            actor_id: actor.id,
            actor_role: actor.role.clone(),
            action: AuditAction::CaseClosed,
            target_type: TargetType::Case,
            target_id: case_id,
            reason,
            metadata: None,
        },
    )
    .await?;

    let case = cases::Entity::find_by_id(case_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound("case"))?;
    txn.commit().await?;

    log::info!("Case {} closed by {}", case_id, actor.id);

    Ok(case)
}

/// A guarded transition touched zero rows: either the case does not exist,
/// or its stored status rejects the edge.
async fn transition_failure<C: sea_orm::ConnectionTrait>(
    conn: &C,
    case_id: i32,
    verb: &str,
) -> Result<ServiceError, ServiceError> {
    let case = cases::Entity::find_by_id(case_id).one(conn).await?;

    Ok(match case {
        Some(case) => ServiceError::InvalidTransition(format!(
            "Cannot {} a case with status '{}'",
            verb,
            case.status.as_str()
        )),
        None => ServiceError::NotFound("case"),
    })
}
