//! Moderation engine: privileged, audited mutations of users and listings.
//!
//! Every action pairs its state change with exactly one audit row in a
//! single transaction; if either write fails, neither is visible. The
//! target row is locked for the duration with a bounded wait, so concurrent
//! actions against the same target serialize or fail as a retryable
//! conflict. The engine never retries on its own.

use crate::app_config::APP_CONFIG;
use crate::audit::{self, NewAuditEntry};
use crate::db::get_db_pool;
use crate::error::ServiceError;
use crate::middleware::Actor;
use crate::orm::audit_log::{self, AuditAction, TargetType};
use crate::orm::listings::{self, ListingStatus};
use crate::orm::user_roles::Role;
use crate::orm::users;
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ActiveValue::Set, ConnectionTrait, DbErr, Statement,
    TransactionTrait,
};
use serde::Deserialize;

/// Actions a moderator or admin can take against a user account.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Warn,
    Restrict,
    Suspend,
    Ban,
    Unban,
}

impl UserAction {
    /// Destructive actions require the highest role.
    pub fn is_allowed(&self, role: &Role) -> bool {
        match self {
            UserAction::Warn | UserAction::Restrict => role.is_staff(),
            UserAction::Suspend | UserAction::Ban | UserAction::Unban => role.is_admin(),
        }
    }

    pub fn audit_action(&self) -> AuditAction {
        match self {
            UserAction::Warn => AuditAction::UserWarned,
            UserAction::Restrict => AuditAction::UserRestricted,
            UserAction::Suspend => AuditAction::UserSuspended,
            UserAction::Ban => AuditAction::UserBanned,
            UserAction::Unban => AuditAction::UserRestored,
        }
    }
}

/// Actions a moderator can take against a marketplace listing.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingAction {
    Freeze,
    Remove,
    Restore,
}

impl ListingAction {
    pub fn audit_action(&self) -> AuditAction {
        match self {
            ListingAction::Freeze => AuditAction::ListingFrozen,
            ListingAction::Remove => AuditAction::ListingRemoved,
            ListingAction::Restore => AuditAction::ListingRestored,
        }
    }

    pub fn new_status(&self) -> ListingStatus {
        match self {
            ListingAction::Freeze => ListingStatus::Frozen,
            ListingAction::Remove => ListingStatus::Cancelled,
            ListingAction::Restore => ListingStatus::Active,
        }
    }
}

/// Apply a moderation action to a user account.
///
/// Flag actions are idempotent per call (banning an already-banned user
/// still succeeds), but each successful call is independently audited.
/// `warn` applies an atomic in-database increment so concurrent warns are
/// never lost.
pub async fn apply_user_action(
    target_id: i32,
    actor: &Actor,
    action: UserAction,
    reason: &str,
) -> Result<(users::Model, audit_log::Model), ServiceError> {
    if !action.is_allowed(&actor.role) {
        return Err(ServiceError::PermissionDenied);
    }
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ServiceError::Validation("Reason is required".to_string()));
    }

    let db = get_db_pool();
    let txn = db.begin().await?;
    set_lock_timeout(&txn).await?;
    lock_row(&txn, "users", target_id)
        .await?
        .ok_or(ServiceError::NotFound("user"))?;

    let mut update = users::Entity::update_many()
        .col_expr(users::Column::AdminNotes, Expr::value(reason))
        .filter(users::Column::Id.eq(target_id));

    update = match action {
        UserAction::Warn => update.col_expr(
            users::Column::WarningsCount,
            Expr::col(users::Column::WarningsCount).add(1),
        ),
        UserAction::Restrict => update.col_expr(users::Column::IsRestricted, Expr::value(true)),
        UserAction::Suspend => update.col_expr(users::Column::IsSuspended, Expr::value(true)),
        UserAction::Ban => update.col_expr(users::Column::IsBanned, Expr::value(true)),
        // Restore clears every flag but leaves warnings_count untouched.
        UserAction::Unban => update
            .col_expr(users::Column::IsBanned, Expr::value(false))
            .col_expr(users::Column::IsSuspended, Expr::value(false))
            .col_expr(users::Column::IsRestricted, Expr::value(false)),
    };

    update.exec(&txn).await?;

    let entry = audit::append(
        &txn,
        NewAuditEntry {
            actor_id: actor.id,
            actor_role: actor.role.clone(),
            action: action.audit_action(),
            target_type: TargetType::User,
            target_id,
            reason,
            metadata: None,
        },
    )
    .await?;

    let user = users::Entity::find_by_id(target_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound("user"))?;
    txn.commit().await?;

    log::info!(
        "User {} {:?} by {} ({}): {}",
        target_id,
        action,
        actor.id,
        actor.role,
        reason
    );

    Ok((user, entry))
}

/// Apply a moderation action to a marketplace listing.
///
/// `restore` is valid only from frozen or cancelled; moderation never
/// produces or disturbs `sold`.
pub async fn apply_listing_action(
    listing_id: i32,
    actor: &Actor,
    action: ListingAction,
    reason: &str,
) -> Result<(listings::Model, audit_log::Model), ServiceError> {
    actor.require_staff()?;
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ServiceError::Validation("Reason is required".to_string()));
    }

    let db = get_db_pool();
    let txn = db.begin().await?;
    set_lock_timeout(&txn).await?;
    lock_row(&txn, "listings", listing_id)
        .await?
        .ok_or(ServiceError::NotFound("listing"))?;

    let listing = listings::Entity::find_by_id(listing_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound("listing"))?;

    if action == ListingAction::Restore && !listing.status.can_restore() {
        return Err(ServiceError::InvalidTransition(format!(
            "Cannot restore a listing with status '{}'",
            listing.status.as_str()
        )));
    }

    let old_status = listing.status;
    let new_status = action.new_status();

    listings::Entity::update_many()
        .col_expr(listings::Column::Status, Expr::value(new_status.clone()))
        .col_expr(
            listings::Column::UpdatedAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(listings::Column::Id.eq(listing_id))
        .exec(&txn)
        .await?;

    let entry = audit::append(
        &txn,
        NewAuditEntry {
            actor_id: actor.id,
            actor_role: actor.role.clone(),
            action: action.audit_action(),
            target_type: TargetType::Listing,
            target_id: listing_id,
            reason,
            metadata: Some(serde_json::json!({
                "from_status": old_status.as_str(),
                "to_status": new_status.as_str(),
            })),
        },
    )
    .await?;

    let listing = listings::Entity::find_by_id(listing_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound("listing"))?;
    txn.commit().await?;

    log::info!(
        "Listing {} {:?} by {} ({}): {}",
        listing_id,
        action,
        actor.id,
        actor.role,
        reason
    );

    Ok((listing, entry))
}

/// Bound lock waits for this transaction. Exceeding the bound surfaces as
/// SQLSTATE 55P03, which maps to `ServiceError::Conflict`.
pub(crate) async fn set_lock_timeout<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    let timeout_ms = APP_CONFIG
        .read()
        .expect("Config lock poisoned")
        .moderation
        .lock_timeout_ms;

    conn.execute(Statement::from_string(
        conn.get_database_backend(),
        format!("SET LOCAL lock_timeout = '{}ms'", timeout_ms),
    ))
    .await?;

    Ok(())
}

/// Take a row lock on the target so concurrent moderation of the same
/// entity serializes. Returns None if the row does not exist.
pub(crate) async fn lock_row<C: ConnectionTrait>(
    conn: &C,
    table: &str,
    id: i32,
) -> Result<Option<()>, DbErr> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            conn.get_database_backend(),
            &format!(r#"SELECT "id" FROM "{}" WHERE "id" = $1 FOR UPDATE"#, table),
            vec![id.into()],
        ))
        .await?;

    Ok(row.map(|_| ()))
}
