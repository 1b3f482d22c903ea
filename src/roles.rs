//! Role assignment service: one current role per user, changes audited.
//!
//! A user with no row in user_roles has the default `user` role. Assigning
//! a role replaces the prior assignment (delete-then-insert, never
//! additive) and writes a user_role_changed audit entry recording the
//! old -> new pair. The target user row is locked for the duration so
//! concurrent assignments serialize instead of racing the replace.

use crate::audit::{self, NewAuditEntry};
use crate::db::get_db_pool;
use crate::error::ServiceError;
use crate::middleware::Actor;
use crate::moderation::{lock_row, set_lock_timeout};
use crate::orm::audit_log::{AuditAction, TargetType};
use crate::orm::user_roles::{self, Role};
use chrono::Utc;
use sea_orm::{entity::*, ActiveValue::Set, ConnectionTrait, DbErr, TransactionTrait};

/// The user's single current role.
pub async fn role_of(user_id: i32) -> Result<Role, DbErr> {
    role_of_conn(get_db_pool(), user_id).await
}

pub async fn role_of_conn<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<Role, DbErr> {
    Ok(user_roles::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .map(|row| row.role)
        .unwrap_or(Role::User))
}

/// Replace the target's role. Admin only.
pub async fn set_role(
    target_id: i32,
    new_role: Role,
    actor: &Actor,
) -> Result<user_roles::Model, ServiceError> {
    actor.require_admin()?;

    let db = get_db_pool();
    let txn = db.begin().await?;
    set_lock_timeout(&txn).await?;
    lock_row(&txn, "users", target_id)
        .await?
        .ok_or(ServiceError::NotFound("user"))?;

    let old_role = match user_roles::Entity::find_by_id(target_id).one(&txn).await? {
        Some(row) => {
            let role = row.role.clone();
            user_roles::Entity::delete_by_id(target_id).exec(&txn).await?;
            role
        }
        None => Role::User,
    };

    let assignment = user_roles::ActiveModel {
        user_id: Set(target_id),
        role: Set(new_role.clone()),
        assigned_by: Set(Some(actor.id)),
        updated_at: Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;

    audit::append(
        &txn,
        NewAuditEntry {
            actor_id: actor.id,
            actor_role: actor.role.clone(),
            action: AuditAction::UserRoleChanged,
            target_type: TargetType::User,
            target_id,
            reason: &format!("{} -> {}", old_role, new_role),
            metadata: Some(serde_json::json!({
                "old_role": old_role.as_str(),
                "new_role": new_role.as_str(),
            })),
        },
    )
    .await?;

    txn.commit().await?;

    log::info!(
        "Role of user {} changed from {} to {} by admin {}",
        target_id,
        old_role,
        new_role,
        actor.id
    );

    Ok(assignment)
}
