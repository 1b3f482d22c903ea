//! Test fixtures for creating test data
#![allow(dead_code)]

use cardex::middleware::Actor;
use cardex::orm::cases::{self, CasePriority, CaseStatus, CaseType};
use cardex::orm::listings::{self, ListingStatus};
use cardex::orm::user_roles::{self, Role};
use cardex::orm::users;
use chrono::Utc;
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};

/// Create a test user with clean moderation state
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<users::Model, DbErr> {
    users::ActiveModel {
        name: Set(name.to_string()),
        is_banned: Set(false),
        is_suspended: Set(false),
        is_restricted: Set(false),
        warnings_count: Set(0),
        admin_notes: Set(None),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Create a test marketplace listing
pub async fn create_test_listing(
    db: &DatabaseConnection,
    owner_id: i32,
    title: &str,
    status: ListingStatus,
) -> Result<listings::Model, DbErr> {
    let now = Utc::now().naive_utc();
    listings::ActiveModel {
        owner_id: Set(owner_id),
        title: Set(title.to_string()),
        status: Set(status),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Create a test case directly at the ORM level
pub async fn create_test_case(
    db: &DatabaseConnection,
    owner_id: i32,
    subject: &str,
    status: CaseStatus,
) -> Result<cases::Model, DbErr> {
    let now = Utc::now().naive_utc();
    cases::ActiveModel {
        owner_id: Set(owner_id),
        case_type: Set(CaseType::Other),
        subject: Set(subject.to_string()),
        status: Set(status),
        priority: Set(CasePriority::Medium),
        created_at: Set(now),
        updated_at: Set(now),
        resolved_at: Set(None),
        resolved_by: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Grant a user a role by inserting the assignment row directly
pub async fn grant_role(
    db: &DatabaseConnection,
    user_id: i32,
    role: Role,
) -> Result<user_roles::Model, DbErr> {
    user_roles::ActiveModel {
        user_id: Set(user_id),
        role: Set(role),
        assigned_by: Set(None),
        updated_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
}

/// Actor helper for service calls
pub fn actor(id: i32, role: Role) -> Actor {
    Actor::new(id, role)
}
