/// Integration tests for audit log querying and completeness
mod common;

use common::{database::*, fixtures::*};
use serial_test::serial;

use cardex::audit::{self, AuditFilter, NewAuditEntry};
use cardex::moderation::{self, ListingAction, UserAction};
use cardex::orm::audit_log::{AuditAction, TargetType};
use cardex::orm::listings::ListingStatus;
use cardex::orm::user_roles::Role;

#[actix_rt::test]
#[serial]
async fn test_entries_newest_first() {
    let db = setup_test_database().await.expect("test db");
    cleanup_test_data(&db).await.expect("cleanup");

    let target = create_test_user(&db, "bob").await.expect("user");
    let staff = create_test_user(&db, "mod").await.expect("user");
    let staff_ctx = actor(staff.id, Role::Moderator);

    for reason in ["first", "second", "third"] {
        moderation::apply_user_action(target.id, &staff_ctx, UserAction::Warn, reason)
            .await
            .expect("warn");
    }

    let entries = audit::query(AuditFilter::default()).await.expect("query");
    assert_eq!(entries.len(), 3);
    let reasons: Vec<&str> = entries.iter().map(|e| e.reason.as_str()).collect();
    assert_eq!(reasons, vec!["third", "second", "first"]);

    cleanup_test_data(&db).await.expect("cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_filters_combine() {
    let db = setup_test_database().await.expect("test db");
    cleanup_test_data(&db).await.expect("cleanup");

    let target = create_test_user(&db, "bob").await.expect("user");
    let seller = create_test_user(&db, "seller").await.expect("user");
    let staff = create_test_user(&db, "mod").await.expect("user");
    let admin = create_test_user(&db, "root").await.expect("user");
    let listing = create_test_listing(&db, seller.id, "Card", ListingStatus::Active)
        .await
        .expect("listing");

    moderation::apply_user_action(
        target.id,
        &actor(staff.id, Role::Moderator),
        UserAction::Warn,
        "spam",
    )
    .await
    .expect("warn");
    moderation::apply_user_action(
        target.id,
        &actor(admin.id, Role::Admin),
        UserAction::Suspend,
        "repeat spam",
    )
    .await
    .expect("suspend");
    moderation::apply_listing_action(
        listing.id,
        &actor(staff.id, Role::Moderator),
        ListingAction::Freeze,
        "linked to spam",
    )
    .await
    .expect("freeze");

    let by_action = audit::query(AuditFilter {
        action: Some(AuditAction::UserWarned),
        ..Default::default()
    })
    .await
    .expect("query");
    assert_eq!(by_action.len(), 1);
    assert_eq!(by_action[0].reason, "spam");

    let by_target_type = audit::query(AuditFilter {
        target_type: Some(TargetType::User),
        ..Default::default()
    })
    .await
    .expect("query");
    assert_eq!(by_target_type.len(), 2);

    let by_actor = audit::query(AuditFilter {
        actor_id: Some(staff.id),
        ..Default::default()
    })
    .await
    .expect("query");
    assert_eq!(by_actor.len(), 2);

    let combined = audit::query(AuditFilter {
        actor_id: Some(staff.id),
        target_type: Some(TargetType::Listing),
        ..Default::default()
    })
    .await
    .expect("query");
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].target_id, listing.id);

    cleanup_test_data(&db).await.expect("cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_text_search_matches_reason_substring() {
    let db = setup_test_database().await.expect("test db");
    cleanup_test_data(&db).await.expect("cleanup");

    let target = create_test_user(&db, "bob").await.expect("user");
    let staff = create_test_user(&db, "mod").await.expect("user");
    let staff_ctx = actor(staff.id, Role::Moderator);

    moderation::apply_user_action(target.id, &staff_ctx, UserAction::Warn, "shill bidding ring")
        .await
        .expect("warn");
    moderation::apply_user_action(target.id, &staff_ctx, UserAction::Warn, "harassment in DMs")
        .await
        .expect("warn");

    let hits = audit::query(AuditFilter {
        text_search: Some("bidding".to_string()),
        ..Default::default()
    })
    .await
    .expect("query");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].reason, "shill bidding ring");

    cleanup_test_data(&db).await.expect("cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_time_window_filters() {
    let db = setup_test_database().await.expect("test db");
    cleanup_test_data(&db).await.expect("cleanup");

    let target = create_test_user(&db, "bob").await.expect("user");
    let staff = create_test_user(&db, "mod").await.expect("user");

    moderation::apply_user_action(
        target.id,
        &actor(staff.id, Role::Moderator),
        UserAction::Warn,
        "recent",
    )
    .await
    .expect("warn");

    let now = chrono::Utc::now().naive_utc();
    let hour = chrono::Duration::hours(1);

    let recent = audit::query(AuditFilter {
        since: Some(now - hour),
        ..Default::default()
    })
    .await
    .expect("query");
    assert_eq!(recent.len(), 1);

    let ancient = audit::query(AuditFilter {
        until: Some(now - hour),
        ..Default::default()
    })
    .await
    .expect("query");
    assert!(ancient.is_empty());

    cleanup_test_data(&db).await.expect("cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_limit_caps_result_size() {
    let db = setup_test_database().await.expect("test db");
    cleanup_test_data(&db).await.expect("cleanup");

    let target = create_test_user(&db, "bob").await.expect("user");
    let staff = create_test_user(&db, "mod").await.expect("user");
    let staff_ctx = actor(staff.id, Role::Moderator);

    for i in 0..5 {
        moderation::apply_user_action(
            target.id,
            &staff_ctx,
            UserAction::Warn,
            &format!("strike {}", i),
        )
        .await
        .expect("warn");
    }

    let limited = audit::query(AuditFilter {
        limit: Some(2),
        ..Default::default()
    })
    .await
    .expect("query");
    assert_eq!(limited.len(), 2);

    cleanup_test_data(&db).await.expect("cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_append_trims_reason() {
    let db = setup_test_database().await.expect("test db");
    cleanup_test_data(&db).await.expect("cleanup");

    let entry = audit::append(
        &db,
        NewAuditEntry {
            actor_id: 1,
            actor_role: Role::Admin,
            action: AuditAction::SettingUpdated,
            target_type: TargetType::System,
            target_id: 0,
            reason: "  padded reason  ",
            metadata: None,
        },
    )
    .await
    .expect("append");

    assert_eq!(entry.reason, "padded reason");

    cleanup_test_data(&db).await.expect("cleanup");
}
