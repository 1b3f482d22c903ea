/// Integration tests for audited listing moderation
mod common;

use common::{database::*, fixtures::*};
use serial_test::serial;

use cardex::error::ServiceError;
use cardex::moderation::{self, ListingAction};
use cardex::orm::audit_log::{AuditAction, TargetType};
use cardex::orm::listings::ListingStatus;
use cardex::orm::user_roles::Role;

#[actix_rt::test]
#[serial]
async fn test_freeze_then_restore() {
    let db = setup_test_database().await.expect("test db");
    cleanup_test_data(&db).await.expect("cleanup");

    let seller = create_test_user(&db, "seller").await.expect("user");
    let staff = create_test_user(&db, "mod").await.expect("user");
    let staff_ctx = actor(staff.id, Role::Moderator);
    let listing = create_test_listing(&db, seller.id, "Charizard holo", ListingStatus::Active)
        .await
        .expect("listing");

    let (frozen, entry) = moderation::apply_listing_action(
        listing.id,
        &staff_ctx,
        ListingAction::Freeze,
        "Authenticity dispute",
    )
    .await
    .expect("freeze");
    assert_eq!(frozen.status, ListingStatus::Frozen);
    assert_eq!(entry.action, AuditAction::ListingFrozen);
    assert_eq!(entry.target_type, TargetType::Listing);

    let metadata = entry.metadata.expect("status change metadata");
    assert_eq!(metadata["from_status"], "active");
    assert_eq!(metadata["to_status"], "frozen");

    let (restored, entry) = moderation::apply_listing_action(
        listing.id,
        &staff_ctx,
        ListingAction::Restore,
        "Dispute settled",
    )
    .await
    .expect("restore");
    assert_eq!(restored.status, ListingStatus::Active);
    assert_eq!(entry.action, AuditAction::ListingRestored);

    cleanup_test_data(&db).await.expect("cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_remove_cancels_listing() {
    let db = setup_test_database().await.expect("test db");
    cleanup_test_data(&db).await.expect("cleanup");

    let seller = create_test_user(&db, "seller").await.expect("user");
    let staff = create_test_user(&db, "mod").await.expect("user");
    let listing = create_test_listing(&db, seller.id, "Counterfeit slab", ListingStatus::Active)
        .await
        .expect("listing");

    let (removed, entry) = moderation::apply_listing_action(
        listing.id,
        &actor(staff.id, Role::Support),
        ListingAction::Remove,
        "Confirmed fake",
    )
    .await
    .expect("remove");

    assert_eq!(removed.status, ListingStatus::Cancelled);
    assert_eq!(entry.action, AuditAction::ListingRemoved);

    cleanup_test_data(&db).await.expect("cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_restore_from_sold_rejected() {
    let db = setup_test_database().await.expect("test db");
    cleanup_test_data(&db).await.expect("cleanup");

    let seller = create_test_user(&db, "seller").await.expect("user");
    let staff = create_test_user(&db, "mod").await.expect("user");
    let listing = create_test_listing(&db, seller.id, "Already gone", ListingStatus::Sold)
        .await
        .expect("listing");

    let result = moderation::apply_listing_action(
        listing.id,
        &actor(staff.id, Role::Moderator),
        ListingAction::Restore,
        "oops",
    )
    .await;
    assert!(matches!(result, Err(ServiceError::InvalidTransition(_))));

    cleanup_test_data(&db).await.expect("cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_listing_actions_require_staff() {
    let db = setup_test_database().await.expect("test db");
    cleanup_test_data(&db).await.expect("cleanup");

    let seller = create_test_user(&db, "seller").await.expect("user");
    let listing = create_test_listing(&db, seller.id, "Mine", ListingStatus::Active)
        .await
        .expect("listing");

    // Owners don't moderate their own listings through this path.
    let result = moderation::apply_listing_action(
        listing.id,
        &actor(seller.id, Role::User),
        ListingAction::Freeze,
        "self-freeze",
    )
    .await;
    assert!(matches!(result, Err(ServiceError::PermissionDenied)));

    cleanup_test_data(&db).await.expect("cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_blank_reason_rejected() {
    let db = setup_test_database().await.expect("test db");
    cleanup_test_data(&db).await.expect("cleanup");

    let seller = create_test_user(&db, "seller").await.expect("user");
    let staff = create_test_user(&db, "mod").await.expect("user");
    let listing = create_test_listing(&db, seller.id, "Card", ListingStatus::Active)
        .await
        .expect("listing");

    let result = moderation::apply_listing_action(
        listing.id,
        &actor(staff.id, Role::Moderator),
        ListingAction::Freeze,
        "",
    )
    .await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));

    cleanup_test_data(&db).await.expect("cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_unknown_listing_is_not_found() {
    let db = setup_test_database().await.expect("test db");
    cleanup_test_data(&db).await.expect("cleanup");

    let staff = create_test_user(&db, "mod").await.expect("user");

    let result = moderation::apply_listing_action(
        99999,
        &actor(staff.id, Role::Moderator),
        ListingAction::Freeze,
        "ghost",
    )
    .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    cleanup_test_data(&db).await.expect("cleanup");
}
